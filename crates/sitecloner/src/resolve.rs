//! URL resolution against a base document

use url::Url;

/// Outcome of resolving a reference found in HTML or CSS
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Absolute http(s) URL, fragment removed
    Absolute(Url),
    /// Anything that is not a fetchable web resource (`data:`, `mailto:`,
    /// `javascript:`, anchor-only or empty references, unparseable input)
    NonWeb,
}

impl Resolution {
    /// Convert into an `Option`, dropping the non-web sentinel
    pub fn into_url(self) -> Option<Url> {
        match self {
            Resolution::Absolute(url) => Some(url),
            Resolution::NonWeb => None,
        }
    }

    pub fn is_web(&self) -> bool {
        matches!(self, Resolution::Absolute(_))
    }
}

/// Resolve `reference` against `base`
///
/// Handles absolute, root-relative, path-relative and protocol-relative
/// (`//host/path`) references. The result never carries a fragment.
pub fn resolve(base: &Url, reference: &str) -> Resolution {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with('#') {
        return Resolution::NonWeb;
    }

    match base.join(reference) {
        Ok(mut url) if is_web_scheme(&url) => {
            url.set_fragment(None);
            Resolution::Absolute(url)
        }
        _ => Resolution::NonWeb,
    }
}

/// Parse a caller-supplied absolute URL, requiring http or https
pub fn parse_web_url(input: &str) -> crate::error::Result<Url> {
    let url = Url::parse(input.trim())
        .map_err(|e| crate::error::SiteError::invalid_url(input, e))?;
    if !is_web_scheme(&url) {
        return Err(crate::error::SiteError::invalid_url(
            input,
            "scheme must be http or https",
        ));
    }
    Ok(url)
}

/// True when both URLs share scheme and host
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme() && a.host_str() == b.host_str()
}

/// Scheme and host of a URL, e.g. `https://example.com`
pub fn origin_of(url: &Url) -> String {
    match url.host_str() {
        Some(host) => format!("{}://{}", url.scheme(), host),
        None => url.scheme().to_string(),
    }
}

fn is_web_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
}
