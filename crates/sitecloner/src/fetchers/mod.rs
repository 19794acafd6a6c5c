//! Page fetching
//!
//! Design: operations never talk to the network directly. They go through
//! a [`Fetcher`], so the crawler and downloader can be exercised against an
//! in-memory site in tests and against [`HttpFetcher`] in production.

mod http;

pub use http::HttpFetcher;

use crate::error::{Result, SiteError};
use crate::types::PageResponse;
use async_trait::async_trait;
use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8};
use std::collections::BTreeMap;
use url::Url;

/// Content type prefixes that are never decoded as text
const BINARY_PREFIXES: &[&str] = &[
    "image/",
    "audio/",
    "video/",
    "font/",
    "application/octet-stream",
    "application/pdf",
    "application/zip",
    "application/gzip",
    "application/x-tar",
    "application/x-rar",
    "application/x-7z",
    "application/font",
    "application/vnd.ms-",
    "application/vnd.openxmlformats",
];

/// Trait for retrieving a single resource
///
/// Implementations perform exactly one request per call, with no retries.
/// A non-2xx answer is an error (`HttpStatus`), never a resource.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Identifier for logging
    fn name(&self) -> &'static str;

    /// GET the URL and return the full body
    async fn get(&self, url: &Url) -> Result<FetchedResource>;
}

/// A successfully retrieved resource
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// Final URL after redirects
    pub url: Url,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl FetchedResource {
    /// Decode the body as text in its declared charset
    ///
    /// The `charset` parameter of the Content-Type picks the encoding;
    /// without one (or with an unknown label) the body must be UTF-8. Fails
    /// with `Decode` for binary content types or bytes that are malformed in
    /// the chosen encoding.
    pub fn text(&self) -> Result<String> {
        let content_type = self.content_type.as_deref().unwrap_or_default();
        if is_binary_content_type(content_type) {
            return Err(SiteError::Decode(format!(
                "binary content ({content_type}) cannot be read as text"
            )));
        }

        let encoding = charset_of(content_type)
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(UTF_8);
        encoding
            .decode_without_bom_handling_and_without_replacement(&self.body)
            .map(|text| text.into_owned())
            .ok_or_else(|| {
                SiteError::Decode(format!("body is not valid {}", encoding.name()))
            })
    }

    pub fn into_page_response(self) -> Result<PageResponse> {
        let content = self.text()?;
        Ok(PageResponse {
            url: self.url.to_string(),
            status_code: self.status_code,
            content_type: self.content_type,
            headers: self.headers,
            content,
        })
    }
}

/// `charset` parameter of a Content-Type value, unquoted
fn charset_of(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Check if content type indicates binary content
pub(crate) fn is_binary_content_type(content_type: &str) -> bool {
    let ct_lower = content_type.trim().to_lowercase();
    BINARY_PREFIXES
        .iter()
        .any(|prefix| ct_lower.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(content_type: Option<&str>, body: &'static [u8]) -> FetchedResource {
        FetchedResource {
            url: Url::parse("https://x.com/r").unwrap(),
            status_code: 200,
            content_type: content_type.map(String::from),
            headers: BTreeMap::new(),
            body: Bytes::from_static(body),
        }
    }

    #[test]
    fn test_is_binary_content_type() {
        assert!(is_binary_content_type("image/png"));
        assert!(is_binary_content_type("audio/mp3"));
        assert!(is_binary_content_type("video/mp4"));
        assert!(is_binary_content_type("font/woff2"));
        assert!(is_binary_content_type("application/pdf"));
        assert!(is_binary_content_type("application/vnd.ms-excel"));
        assert!(is_binary_content_type("Application/Octet-Stream"));

        assert!(!is_binary_content_type("text/html; charset=utf-8"));
        assert!(!is_binary_content_type("text/css"));
        assert!(!is_binary_content_type("application/json"));
        assert!(!is_binary_content_type("application/javascript"));
    }

    #[test]
    fn test_text_decoding() {
        assert_eq!(
            resource(Some("text/html"), b"<p>hi</p>").text().unwrap(),
            "<p>hi</p>"
        );
        assert!(matches!(
            resource(Some("image/png"), b"\x89PNG").text(),
            Err(SiteError::Decode(_))
        ));
        assert!(matches!(
            resource(None, b"\xff\xfe\xfd").text(),
            Err(SiteError::Decode(_))
        ));
    }

    #[test]
    fn test_text_honours_declared_charset() {
        let latin1 = resource(
            Some("text/html; charset=iso-8859-1"),
            b"<title>Caf\xe9</title>",
        );
        assert_eq!(latin1.text().unwrap(), "<title>Caf\u{e9}</title>");

        let quoted = resource(Some("text/html; Charset=\"windows-1252\""), b"\x93hi\x94");
        assert_eq!(quoted.text().unwrap(), "\u{201c}hi\u{201d}");

        let utf8 = resource(Some("text/html; charset=utf-8"), "caf\u{e9}".as_bytes());
        assert_eq!(utf8.text().unwrap(), "caf\u{e9}");
    }

    #[test]
    fn test_text_without_charset_requires_utf8() {
        assert!(matches!(
            resource(Some("text/html"), b"Caf\xe9").text(),
            Err(SiteError::Decode(_))
        ));
        assert!(matches!(
            resource(Some("text/html; charset=bogus"), b"Caf\xe9").text(),
            Err(SiteError::Decode(_))
        ));
    }

    #[test]
    fn test_charset_of() {
        assert_eq!(charset_of("text/html; charset=UTF-8"), Some("UTF-8"));
        assert_eq!(charset_of("text/css;charset=\"latin1\""), Some("latin1"));
        assert_eq!(charset_of("text/html"), None);
        assert_eq!(charset_of("text/html; boundary=x"), None);
    }

    #[test]
    fn test_into_page_response() {
        let page = resource(Some("text/plain"), b"hello")
            .into_page_response()
            .unwrap();
        assert_eq!(page.url, "https://x.com/r");
        assert_eq!(page.status_code, 200);
        assert_eq!(page.content, "hello");
    }
}
