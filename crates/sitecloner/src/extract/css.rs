//! Stylesheet scanning for `url()` and `@import` references

use super::AssetCollector;
use crate::classify::SourceTag;
use crate::types::AssetReference;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use url::Url;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("COMMENT_RE is valid"));

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)@import\s*(?:url\(\s*)?(?:"([^"]*)"|'([^']*)'|([^\s;'"()]+))"#)
        .expect("IMPORT_RE is valid")
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^\s'"()]*))\s*\)"#)
        .expect("URL_RE is valid")
});

static FONT_FACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)@font-face\s*\{[^}]*\}").expect("FONT_FACE_RE is valid")
});

/// Extract asset references from a stylesheet
///
/// `base` is the URL the stylesheet was loaded from. References are returned
/// in source order, deduplicated by resolved URL. Never fails; text that is
/// not CSS simply yields nothing.
pub fn extract_css_assets(css: &str, base: &Url) -> Vec<AssetReference> {
    let mut collector = AssetCollector::new();
    collect_css(css, base, SourceTag::CssUrl, &mut collector);
    collector.into_assets()
}

/// Scan `css` into `collector`; plain `url()` references get `url_tag`
pub(crate) fn collect_css(css: &str, base: &Url, url_tag: SourceTag, collector: &mut AssetCollector) {
    let css = COMMENT_RE.replace_all(css, " ");

    let font_faces: Vec<Range<usize>> = FONT_FACE_RE.find_iter(&css).map(|m| m.range()).collect();

    let mut found: Vec<(usize, &str, SourceTag)> = Vec::new();

    for caps in IMPORT_RE.captures_iter(&css) {
        if let (Some(whole), Some(reference)) = (caps.get(0), first_group(&caps)) {
            found.push((whole.start(), reference, SourceTag::CssImport));
        }
    }

    for caps in URL_RE.captures_iter(&css) {
        if let (Some(whole), Some(reference)) = (caps.get(0), first_group(&caps)) {
            let tag = if font_faces.iter().any(|r| r.contains(&whole.start())) {
                SourceTag::CssFontFace
            } else {
                url_tag.clone()
            };
            found.push((whole.start(), reference, tag));
        }
    }

    // stable: an @import precedes the url() it wraps
    found.sort_by_key(|(offset, _, _)| *offset);

    for (_, reference, tag) in found {
        collector.push(base, reference, tag);
    }
}

fn first_group<'t>(caps: &regex::Captures<'t>) -> Option<&'t str> {
    (1..caps.len())
        .find_map(|i| caps.get(i))
        .map(|m| m.as_str())
}
