//! HTML scanning for asset references and page links

use super::css::collect_css;
use super::AssetCollector;
use crate::classify::SourceTag;
use crate::resolve::resolve;
use crate::types::AssetList;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static ALL_ELEMENTS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("*").expect("ALL_ELEMENTS selector is valid"));

static BASE_HREF: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("base[href]").expect("BASE_HREF selector is valid"));

static DOCTYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!doctype").expect("DOCTYPE_RE is valid"));

static PAGE_LINKS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href], area[href]").expect("PAGE_LINKS selector is valid")
});

/// Extract every asset referenced by an HTML document
///
/// Scans stylesheets, scripts, images (including `srcset`), media sources,
/// icons, iframes, `<style>` blocks and inline `style` attributes, in
/// document order. Malformed markup is recovered by the parser; the number
/// of recovered errors is reported on the returned list.
pub fn extract_html_assets(html: &str, page_url: &Url) -> AssetList {
    let document = Html::parse_document(html);
    let base = document_base(&document, page_url);
    let mut collector = AssetCollector::new();

    for element in document.select(&ALL_ELEMENTS) {
        collect_element(element, &base, &mut collector);

        if let Some(style) = element.value().attr("style") {
            collect_css(style, &base, SourceTag::InlineStyle, &mut collector);
        }
    }

    AssetList {
        base_url: base.to_string(),
        assets: collector.into_assets(),
        recovered_parse_errors: recovered_errors(&document, html),
    }
}

/// Extract the `<a href>` and `<area href>` targets of a page
///
/// Only http(s) targets are returned, fragment-free and deduplicated in
/// document order. Cross-site links are included.
pub fn extract_links(html: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    harvest_links(&document, page_url)
}

pub(crate) fn harvest_links(document: &Html, page_url: &Url) -> Vec<Url> {
    let base = document_base(document, page_url);
    let mut seen = HashSet::new();
    document
        .select(&PAGE_LINKS)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve(&base, href).into_url())
        .filter(|url| seen.insert(url.to_string()))
        .collect()
}

/// Parse errors html5ever recovered from
///
/// A fragment or document without a DOCTYPE always yields one initial-mode
/// error; that one is not counted.
fn recovered_errors(document: &Html, html: &str) -> usize {
    let missing_doctype = !DOCTYPE_RE.is_match(html);
    document
        .errors
        .len()
        .saturating_sub(usize::from(missing_doctype))
}

/// `<base href>` when present and resolvable, otherwise the page URL
fn document_base(document: &Html, page_url: &Url) -> Url {
    document
        .select(&BASE_HREF)
        .next()
        .and_then(|base| base.value().attr("href"))
        .and_then(|href| resolve(page_url, href).into_url())
        .unwrap_or_else(|| page_url.clone())
}

fn collect_element(element: ElementRef<'_>, base: &Url, collector: &mut AssetCollector) {
    let value = element.value();
    match value.name() {
        "link" => {
            if let Some(href) = value.attr("href") {
                collector.push(base, href, link_tag(value.attr("rel"), value.attr("as")));
            }
        }
        "script" => {
            if let Some(src) = value.attr("src") {
                collector.push(base, src, SourceTag::Script);
            }
        }
        "img" => {
            if let Some(src) = value.attr("src") {
                collector.push(base, src, SourceTag::Img);
            }
            if let Some(srcset) = value.attr("srcset") {
                for candidate in srcset_urls(srcset) {
                    collector.push(base, candidate, SourceTag::ImgSrcset);
                }
            }
        }
        "source" => {
            let tag = if in_picture(element, value.attr("srcset").is_some()) {
                SourceTag::PictureSource
            } else {
                SourceTag::MediaSource
            };
            if let Some(src) = value.attr("src") {
                collector.push(base, src, tag.clone());
            }
            if let Some(srcset) = value.attr("srcset") {
                for candidate in srcset_urls(srcset) {
                    collector.push(base, candidate, tag.clone());
                }
            }
        }
        "video" => {
            if let Some(src) = value.attr("src") {
                collector.push(base, src, SourceTag::Video);
            }
            if let Some(poster) = value.attr("poster") {
                collector.push(base, poster, SourceTag::VideoPoster);
            }
        }
        "audio" => {
            if let Some(src) = value.attr("src") {
                collector.push(base, src, SourceTag::Audio);
            }
        }
        "iframe" => {
            if let Some(src) = value.attr("src") {
                collector.push(base, src, SourceTag::Iframe);
            }
        }
        "style" => {
            let css: String = element.text().collect();
            collect_css(&css, base, SourceTag::StyleElement, collector);
        }
        _ => {}
    }
}

fn link_tag(rel: Option<&str>, destination: Option<&str>) -> SourceTag {
    let rel = rel.unwrap_or_default().to_ascii_lowercase();
    let has = |token: &str| rel.split_ascii_whitespace().any(|t| t == token);

    if has("stylesheet") {
        SourceTag::LinkStylesheet
    } else if has("icon") || has("apple-touch-icon") || has("mask-icon") {
        SourceTag::LinkIcon
    } else if has("preload") || has("prefetch") || has("modulepreload") {
        SourceTag::LinkPreload {
            destination: destination.map(|d| d.trim().to_ascii_lowercase()),
        }
    } else {
        SourceTag::Link
    }
}

/// Whether a `<source>` describes an image candidate
///
/// The parent decides; a detached `<source>` with a `srcset` is treated as a
/// picture source since media sources never carry one.
fn in_picture(element: ElementRef<'_>, has_srcset: bool) -> bool {
    match element.parent().and_then(ElementRef::wrap) {
        Some(parent) => match parent.value().name() {
            "picture" => true,
            "video" | "audio" => false,
            _ => has_srcset,
        },
        None => has_srcset,
    }
}

/// URLs of a `srcset` attribute, descriptors dropped
///
/// Candidate URLs are runs of non-whitespace, so commas inside a `data:` URL
/// do not split it.
fn srcset_urls(srcset: &str) -> Vec<&str> {
    let mut urls = Vec::new();
    let mut rest = srcset;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }

        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let candidate = &rest[..end];
        rest = &rest[end..];

        let url = candidate.trim_end_matches(',');
        if url.len() == candidate.len() {
            // descriptors run until the next comma
            rest = match rest.find(',') {
                Some(i) => &rest[i + 1..],
                None => "",
            };
        }
        if !url.is_empty() {
            urls.push(url);
        }
    }

    urls
}
