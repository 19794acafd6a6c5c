//! Structural summary of an HTML page

use crate::types::{Heading, PageStructureSummary};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

/// Elements counted in `semantic_elements`
const SEMANTIC_ELEMENTS: &[&str] = &[
    "header", "footer", "nav", "main", "aside", "section", "article",
];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("structure selectors are valid")
}

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static HEADINGS: LazyLock<Selector> = LazyLock::new(|| selector("h1, h2, h3, h4, h5, h6"));
static META: LazyLock<Selector> = LazyLock::new(|| selector("meta[content]"));
static ALL: LazyLock<Selector> = LazyLock::new(|| selector("*"));
static WRAPPER_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(html|head|body)[\s/>]").expect("WRAPPER_TAG_RE is valid")
});
static CONTENT_CANDIDATES: LazyLock<Selector> =
    LazyLock::new(|| selector("main, article, section, div"));

/// Summarize title, headings, meta tags and layout landmarks
///
/// Pure; tolerates any input. A document with no discoverable structure
/// yields empty collections and `false` flags.
pub fn analyze_page_structure(html: &str) -> PageStructureSummary {
    let document = Html::parse_document(html);

    let headings = document
        .select(&HEADINGS)
        .filter_map(|h| {
            let level = h.value().name().strip_prefix('h')?.parse().ok()?;
            Some(Heading {
                level,
                text: collapse_whitespace(&h.text().collect::<String>()),
            })
        })
        .collect();

    let mut meta_tags = BTreeMap::new();
    for meta in document.select(&META) {
        let value = meta.value();
        let key = value.attr("name").or_else(|| value.attr("property"));
        if let (Some(key), Some(content)) = (key, value.attr("content")) {
            meta_tags.insert(key.to_string(), content.to_string());
        }
    }

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_elements: usize = 0;
    for element in document.select(&ALL) {
        total_elements += 1;
        *counts.entry(element.value().name().to_string()).or_default() += 1;
    }
    let count = |name: &str| counts.get(name).copied().unwrap_or(0);

    let semantic_elements = SEMANTIC_ELEMENTS
        .iter()
        .map(|&name| (name.to_string(), count(name)))
        .filter(|(_, n)| *n > 0)
        .collect();

    PageStructureSummary {
        title: page_title(&document),
        headings,
        meta_tags,
        has_nav: count("nav") > 0,
        has_footer: count("footer") > 0,
        has_header: count("header") > 0,
        has_sidebar: count("aside") > 0,
        has_main_content: document.select(&CONTENT_CANDIDATES).next().is_some(),
        semantic_elements,
        total_elements: total_elements - implied_wrappers(html, &counts),
        total_links: count("a"),
        total_images: count("img"),
        total_forms: count("form"),
    }
}

/// Trimmed text of the first `<title>`, if non-empty
pub(crate) fn page_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE)
        .next()
        .map(|t| collapse_whitespace(&t.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

/// Wrapper elements html5ever inserted because the source never opened them
fn implied_wrappers(html: &str, counts: &BTreeMap<String, usize>) -> usize {
    let written: HashSet<String> = WRAPPER_TAG_RE
        .captures_iter(html)
        .map(|c| c[1].to_ascii_lowercase())
        .collect();
    ["html", "head", "body"]
        .iter()
        .filter(|name| counts.contains_key(**name) && !written.contains(**name))
        .count()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
