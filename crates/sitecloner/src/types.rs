//! Request and response types for the SiteCloner tools

use crate::classify::{AssetCategory, SourceTag};
use crate::error::{Result, SiteError};
use crate::resolve::parse_web_url;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// Default crawl depth for `create_site_map`
pub const DEFAULT_MAX_DEPTH: usize = 1;

/// Request for `fetch_page`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FetchPageRequest {
    /// The URL of the webpage to fetch (http:// or https://)
    pub url: String,
}

/// Request for `extract_assets`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExtractAssetsRequest {
    /// The URL of the webpage, used to resolve relative references
    pub url: String,
    /// The HTML content to scan
    pub html_content: String,
}

/// Request for `download_asset`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DownloadAssetRequest {
    /// The URL of the asset to download
    pub url: String,
    /// Directory to save into (default: downloaded_site)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
}

/// Request for `parse_css_for_assets`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ParseCssRequest {
    /// The URL of the stylesheet, used to resolve relative references
    pub css_url: String,
    /// The CSS text (fetched from css_url when omitted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_content: Option<String>,
}

/// Where the CSS text for `parse_css_for_assets` comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssSource {
    /// Text supplied by the caller, resolved against `base`
    Inline { base: Url, content: String },
    /// Text must be fetched from this URL first
    Remote(Url),
}

impl ParseCssRequest {
    pub fn new(css_url: impl Into<String>) -> Self {
        Self {
            css_url: css_url.into(),
            css_content: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.css_content = Some(content.into());
        self
    }

    /// Validate the argument combination
    ///
    /// Without `css_content` the `css_url` must be fetchable, otherwise the
    /// request fails with `MissingInput`.
    pub fn source(&self) -> Result<CssSource> {
        let css_url = self.css_url.trim();
        match &self.css_content {
            Some(content) => {
                if css_url.is_empty() {
                    return Err(SiteError::MissingInput(
                        "css_url is required to resolve references in css_content".to_string(),
                    ));
                }
                Ok(CssSource::Inline {
                    base: parse_web_url(css_url)?,
                    content: content.clone(),
                })
            }
            None => parse_web_url(css_url).map(CssSource::Remote).map_err(|_| {
                SiteError::MissingInput(
                    "css_content, or a fetchable http(s) css_url".to_string(),
                )
            }),
        }
    }
}

/// Request for `create_site_map`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CreateSiteMapRequest {
    /// The starting URL to crawl
    pub url: String,
    /// Maximum link depth to follow from the start page (default: 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

impl CreateSiteMapRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_depth: None,
        }
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn effective_max_depth(&self) -> usize {
        self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH)
    }
}

/// Request for `analyze_page_structure`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzePageRequest {
    /// The HTML content to analyze
    pub html_content: String,
}

/// Response from `fetch_page`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PageResponse {
    /// Final URL after redirects
    pub url: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub content: String,
}

/// A resource referenced by a page or stylesheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AssetReference {
    /// Absolute http(s) URL
    pub url: String,
    pub category: AssetCategory,
    pub source_tag: SourceTag,
}

/// Ordered, deduplicated asset references
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AssetList {
    /// URL that relative references were resolved against
    pub base_url: String,
    pub assets: Vec<AssetReference>,
    /// Number of markup errors the parser recovered from
    #[serde(default, skip_serializing_if = "is_zero")]
    pub recovered_parse_errors: usize,
}

impl AssetList {
    /// URLs of a single category, in discovery order
    pub fn urls_of(&self, category: AssetCategory) -> Vec<&str> {
        self.assets
            .iter()
            .filter(|a| a.category == category)
            .map(|a| a.url.as_str())
            .collect()
    }
}

/// Response from `download_asset`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DownloadResult {
    pub url: String,
    /// Path the bytes were written to
    pub saved_to: String,
    pub category: AssetCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Bytes written
    pub size: u64,
}

/// One visited page of a crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SitemapNode {
    pub url: String,
    /// Link distance from the start page (start page is 0)
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Links found on the page, same-site and external, in document order
    pub outgoing_links: Vec<String>,
    /// Fetch failure, when the page could not be retrieved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of `create_site_map`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Sitemap {
    pub start_url: String,
    /// Scheme and host the crawl was restricted to
    pub base_url: String,
    pub max_depth: usize,
    /// Number of visited pages
    pub pages: usize,
    /// True when the page limit stopped the crawl before the queue emptied
    pub truncated: bool,
    pub nodes: BTreeMap<String, SitemapNode>,
}

impl Sitemap {
    pub fn get(&self, url: &str) -> Option<&SitemapNode> {
        self.nodes.get(url)
    }
}

/// A heading found in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Heading {
    /// 1 through 6
    pub level: u8,
    pub text: String,
}

/// Shallow structural summary of an HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PageStructureSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub headings: Vec<Heading>,
    /// `name` (or `property`) to `content`
    pub meta_tags: BTreeMap<String, String>,
    pub has_nav: bool,
    pub has_footer: bool,
    pub has_header: bool,
    pub has_sidebar: bool,
    pub has_main_content: bool,
    /// Count of each semantic element present on the page
    pub semantic_elements: BTreeMap<String, usize>,
    pub total_elements: usize,
    pub total_links: usize,
    pub total_images: usize,
    pub total_forms: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}
