//! Client configuration and one-shot entry points
//!
//! [`ClientOptions`] is built once (usually through [`ToolBuilder`](crate::ToolBuilder))
//! and never changes afterwards. The free functions here build a default
//! [`Tool`](crate::Tool) for callers that need a single operation.

use crate::error::Result;
use crate::tool::Tool;
use crate::types::{CreateSiteMapRequest, PageResponse, Sitemap};
use std::path::PathBuf;
use std::time::Duration;

/// Default directory for downloaded assets
pub const DEFAULT_OUTPUT_DIR: &str = "downloaded_site";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on pages visited by one crawl, independent of depth
pub const DEFAULT_MAX_PAGES: usize = 100;

/// Process-wide, read-only settings
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Custom User-Agent (defaults to [`DEFAULT_USER_AGENT`](crate::DEFAULT_USER_AGENT))
    pub user_agent: Option<String>,
    /// Whole-request timeout
    pub timeout: Duration,
    /// Directory used by `download_asset` when the caller gives none
    pub output_dir: PathBuf,
    /// Crawl safety bound on visited pages
    pub max_pages: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout: DEFAULT_TIMEOUT,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Fetch a page with default options
pub async fn fetch_page(url: &str) -> Result<PageResponse> {
    Tool::builder().build()?.fetch_page(url).await
}

/// Crawl a site with default options
pub async fn create_site_map(url: &str, max_depth: usize) -> Result<Sitemap> {
    let tool = Tool::builder().build()?;
    tool.create_site_map(CreateSiteMapRequest::new(url).max_depth(max_depth))
        .await
}
