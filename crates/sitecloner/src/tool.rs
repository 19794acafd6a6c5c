//! Tool builder and dispatch for the SiteCloner operations

use crate::client::ClientOptions;
use crate::crawl::SiteCrawler;
use crate::download::AssetDownloader;
use crate::error::{Result, SiteError};
use crate::extract::css::extract_css_assets;
use crate::extract::html::extract_html_assets;
use crate::fetchers::{Fetcher, HttpFetcher};
use crate::resolve::parse_web_url;
use crate::structure;
use crate::types::{
    AnalyzePageRequest, AssetList, CreateSiteMapRequest, CssSource, DownloadAssetRequest,
    DownloadResult, ExtractAssetsRequest, FetchPageRequest, PageResponse, PageStructureSummary,
    ParseCssRequest, Sitemap,
};
use crate::TOOL_LLMTXT;
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const FETCH_PAGE: &str = "fetch_page";
pub const EXTRACT_ASSETS: &str = "extract_assets";
pub const DOWNLOAD_ASSET: &str = "download_asset";
pub const PARSE_CSS_FOR_ASSETS: &str = "parse_css_for_assets";
pub const CREATE_SITE_MAP: &str = "create_site_map";
pub const ANALYZE_PAGE_STRUCTURE: &str = "analyze_page_structure";

/// Name, description and input schema of one operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    fn of<T: JsonSchema>(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema: serde_json::to_value(schema_for!(T)).unwrap_or_default(),
        }
    }
}

/// Builder for configuring the SiteCloner tool
#[derive(Clone, Default)]
pub struct ToolBuilder {
    options: ClientOptions,
    fetcher: Option<Arc<dyn Fetcher>>,
}

impl ToolBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.options.user_agent = Some(ua.into());
        self
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Set the default download directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.output_dir = dir.into();
        self
    }

    /// Set the crawl page limit
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.options.max_pages = max_pages;
        self
    }

    /// Use a custom fetcher instead of the HTTP one
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Build the tool
    ///
    /// Fails only if the HTTP client cannot be created.
    pub fn build(self) -> Result<Tool> {
        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new(&self.options)?),
        };
        Ok(Tool {
            options: self.options,
            fetcher,
        })
    }
}

/// Configured SiteCloner tool
///
/// Holds read-only options and the fetcher; every operation is independent.
#[derive(Clone)]
pub struct Tool {
    options: ClientOptions,
    fetcher: Arc<dyn Fetcher>,
}

impl Tool {
    /// Create a new tool builder
    pub fn builder() -> ToolBuilder {
        ToolBuilder::new()
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Get full documentation (llmtxt)
    pub fn llmtxt(&self) -> &'static str {
        TOOL_LLMTXT
    }

    /// All operations with their input schemas
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::of::<FetchPageRequest>(
                FETCH_PAGE,
                "Fetch the HTML content of a webpage.",
            ),
            ToolDefinition::of::<ExtractAssetsRequest>(
                EXTRACT_ASSETS,
                "Extract links to assets (CSS, JavaScript, images, fonts, media) from HTML content.",
            ),
            ToolDefinition::of::<DownloadAssetRequest>(
                DOWNLOAD_ASSET,
                "Download an asset and save it under the output directory, sorted by category.",
            ),
            ToolDefinition::of::<ParseCssRequest>(
                PARSE_CSS_FOR_ASSETS,
                "Parse CSS to extract URLs of referenced assets like fonts and images.",
            ),
            ToolDefinition::of::<CreateSiteMapRequest>(
                CREATE_SITE_MAP,
                "Create a sitemap of the website starting from the given URL.",
            ),
            ToolDefinition::of::<AnalyzePageRequest>(
                ANALYZE_PAGE_STRUCTURE,
                "Analyze the structure of an HTML page and extract key components.",
            ),
        ]
    }

    /// Run an operation by name with JSON arguments
    pub async fn call(&self, name: &str, arguments: serde_json::Value) -> Result<serde_json::Value> {
        debug!(tool = name, "Tool call");
        match name {
            FETCH_PAGE => {
                let req: FetchPageRequest = parse_arguments(arguments)?;
                Ok(to_json(&self.fetch_page(&req.url).await?))
            }
            EXTRACT_ASSETS => Ok(to_json(&self.extract_assets(parse_arguments(arguments)?)?)),
            DOWNLOAD_ASSET => Ok(to_json(
                &self.download_asset(parse_arguments(arguments)?).await?,
            )),
            PARSE_CSS_FOR_ASSETS => Ok(to_json(
                &self.parse_css_for_assets(parse_arguments(arguments)?).await?,
            )),
            CREATE_SITE_MAP => Ok(to_json(
                &self.create_site_map(parse_arguments(arguments)?).await?,
            )),
            ANALYZE_PAGE_STRUCTURE => Ok(to_json(
                &self.analyze_page_structure(parse_arguments(arguments)?),
            )),
            other => Err(SiteError::UnknownTool(other.to_string())),
        }
    }

    /// GET a page and return its text
    pub async fn fetch_page(&self, url: &str) -> Result<PageResponse> {
        let url = parse_web_url(url)?;
        self.fetcher.get(&url).await?.into_page_response()
    }

    /// Asset references of supplied HTML, resolved against `url`
    pub fn extract_assets(&self, req: ExtractAssetsRequest) -> Result<AssetList> {
        let page_url = parse_web_url(&req.url)?;
        Ok(extract_html_assets(&req.html_content, &page_url))
    }

    /// Save one asset to `<output_dir>/<category>/<basename>`
    pub async fn download_asset(&self, req: DownloadAssetRequest) -> Result<DownloadResult> {
        let output_dir = req
            .output_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| self.options.output_dir.clone());
        AssetDownloader::new(self.fetcher.as_ref())
            .download(&req.url, &output_dir)
            .await
    }

    /// Asset references of a stylesheet, fetching it when no text is given
    pub async fn parse_css_for_assets(&self, req: ParseCssRequest) -> Result<AssetList> {
        let (base, css) = match req.source()? {
            CssSource::Inline { base, content } => (base, content),
            CssSource::Remote(url) => {
                let resource = self.fetcher.get(&url).await?;
                let css = resource.text()?;
                (resource.url, css)
            }
        };
        Ok(AssetList {
            base_url: base.to_string(),
            assets: extract_css_assets(&css, &base),
            recovered_parse_errors: 0,
        })
    }

    /// Breadth-first crawl of the site behind `req.url`
    pub async fn create_site_map(&self, req: CreateSiteMapRequest) -> Result<Sitemap> {
        SiteCrawler::new(self.fetcher.as_ref())
            .with_max_pages(self.options.max_pages)
            .crawl(&req.url, req.effective_max_depth())
            .await
    }

    pub fn analyze_page_structure(&self, req: AnalyzePageRequest) -> PageStructureSummary {
        structure::analyze_page_structure(&req.html_content)
    }
}

fn parse_arguments<T: DeserializeOwned>(arguments: serde_json::Value) -> Result<T> {
    serde_json::from_value(arguments).map_err(|e| SiteError::InvalidArguments(e.to_string()))
}

fn to_json<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_default()
}
