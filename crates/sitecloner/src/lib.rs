//! SiteCloner - website mirroring tools for LLM agents
//!
//! This crate provides the operations an agent needs to mirror a site:
//! fetch a page, discover the assets it references, parse stylesheets for
//! nested references, download assets, crawl a sitemap and summarize page
//! structure.
//!
//! ## Operations
//!
//! All operations are exposed through [`Tool`], which can also dispatch them
//! by name with JSON arguments ([`Tool::call`]) for tool-calling protocols.
//!
//! - `fetch_page` - GET a page and return its text
//! - `extract_assets` - asset references of an HTML document
//! - `parse_css_for_assets` - `url()` and `@import` references of a stylesheet
//! - `download_asset` - save one asset under `<output_dir>/<category>/`
//! - `create_site_map` - bounded breadth-first crawl of one site
//! - `analyze_page_structure` - title, headings, meta tags, landmarks
//!
//! Network access goes through the [`Fetcher`] trait; [`HttpFetcher`] is the
//! reqwest-backed implementation.

pub mod classify;
pub mod client;
pub mod crawl;
pub mod download;
mod error;
pub mod extract;
pub mod fetchers;
pub mod resolve;
pub mod structure;
mod tool;
mod types;

pub use classify::{classify, AssetCategory, SourceTag};
pub use client::{create_site_map, fetch_page, ClientOptions};
pub use crawl::SiteCrawler;
pub use download::AssetDownloader;
pub use error::{Result, SiteError};
pub use extract::css::extract_css_assets;
pub use extract::html::{extract_html_assets, extract_links};
pub use fetchers::{FetchedResource, Fetcher, HttpFetcher};
pub use resolve::{resolve, Resolution};
pub use structure::analyze_page_structure;
pub use tool::{
    Tool, ToolBuilder, ToolDefinition, ANALYZE_PAGE_STRUCTURE, CREATE_SITE_MAP, DOWNLOAD_ASSET,
    EXTRACT_ASSETS, FETCH_PAGE, PARSE_CSS_FOR_ASSETS,
};
pub use types::{
    AnalyzePageRequest, AssetList, AssetReference, CreateSiteMapRequest, CssSource,
    DownloadAssetRequest, DownloadResult, ExtractAssetsRequest, FetchPageRequest, Heading,
    PageResponse, PageStructureSummary, ParseCssRequest, Sitemap, SitemapNode,
    DEFAULT_MAX_DEPTH,
};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "SiteCloner/0.1 (+https://github.com/sitecloner/sitecloner)";

/// Server description for LLM consumption
pub const TOOL_DESCRIPTION: &str = r#"Tools for cloning websites: fetch pages, discover and download assets, crawl sitemaps.

- Resolves every discovered reference to an absolute URL
- Classifies assets as html, css, js, image, font, video or other
- Crawls breadth-first within one site, bounded by depth and page count
- Saves downloads under <output_dir>/<category>/"#;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# SiteCloner Tools

Tools for mirroring a website: fetch its pages, find the assets they use,
download those assets and map how pages link together.

## Tools

### fetch_page
- `url` (required): http:// or https:// URL
- Returns `url` (after redirects), `status_code`, `content_type`, `headers`, `content`
- Non-2xx responses are errors ("HTTP status error: 404")

### extract_assets
- `url` (required): page URL, used to resolve relative references
- `html_content` (required): the HTML to scan
- Returns `assets`: list of `{url, category, source_tag}` in document order,
  deduplicated; `recovered_parse_errors` when the markup was malformed

### parse_css_for_assets
- `css_url` (required): stylesheet URL, used to resolve relative references
- `css_content` (optional): CSS text; fetched from `css_url` when omitted
- Returns `assets` from `url()` and `@import`

### download_asset
- `url` (required): asset URL
- `output_dir` (optional, default "downloaded_site")
- Saves to `<output_dir>/<category>/<filename>`, overwriting an existing file
- Returns `saved_to`, `category`, `content_type`, `size`

### create_site_map
- `url` (required): start page
- `max_depth` (optional, default 1): link depth to follow; 0 visits only the start page
- Only links on the same scheme and host are followed; at most 100 pages by default
- Returns `nodes`: visited URL -> `{depth, title, outgoing_links, error}`

### analyze_page_structure
- `html_content` (required)
- Returns `title`, `headings` ({level, text}), `meta_tags`, landmark flags
  (`has_nav`, `has_footer`, `has_header`, `has_sidebar`, `has_main_content`)
  and element counts

## Examples

```json
{"name": "extract_assets", "arguments": {"url": "https://example.com/", "html_content": "<img src=\"/logo.png\">"}}
```

```json
{"name": "create_site_map", "arguments": {"url": "https://example.com", "max_depth": 2}}
```

## Error Handling
- Invalid or non-http(s) URLs return an error
- Pages that fail during a crawl are kept as nodes with an `error`
- Malformed HTML or CSS never fails; partial results are returned
"#;
