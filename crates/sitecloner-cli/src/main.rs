//! SiteCloner CLI - run the site cloning tools from a shell or as an MCP server

mod mcp;

use clap::{Parser, Subcommand};
use serde::Serialize;
use sitecloner::{
    AnalyzePageRequest, CreateSiteMapRequest, DownloadAssetRequest, ExtractAssetsRequest,
    ParseCssRequest, SiteError, Tool, ToolBuilder, TOOL_LLMTXT,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// SiteCloner - website mirroring tools for LLM agents
#[derive(Parser, Debug)]
#[command(name = "sitecloner")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,

    /// Custom User-Agent
    #[arg(long, global = true)]
    user_agent: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    /// Maximum pages visited by one crawl
    #[arg(long, global = true, default_value_t = sitecloner::client::DEFAULT_MAX_PAGES)]
    max_pages: usize,

    /// Default directory for downloaded assets
    #[arg(long, global = true, default_value = sitecloner::client::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as MCP (Model Context Protocol) server over stdio
    Mcp,
    /// Fetch a page and print it as JSON
    Fetch {
        /// URL to fetch
        url: String,
    },
    /// Fetch a page (or read a local file) and list the assets it references
    Assets {
        /// Page URL, also used to resolve relative references
        url: String,

        /// Read HTML from this file instead of fetching the URL
        #[arg(long)]
        html_file: Option<PathBuf>,
    },
    /// List assets referenced by a stylesheet
    Css {
        /// Stylesheet URL
        url: String,

        /// Read CSS from this file instead of fetching the URL
        #[arg(long)]
        css_file: Option<PathBuf>,
    },
    /// Download one asset into <output-dir>/<category>/
    Download {
        /// Asset URL
        url: String,
    },
    /// Crawl a site and print its sitemap
    Sitemap {
        /// Start URL
        url: String,

        /// Link depth to follow from the start page
        #[arg(long, short, default_value_t = sitecloner::DEFAULT_MAX_DEPTH)]
        depth: usize,
    },
    /// Summarize the structure of a page
    Analyze {
        /// Page URL to fetch
        #[arg(required_unless_present = "html_file")]
        url: Option<String>,

        /// Read HTML from this file instead
        #[arg(long)]
        html_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // stdout carries tool output and JSON-RPC; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut cli = Cli::parse();

    // Handle --llmtxt flag
    if cli.llmtxt {
        writeln_safe(TOOL_LLMTXT);
        std::process::exit(0);
    }

    let Some(command) = cli.command.take() else {
        eprintln!("Usage: sitecloner <fetch|assets|css|download|sitemap|analyze> <URL>");
        eprintln!("   or: sitecloner mcp");
        eprintln!("   or: sitecloner --help");
        std::process::exit(1);
    };

    let tool = match builder_from(&cli).build() {
        Ok(tool) => tool,
        Err(e) => exit_with(e),
    };

    let result = match command {
        Commands::Mcp => {
            mcp::run_server(tool).await;
            return;
        }
        Commands::Fetch { url } => tool.fetch_page(&url).await.map(to_pretty),
        Commands::Assets { url, html_file } => run_assets(&tool, url, html_file).await,
        Commands::Css { url, css_file } => run_css(&tool, url, css_file).await,
        Commands::Download { url } => tool
            .download_asset(DownloadAssetRequest {
                url,
                output_dir: None,
            })
            .await
            .map(to_pretty),
        Commands::Sitemap { url, depth } => tool
            .create_site_map(CreateSiteMapRequest::new(url).max_depth(depth))
            .await
            .map(to_pretty),
        Commands::Analyze { url, html_file } => run_analyze(&tool, url, html_file).await,
    };

    match result {
        Ok(json) => writeln_safe(&json),
        Err(e) => exit_with(e),
    }
}

fn builder_from(cli: &Cli) -> ToolBuilder {
    let mut builder = Tool::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .max_pages(cli.max_pages)
        .output_dir(cli.output_dir.clone());
    if let Some(ua) = &cli.user_agent {
        builder = builder.user_agent(ua.clone());
    }
    builder
}

async fn run_assets(
    tool: &Tool,
    url: String,
    html_file: Option<PathBuf>,
) -> Result<String, SiteError> {
    let (url, html_content) = match html_file {
        Some(path) => (url, read_file(&path)?),
        None => {
            let page = tool.fetch_page(&url).await?;
            (page.url, page.content)
        }
    };
    tool.extract_assets(ExtractAssetsRequest { url, html_content })
        .map(to_pretty)
}

async fn run_css(tool: &Tool, url: String, css_file: Option<PathBuf>) -> Result<String, SiteError> {
    let mut req = ParseCssRequest::new(url);
    if let Some(path) = css_file {
        req = req.with_content(read_file(&path)?);
    }
    tool.parse_css_for_assets(req).await.map(to_pretty)
}

async fn run_analyze(
    tool: &Tool,
    url: Option<String>,
    html_file: Option<PathBuf>,
) -> Result<String, SiteError> {
    let html_content = match (html_file, url) {
        (Some(path), _) => read_file(&path)?,
        (None, Some(url)) => tool.fetch_page(&url).await?.content,
        (None, None) => return Err(SiteError::MissingInput("url or --html-file".to_string())),
    };
    Ok(to_pretty(
        tool.analyze_page_structure(AnalyzePageRequest { html_content }),
    ))
}

fn read_file(path: &Path) -> Result<String, SiteError> {
    std::fs::read_to_string(path).map_err(|e| {
        SiteError::MissingInput(format!("could not read {}: {}", path.display(), e))
    })
}

fn to_pretty<T: Serialize>(value: T) -> String {
    serde_json::to_string_pretty(&value).unwrap_or_else(|e| {
        eprintln!("Error serializing response: {}", e);
        std::process::exit(1);
    })
}

fn exit_with(err: SiteError) -> ! {
    eprintln!("Error: {}", err);
    std::process::exit(1);
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
