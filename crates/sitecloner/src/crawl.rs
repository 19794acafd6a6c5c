//! Bounded breadth-first site crawl
//!
//! One crawl owns its queue, visited set and result map; nothing survives the
//! call. Pages are fetched strictly one after another.

use crate::client::DEFAULT_MAX_PAGES;
use crate::error::Result;
use crate::extract::html::harvest_links;
use crate::fetchers::Fetcher;
use crate::resolve::{origin_of, parse_web_url, same_origin};
use crate::structure::page_title;
use crate::types::{Sitemap, SitemapNode};
use scraper::Html;
use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::{debug, info, warn};
use url::Url;

/// Crawls one site through a [`Fetcher`]
pub struct SiteCrawler<'a> {
    fetcher: &'a dyn Fetcher,
    max_pages: usize,
}

impl<'a> SiteCrawler<'a> {
    pub fn new(fetcher: &'a dyn Fetcher) -> Self {
        Self {
            fetcher,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Stop after this many visited pages, whatever the depth
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Crawl from `start_url`, following same-origin links up to `max_depth`
    ///
    /// The start page has depth 0. Pages that fail to fetch are recorded with
    /// an error and no links; only an invalid start URL fails the call.
    pub async fn crawl(&self, start_url: &str, max_depth: usize) -> Result<Sitemap> {
        let mut start = parse_web_url(start_url)?;
        start.set_fragment(None);

        info!(url = %start, max_depth, max_pages = self.max_pages, "Starting crawl");

        let mut queue: VecDeque<(Url, usize)> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut nodes: BTreeMap<String, SitemapNode> = BTreeMap::new();
        let mut truncated = false;

        visited.insert(start.to_string());
        queue.push_back((start.clone(), 0));

        while let Some((url, depth)) = queue.pop_front() {
            if nodes.len() >= self.max_pages {
                warn!(
                    max_pages = self.max_pages,
                    pending = queue.len() + 1,
                    "Page limit reached, stopping crawl"
                );
                truncated = true;
                break;
            }
            if depth > max_depth {
                continue;
            }

            let node = match self.visit(&url).await {
                Ok(Visit { final_url, title, links }) => {
                    // a redirect target is the same page; never fetch it again
                    visited.insert(final_url.to_string());
                    if depth < max_depth {
                        for link in &links {
                            if same_origin(link, &start) && visited.insert(link.to_string()) {
                                queue.push_back((link.clone(), depth + 1));
                            }
                        }
                    }
                    debug!(url = %url, depth, links = links.len(), "Visited page");
                    SitemapNode {
                        url: url.to_string(),
                        depth,
                        title,
                        outgoing_links: links.into_iter().map(String::from).collect(),
                        error: None,
                    }
                }
                Err(e) => {
                    warn!(url = %url, depth, error = %e, "Failed to fetch page");
                    SitemapNode {
                        url: url.to_string(),
                        depth,
                        title: None,
                        outgoing_links: Vec::new(),
                        error: Some(e.to_string()),
                    }
                }
            };

            nodes.insert(node.url.clone(), node);
        }

        info!(pages = nodes.len(), truncated, "Crawl finished");

        Ok(Sitemap {
            start_url: start.to_string(),
            base_url: origin_of(&start),
            max_depth,
            pages: nodes.len(),
            truncated,
            nodes,
        })
    }

    async fn visit(&self, url: &Url) -> Result<Visit> {
        let resource = self.fetcher.get(url).await?;
        let text = resource.text()?;
        Ok(parse_page(&text, resource.url))
    }
}

/// What a successful fetch contributed to the crawl
struct Visit {
    /// URL the page was served from, after redirects
    final_url: Url,
    title: Option<String>,
    links: Vec<Url>,
}

fn parse_page(html: &str, final_url: Url) -> Visit {
    let document = Html::parse_document(html);
    Visit {
        title: page_title(&document),
        links: harvest_links(&document, &final_url),
        final_url,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::SiteError;
    use crate::fetchers::FetchedResource;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory site; unknown URLs answer 404
    #[derive(Default)]
    pub(crate) struct StaticSite {
        pages: HashMap<String, (&'static str, Bytes)>,
        redirects: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl StaticSite {
        pub(crate) fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                ("text/html", Bytes::from(html.to_string())),
            );
            self
        }

        pub(crate) fn file(mut self, url: &str, content_type: &'static str, body: &[u8]) -> Self {
            self.pages
                .insert(url.to_string(), (content_type, Bytes::from(body.to_vec())));
            self
        }

        /// Serve `to` whenever `from` is requested
        pub(crate) fn redirect(mut self, from: &str, to: &str) -> Self {
            self.redirects.insert(from.to_string(), to.to_string());
            self
        }

        pub(crate) fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for StaticSite {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn get(&self, url: &Url) -> Result<FetchedResource> {
            self.requests.lock().unwrap().push(url.to_string());
            let target = self
                .redirects
                .get(url.as_str())
                .map(String::as_str)
                .unwrap_or(url.as_str());
            match self.pages.get(target) {
                Some((content_type, body)) => Ok(FetchedResource {
                    url: Url::parse(target).unwrap(),
                    status_code: 200,
                    content_type: Some(content_type.to_string()),
                    headers: Default::default(),
                    body: body.clone(),
                }),
                None => Err(SiteError::HttpStatus(404)),
            }
        }
    }

    fn links(targets: &[&str]) -> String {
        targets
            .iter()
            .map(|t| format!(r#"<a href="{t}">{t}</a>"#))
            .collect()
    }

    #[tokio::test]
    async fn test_depth_zero_visits_only_start() {
        let site = StaticSite::default().page(
            "https://x.com/",
            &format!("<title>Home</title>{}", links(&["/a", "/b", "https://other.org/"])),
        );
        let map = SiteCrawler::new(&site).crawl("https://x.com", 0).await.unwrap();

        assert_eq!(map.pages, 1);
        let root = map.get("https://x.com/").unwrap();
        assert_eq!(root.depth, 0);
        assert_eq!(root.title.as_deref(), Some("Home"));
        assert_eq!(
            root.outgoing_links,
            vec!["https://x.com/a", "https://x.com/b", "https://other.org/"]
        );
        assert_eq!(site.requests(), vec!["https://x.com/"]);
        assert!(!map.truncated);
    }

    #[tokio::test]
    async fn test_cycles_terminate() {
        let site = StaticSite::default()
            .page("https://x.com/", &links(&["/a"]))
            .page("https://x.com/a", &links(&["/b", "/"]))
            .page("https://x.com/b", &links(&["/a", "/"]));
        let map = SiteCrawler::new(&site).crawl("https://x.com/", 10).await.unwrap();

        assert_eq!(map.pages, 3);
        assert_eq!(map.get("https://x.com/a").unwrap().depth, 1);
        assert_eq!(map.get("https://x.com/b").unwrap().depth, 2);
        // each page fetched exactly once
        assert_eq!(site.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_redirect_target_not_fetched_again() {
        let site = StaticSite::default()
            .page("https://x.com/", &links(&["/old"]))
            .redirect("https://x.com/old", "https://x.com/new")
            .page("https://x.com/new", &links(&["/new", "/", "sub"]))
            .page("https://x.com/sub", "");
        let map = SiteCrawler::new(&site).crawl("https://x.com/", 5).await.unwrap();

        assert!(map.get("https://x.com/new").is_none());
        let old = map.get("https://x.com/old").unwrap();
        assert_eq!(old.depth, 1);
        // links resolve against the final URL
        assert_eq!(
            old.outgoing_links,
            vec!["https://x.com/new", "https://x.com/", "https://x.com/sub"]
        );
        assert_eq!(
            site.requests(),
            vec!["https://x.com/", "https://x.com/old", "https://x.com/sub"]
        );
    }

    #[tokio::test]
    async fn test_depth_never_exceeds_max() {
        let site = StaticSite::default()
            .page("https://x.com/", &links(&["/1"]))
            .page("https://x.com/1", &links(&["/2"]))
            .page("https://x.com/2", &links(&["/3"]))
            .page("https://x.com/3", &links(&["/4"]));
        let map = SiteCrawler::new(&site).crawl("https://x.com/", 2).await.unwrap();

        assert_eq!(map.pages, 3);
        assert!(map.nodes.values().all(|n| n.depth <= 2));
        assert!(map.get("https://x.com/3").is_none());
        assert_eq!(
            map.get("https://x.com/2").unwrap().outgoing_links,
            vec!["https://x.com/3"]
        );
    }

    #[tokio::test]
    async fn test_breadth_first_assigns_shortest_depth() {
        let site = StaticSite::default()
            .page("https://x.com/", &links(&["/a", "/c"]))
            .page("https://x.com/a", &links(&["/c"]))
            .page("https://x.com/c", "");
        let map = SiteCrawler::new(&site).crawl("https://x.com/", 3).await.unwrap();
        assert_eq!(map.get("https://x.com/c").unwrap().depth, 1);
    }

    #[tokio::test]
    async fn test_cross_origin_links_not_followed() {
        let site = StaticSite::default().page(
            "https://x.com/",
            &links(&["https://other.org/page", "http://x.com/insecure", "/local"]),
        );
        let map = SiteCrawler::new(&site).crawl("https://x.com/", 1).await.unwrap();

        assert_eq!(map.pages, 2);
        assert_eq!(map.get("https://x.com/").unwrap().outgoing_links.len(), 3);
        assert!(map.get("https://other.org/page").is_none());
        assert!(map.get("http://x.com/insecure").is_none());
        // the missing local page is recorded with its error
        let local = map.get("https://x.com/local").unwrap();
        assert!(local.outgoing_links.is_empty());
        assert_eq!(local.error.as_deref(), Some("HTTP status error: 404"));
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_crawl() {
        let site = StaticSite::default()
            .page("https://x.com/", &links(&["/broken", "/logo.png", "/ok"]))
            .file("https://x.com/logo.png", "image/png", b"\x89PNG")
            .page("https://x.com/ok", "<title>Ok</title>");
        let map = SiteCrawler::new(&site).crawl("https://x.com/", 1).await.unwrap();

        assert_eq!(map.pages, 4);
        assert!(map.get("https://x.com/broken").unwrap().error.is_some());
        assert!(map
            .get("https://x.com/logo.png")
            .unwrap()
            .error
            .as_deref()
            .unwrap()
            .starts_with("Decode error"));
        assert_eq!(
            map.get("https://x.com/ok").unwrap().title.as_deref(),
            Some("Ok")
        );
    }

    #[tokio::test]
    async fn test_page_limit_truncates() {
        let targets: Vec<String> = (0..10).map(|i| format!("/p{i}")).collect();
        let refs: Vec<&str> = targets.iter().map(String::as_str).collect();
        let site = StaticSite::default().page("https://x.com/", &links(&refs));

        let map = SiteCrawler::new(&site)
            .with_max_pages(3)
            .crawl("https://x.com/", 1)
            .await
            .unwrap();

        assert_eq!(map.pages, 3);
        assert!(map.truncated);
        assert_eq!(site.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_unreachable_start_page_is_a_node() {
        let site = StaticSite::default();
        let map = SiteCrawler::new(&site).crawl("https://x.com/", 1).await.unwrap();
        assert_eq!(map.pages, 1);
        assert_eq!(map.base_url, "https://x.com");
        assert!(map.get("https://x.com/").unwrap().error.is_some());
    }

    #[tokio::test]
    async fn test_invalid_start_url_fails() {
        let site = StaticSite::default();
        let result = SiteCrawler::new(&site).crawl("mailto:me@x.com", 1).await;
        assert!(matches!(result, Err(SiteError::InvalidUrl { .. })));
        assert!(site.requests().is_empty());
    }
}
