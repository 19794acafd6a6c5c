//! Saving a single asset to disk

use crate::classify::AssetCategory;
use crate::error::{Result, SiteError};
use crate::fetchers::Fetcher;
use crate::resolve::parse_web_url;
use crate::types::DownloadResult;
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

/// File name used when the URL path names a directory
const INDEX_FILE_NAME: &str = "index.html";

/// Downloads assets into `<output_dir>/<category>/<basename>`
///
/// An existing file with the same name is overwritten.
pub struct AssetDownloader<'a> {
    fetcher: &'a dyn Fetcher,
}

impl<'a> AssetDownloader<'a> {
    pub fn new(fetcher: &'a dyn Fetcher) -> Self {
        Self { fetcher }
    }

    pub async fn download(&self, url: &str, output_dir: &Path) -> Result<DownloadResult> {
        let url = parse_web_url(url)?;
        let resource = self.fetcher.get(&url).await?;

        let category = match AssetCategory::from_extension(&url) {
            AssetCategory::Other => resource
                .content_type
                .as_deref()
                .map(AssetCategory::from_content_type)
                .unwrap_or(AssetCategory::Other),
            category => category,
        };

        let dir = output_dir.join(category.as_str());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| SiteError::Write {
                path: dir.clone(),
                source,
            })?;

        let path: PathBuf = dir.join(asset_file_name(&url));
        tokio::fs::write(&path, &resource.body)
            .await
            .map_err(|source| SiteError::Write {
                path: path.clone(),
                source,
            })?;

        info!(url = %url, path = %path.display(), size = resource.body.len(), "Saved asset");

        Ok(DownloadResult {
            url: url.to_string(),
            saved_to: path.display().to_string(),
            category,
            content_type: resource.content_type,
            size: resource.body.len() as u64,
        })
    }
}

/// Local file name for a URL
///
/// The last path segment, or `index.html` for directory-like paths. A query
/// string is folded into the name so `a.css?v=1` and `a.css?v=2` differ.
pub fn asset_file_name(url: &Url) -> String {
    let last = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    let mut name = match last {
        "" | "." | ".." => INDEX_FILE_NAME.to_string(),
        segment => sanitize(segment),
    };

    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        name.push('_');
        name.push_str(&sanitize(query));
    }

    name
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '%' | '@') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::tests::StaticSite;

    fn name(url: &str) -> String {
        asset_file_name(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_asset_file_name() {
        assert_eq!(name("https://x.com/img/logo.png"), "logo.png");
        assert_eq!(name("https://x.com/"), "index.html");
        assert_eq!(name("https://x.com"), "index.html");
        assert_eq!(name("https://x.com/docs/"), "index.html");
        assert_eq!(name("https://x.com/app.js?v=1.2&x=y"), "app.js_v_1.2_x_y");
        assert_eq!(name("https://x.com/a%20b.css"), "a%20b.css");
    }

    #[tokio::test]
    async fn test_download_by_extension() {
        let site = StaticSite::default().file(
            "https://x.com/img/logo.png",
            "application/octet-stream",
            b"\x89PNG",
        );
        let dir = tempfile::tempdir().unwrap();

        let result = AssetDownloader::new(&site)
            .download("https://x.com/img/logo.png", dir.path())
            .await
            .unwrap();

        assert_eq!(result.category, AssetCategory::Image);
        assert_eq!(result.size, 4);
        let saved = dir.path().join("image").join("logo.png");
        assert_eq!(result.saved_to, saved.display().to_string());
        assert_eq!(std::fs::read(saved).unwrap(), b"\x89PNG");
    }

    #[tokio::test]
    async fn test_download_falls_back_to_content_type() {
        let site = StaticSite::default().file("https://x.com/fonts/inter", "font/woff2", b"wOF2");
        let dir = tempfile::tempdir().unwrap();

        let result = AssetDownloader::new(&site)
            .download("https://x.com/fonts/inter", dir.path())
            .await
            .unwrap();

        assert_eq!(result.category, AssetCategory::Font);
        assert!(dir.path().join("font").join("inter").exists());
    }

    #[tokio::test]
    async fn test_download_overwrites() {
        let site = StaticSite::default().file("https://x.com/a.css", "text/css", b"new");
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("css")).unwrap();
        std::fs::write(dir.path().join("css").join("a.css"), b"old").unwrap();

        AssetDownloader::new(&site)
            .download("https://x.com/a.css", dir.path())
            .await
            .unwrap();

        assert_eq!(
            std::fs::read(dir.path().join("css").join("a.css")).unwrap(),
            b"new"
        );
    }

    #[tokio::test]
    async fn test_download_write_error() {
        let site = StaticSite::default().file("https://x.com/a.js", "text/javascript", b"1");
        let dir = tempfile::tempdir().unwrap();
        // a file where the output directory should be
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, b"").unwrap();

        let result = AssetDownloader::new(&site)
            .download("https://x.com/a.js", &blocker)
            .await;

        assert!(matches!(result, Err(SiteError::Write { .. })));
    }

    #[tokio::test]
    async fn test_download_http_error() {
        let site = StaticSite::default();
        let dir = tempfile::tempdir().unwrap();
        let result = AssetDownloader::new(&site)
            .download("https://x.com/missing.png", dir.path())
            .await;
        assert!(matches!(result, Err(SiteError::HttpStatus(404))));
        assert!(!dir.path().join("image").exists());
    }
}
