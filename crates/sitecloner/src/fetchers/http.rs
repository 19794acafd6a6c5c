//! HTTP fetcher backed by reqwest

use super::{FetchedResource, Fetcher};
use crate::client::ClientOptions;
use crate::error::{Result, SiteError};
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

/// Production fetcher
///
/// Sends one GET per call with the configured User-Agent. Redirects follow
/// reqwest's default policy; the timeout comes from [`ClientOptions`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher from client options
    pub fn new(options: &ClientOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()
            .map_err(SiteError::ClientBuild)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn get(&self, url: &Url) -> Result<FetchedResource> {
        debug!(fetcher = self.name(), url = %url, "GET");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(SiteError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SiteError::HttpStatus(status.as_u16()));
        }

        let final_url = response.url().clone();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.bytes().await.map_err(SiteError::from_reqwest)?;
        debug!(url = %final_url, status = status.as_u16(), size = body.len(), "fetched");

        Ok(FetchedResource {
            url: final_url,
            status_code: status.as_u16(),
            content_type,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_with_defaults() {
        let fetcher = HttpFetcher::new(&ClientOptions::default()).unwrap();
        assert_eq!(fetcher.name(), "http");
    }

    #[test]
    fn test_invalid_user_agent_falls_back() {
        let options = ClientOptions {
            user_agent: Some("bad\nagent".to_string()),
            ..Default::default()
        };
        assert!(HttpFetcher::new(&options).is_ok());
    }
}
