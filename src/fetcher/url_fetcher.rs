use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::app::{CasaError, Result};
use crate::config::FetchConfig;
use crate::fetcher::Fetcher;

/// Reads `file://` URLs from disk and everything else over HTTP(S).
pub struct UrlFetcher {
    client: Client,
}

impl UrlFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }

    async fn fetch_file(&self, url: &str) -> Result<String> {
        let path = Url::parse(url)?
            .to_file_path()
            .map_err(|_| CasaError::Other(format!("Not a local file URL: {}", url)))?;
        Ok(tokio::fs::read_to_string(path).await?)
    }

    async fn fetch_http(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl Fetcher for UrlFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        if url.starts_with("file://") {
            tracing::debug!("Reading local feed {}", url);
            self.fetch_file(url).await
        } else {
            tracing::debug!("Requesting {}", url);
            self.fetch_http(url).await
        }
    }
}
