pub mod parallel;
pub mod url_fetcher;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::Feed;
use crate::parser::parse_feed;

pub use parallel::{FollowOutcome, ParallelFetcher, DEFAULT_WORKERS};
pub use url_fetcher::UrlFetcher;

/// Retrieves the raw text of a feed document.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// A parsed `[<given-name> ]<url>` follow entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowEntry {
    pub given_name: Option<String>,
    pub url: String,
}

impl FollowEntry {
    /// The last whitespace-separated token is the URL, anything before it the name.
    pub fn parse(entry: &str) -> Option<Self> {
        let mut parts: Vec<&str> = entry.split_whitespace().collect();
        let url = parts.pop()?.to_string();
        let given_name = if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        };
        Some(Self { given_name, url })
    }
}

/// Fetches and parses a feed, degrading every retrieval failure to `None`.
///
/// Parser errors do not discard the feed; they are only logged.
pub async fn fetch_and_parse_feed(
    fetcher: &(dyn Fetcher + Send + Sync),
    url: &str,
) -> Option<Feed> {
    let raw = match fetcher.fetch(url).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!("Fetching {} failed: {}", url, e);
            return None;
        }
    };

    let result = parse_feed(&raw);
    for error in &result.errors.header {
        tracing::warn!("Feed {}: {}", url, error);
    }
    if !result.errors.is_empty() {
        tracing::debug!("Feed {} has {} parse errors", url, result.errors.len());
    }

    Some(result.feed)
}
