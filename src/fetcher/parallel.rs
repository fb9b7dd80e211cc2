use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Semaphore;

use crate::domain::{FollowError, TimelinePost};
use crate::fetcher::{fetch_and_parse_feed, Fetcher, FollowEntry};

pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const INVALID_ENTRY: &str = "Invalid follow entry format";
pub const UNREACHABLE_FEED: &str =
    "Could not fetch or parse the feed (check URL or network connection)";

/// What a single follow contributed to the timeline.
pub type FollowOutcome = std::result::Result<Vec<TimelinePost>, FollowError>;

/// Fetches followed feeds concurrently with a bounded number of workers.
#[derive(Clone)]
pub struct ParallelFetcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
}

impl ParallelFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self::with_workers(fetcher, DEFAULT_WORKERS, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_workers(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        workers: usize,
        timeout_secs: u64,
    ) -> Self {
        Self {
            fetcher,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Fetches every follow entry and waits for all of them to settle.
    ///
    /// Outcomes are returned in the order of `follows`.
    pub async fn fetch_all(&self, follows: &[String]) -> Vec<FollowOutcome> {
        let handles: Vec<_> = follows
            .iter()
            .map(|entry| {
                let fetcher = self.fetcher.clone();
                let semaphore = self.semaphore.clone();
                let timeout = self.timeout;
                let entry = entry.clone();

                tokio::spawn(async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return Err(FollowError::new(entry, "Fetcher was shut down"));
                    };
                    fetch_follow(fetcher.as_ref(), &entry, timeout).await
                })
            })
            .collect();

        futures::future::join_all(handles)
            .await
            .into_iter()
            .zip(follows)
            .map(|(joined, entry)| {
                joined.unwrap_or_else(|e| {
                    tracing::error!("Task join error: {}", e);
                    let url = FollowEntry::parse(entry)
                        .map(|f| f.url)
                        .unwrap_or_else(|| entry.clone());
                    Err(FollowError::new(url, e.to_string()))
                })
            })
            .collect()
    }
}

async fn fetch_follow(
    fetcher: &(dyn Fetcher + Send + Sync),
    entry: &str,
    timeout: Duration,
) -> FollowOutcome {
    let Some(follow) = FollowEntry::parse(entry) else {
        return Err(FollowError::new(entry, INVALID_ENTRY));
    };

    let feed = match tokio::time::timeout(timeout, fetch_and_parse_feed(fetcher, &follow.url)).await
    {
        Ok(Some(feed)) => feed,
        Ok(None) => return Err(FollowError::new(follow.url, UNREACHABLE_FEED)),
        Err(_) => {
            return Err(FollowError::new(
                follow.url,
                format!("Timed out after {}s", timeout.as_secs()),
            ))
        }
    };

    let posts = TimelinePost::from_feed(
        &feed,
        Some(&follow.url),
        follow.given_name.as_deref(),
        Utc::now(),
    );
    tracing::debug!("Fetched {} posts from {}", posts.len(), follow.url);
    Ok(posts)
}
