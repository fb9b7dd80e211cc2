use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::date::parse_timestamp;
use super::{Feed, Post};

/// A post tagged with the feed it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePost {
    #[serde(flatten)]
    pub post: Post,
    pub feed_title: String,
    pub feed_author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_url: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl TimelinePost {
    /// Tags every post of `feed` with its provenance.
    pub fn from_feed(
        feed: &Feed,
        feed_url: Option<&str>,
        given_name: Option<&str>,
        fetched_at: DateTime<Utc>,
    ) -> Vec<TimelinePost> {
        feed.posts
            .iter()
            .map(|post| TimelinePost {
                post: post.clone(),
                feed_title: feed.title.clone(),
                feed_author: feed.author.clone(),
                given_name: given_name.map(String::from),
                feed_url: feed_url.map(String::from),
                fetched_at,
            })
            .collect()
    }

    /// Date used for ordering: `date`, then `id`, then the fetch time.
    pub fn sort_date(&self) -> DateTime<Utc> {
        self.post
            .date
            .as_deref()
            .and_then(parse_timestamp)
            .or_else(|| parse_timestamp(&self.post.id))
            .unwrap_or(self.fetched_at)
    }

    /// The feed URL when known, else `author::title`.
    pub fn feed_identity(&self) -> String {
        match &self.feed_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => format!("{}::{}", self.feed_author, self.feed_title),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowError {
    pub url: String,
    pub error: String,
}

impl FollowError {
    pub fn new(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineResult {
    pub posts: Vec<TimelinePost>,
    pub errors: Vec<FollowError>,
}
