//! Merges the user's feed with the feeds it follows.

use std::collections::HashMap;

use chrono::Utc;

use crate::domain::{Feed, TimelinePost, TimelineResult};
use crate::fetcher::ParallelFetcher;

/// Given name attached to the user's own posts.
pub const OWN_FEED_NAME: &str = "me";

/// Builds the timeline for `user_feed` and every feed it follows.
///
/// Never fails: follows that cannot be fetched are reported in `errors` and
/// the user's own posts are always included.
pub async fn assemble_timeline(
    fetcher: &ParallelFetcher,
    user_feed: &Feed,
    user_feed_url: Option<&str>,
) -> TimelineResult {
    let mut posts =
        TimelinePost::from_feed(user_feed, user_feed_url, Some(OWN_FEED_NAME), Utc::now());
    let mut errors = Vec::new();

    if !user_feed.follows.is_empty() {
        tracing::info!("Fetching {} followed feeds", user_feed.follows.len());

        for outcome in fetcher.fetch_all(&user_feed.follows).await {
            match outcome {
                Ok(follow_posts) => posts.extend(follow_posts),
                Err(error) => {
                    tracing::warn!("Skipping {}: {}", error.url, error.error);
                    errors.push(error);
                }
            }
        }
    }

    sort_posts_by_date(&mut posts);
    let posts = filter_superseded_posts(posts);
    tracing::info!(
        "Assembled timeline with {} posts ({} follow errors)",
        posts.len(),
        errors.len()
    );

    TimelineResult { posts, errors }
}

/// Oldest first. Equal dates keep their insertion order.
pub fn sort_posts_by_date(posts: &mut [TimelinePost]) {
    posts.sort_by_cached_key(TimelinePost::sort_date);
}

/// Drops every post replaced by another post of the same feed.
///
/// A `supersedes` pointing at a missing id or at another feed's post has no
/// effect.
pub fn filter_superseded_posts(posts: Vec<TimelinePost>) -> Vec<TimelinePost> {
    let keep: Vec<bool> = {
        let identities: Vec<String> = posts.iter().map(TimelinePost::feed_identity).collect();

        // (superseded id, feed identity) -> indices of the superseding posts
        let mut superseded: HashMap<(&str, &str), Vec<usize>> = HashMap::new();
        for (idx, post) in posts.iter().enumerate() {
            if let Some(target) = post.post.supersedes.as_deref() {
                superseded
                    .entry((target, identities[idx].as_str()))
                    .or_default()
                    .push(idx);
            }
        }

        posts
            .iter()
            .enumerate()
            .map(|(idx, post)| {
                superseded
                    .get(&(post.post.id.as_str(), identities[idx].as_str()))
                    .map_or(true, |by| by.iter().all(|&other| other == idx))
            })
            .collect()
    };

    posts
        .into_iter()
        .zip(keep)
        .filter_map(|(post, keep)| keep.then_some(post))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;
    use crate::domain::{FollowError, Post};
    use crate::fetcher::parallel::UNREACHABLE_FEED;
    use crate::fetcher::testing::MemoryFetcher;

    fn feed(posts: Vec<Post>) -> Feed {
        let mut feed = Feed::new("Test Feed", "Test Author");
        feed.posts = posts;
        feed
    }

    fn offline() -> ParallelFetcher {
        ParallelFetcher::new(Arc::new(MemoryFetcher::default()))
    }

    fn ids(result: &TimelineResult) -> Vec<&str> {
        result.posts.iter().map(|p| p.post.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_filters_superseded_posts() {
        let feed = feed(vec![
            Post::new("2024-01-01T10:00:00Z", "Original post"),
            Post::new("2024-01-01T11:00:00Z", "Another post"),
            Post::new("2024-01-01T12:00:00Z", "Updated").superseding("2024-01-01T10:00:00Z"),
        ]);

        let result = assemble_timeline(&offline(), &feed, None).await;

        assert_eq!(ids(&result), vec!["2024-01-01T11:00:00Z", "2024-01-01T12:00:00Z"]);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_supersede_chain_keeps_latest() {
        let feed = feed(vec![
            Post::new("2024-01-01T10:00:00Z", "Version 1"),
            Post::new("2024-01-01T11:00:00Z", "Version 2").superseding("2024-01-01T10:00:00Z"),
            Post::new("2024-01-01T12:00:00Z", "Version 3").superseding("2024-01-01T11:00:00Z"),
        ]);

        let result = assemble_timeline(&offline(), &feed, None).await;

        assert_eq!(ids(&result), vec!["2024-01-01T12:00:00Z"]);
        assert_eq!(result.posts[0].post.content, "Version 3");
    }

    #[tokio::test]
    async fn test_dangling_supersede_is_ignored() {
        let feed = feed(vec![
            Post::new("2024-01-01T10:00:00Z", "Post 1"),
            Post::new("2024-01-01T11:00:00Z", "Post 2").superseding("2024-01-01T09:00:00Z"),
        ]);

        let result = assemble_timeline(&offline(), &feed, None).await;

        assert_eq!(ids(&result), vec!["2024-01-01T10:00:00Z", "2024-01-01T11:00:00Z"]);
    }

    #[tokio::test]
    async fn test_cannot_supersede_another_feeds_post() {
        let mut user = feed(vec![
            Post::new("2024-01-01T12:00:00Z", "Hiding bob").superseding("2024-01-01T11:00:00Z"),
        ]);
        user.follows = vec!["bob https://bob.example".to_string()];
        let fetcher = MemoryFetcher::default().with(
            "https://bob.example",
            ":title: Bob\n:author: bob\n\n**\n:id: 2024-01-01T11:00:00Z\n\nbob's post\n",
        );

        let result = assemble_timeline(
            &ParallelFetcher::new(Arc::new(fetcher)),
            &user,
            Some("file:///home/me/feed.txt"),
        )
        .await;

        assert_eq!(ids(&result), vec!["2024-01-01T11:00:00Z", "2024-01-01T12:00:00Z"]);
        assert_eq!(result.posts[0].given_name.as_deref(), Some("bob"));
    }

    #[test]
    fn test_same_id_in_other_feed_survives() {
        let fetched_at = Utc::now();
        let mut mine = feed(vec![
            Post::new("x", "mine"),
            Post::new("y", "fix").superseding("x"),
        ]);
        let mut theirs = Feed::new("Other", "someone");
        theirs.posts.push(Post::new("x", "theirs"));
        mine.title = "Mine".into();

        let mut posts = TimelinePost::from_feed(&mine, None, Some("me"), fetched_at);
        posts.extend(TimelinePost::from_feed(&theirs, None, None, fetched_at));
        let posts = filter_superseded_posts(posts);

        let contents: Vec<&str> = posts.iter().map(|p| p.post.content.as_str()).collect();
        assert_eq!(contents, vec!["fix", "theirs"]);
    }

    #[test]
    fn test_self_supersede_keeps_post() {
        let posts = TimelinePost::from_feed(
            &feed(vec![Post::new("a", "loop").superseding("a")]),
            None,
            None,
            Utc::now(),
        );
        assert_eq!(filter_superseded_posts(posts).len(), 1);
    }

    #[test]
    fn test_sort_uses_date_then_id_then_fetch_time() {
        let fetched_at = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let feed = feed(vec![
            Post::new("no-date", "fetched"),
            Post::new("2024-01-03T00:00:00Z", "by id"),
            Post::new("2030-01-01T00:00:00Z", "by date").with_date("2024-01-01T00:00:00Z"),
        ]);
        let mut posts = TimelinePost::from_feed(&feed, None, None, fetched_at);

        sort_posts_by_date(&mut posts);

        let contents: Vec<&str> = posts.iter().map(|p| p.post.content.as_str()).collect();
        assert_eq!(contents, vec!["by date", "fetched", "by id"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let fetched_at = Utc::now();
        let feed = feed(vec![
            Post::new("b", "first"),
            Post::new("a", "second"),
            Post::new("c", "third"),
        ]);
        let mut posts = TimelinePost::from_feed(&feed, None, None, fetched_at);

        sort_posts_by_date(&mut posts);

        let contents: Vec<&str> = posts.iter().map(|p| p.post.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_partial_follow_failures() {
        let mut user = feed(vec![Post::new("2024-01-01T09:00:00Z", "mine")]);
        user.follows = vec![
            "alice https://alice.example".to_string(),
            "https://gone.example".to_string(),
            "".to_string(),
        ];
        let fetcher = MemoryFetcher::default().with(
            "https://alice.example",
            ":title: Alice\n:author: alice\n\n**\n:id: 2024-01-01T10:00:00Z\n\nhers\n",
        );

        let result =
            assemble_timeline(&ParallelFetcher::new(Arc::new(fetcher)), &user, None).await;

        assert_eq!(ids(&result), vec!["2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z"]);
        assert_eq!(result.posts[0].given_name.as_deref(), Some(OWN_FEED_NAME));
        assert_eq!(result.errors.len(), 2);
        assert!(result
            .errors
            .contains(&FollowError::new("https://gone.example", UNREACHABLE_FEED)));
        assert!(result
            .errors
            .contains(&FollowError::new("", "Invalid follow entry format")));
    }

    #[tokio::test]
    async fn test_equal_dates_keep_user_posts_first() {
        let mut user = feed(vec![Post::new("2024-01-01T10:00:00Z", "mine")]);
        user.follows = vec![
            "https://b.example".to_string(),
            "https://a.example".to_string(),
        ];
        let fetcher = MemoryFetcher::default()
            .with(
                "https://a.example",
                ":title: A\n:author: a\n\n**\n:id: 2024-01-01T10:00:00Z\n\nfrom a\n",
            )
            .with(
                "https://b.example",
                ":title: B\n:author: b\n\n**\n:id: 2024-01-01T10:00:00Z\n\nfrom b\n",
            );

        let result =
            assemble_timeline(&ParallelFetcher::new(Arc::new(fetcher)), &user, None).await;

        let contents: Vec<&str> = result.posts.iter().map(|p| p.post.content.as_str()).collect();
        assert_eq!(contents, vec!["mine", "from b", "from a"]);
    }

    #[tokio::test]
    async fn test_no_follows_returns_own_posts() {
        let feed = feed(vec![Post::new("1", "only")]);

        let result = assemble_timeline(&offline(), &feed, Some("file:///feed.txt")).await;

        assert_eq!(result.posts.len(), 1);
        assert_eq!(result.posts[0].feed_url.as_deref(), Some("file:///feed.txt"));
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_follow_with_header_errors_still_contributes_posts() {
        let mut user = feed(vec![Post::new("2024-01-01T09:00:00Z", "mine")]);
        user.follows = vec!["bob https://bob.example".to_string()];
        let fetcher = MemoryFetcher::default().with(
            "https://bob.example",
            ":author: bob\n\n**\n:id: 2024-01-01T10:00:00Z\n\nbob post\n",
        );

        let result =
            assemble_timeline(&ParallelFetcher::new(Arc::new(fetcher)), &user, None).await;

        assert!(result.errors.is_empty());
        assert_eq!(ids(&result), vec!["2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z"]);
        assert_eq!(result.posts[1].post.content, "bob post");
        assert_eq!(result.posts[1].feed_url.as_deref(), Some("https://bob.example"));
    }
}
