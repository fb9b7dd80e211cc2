//! # Casa
//!
//! Plaintext personal feeds and the timeline of the feeds they follow.
//!
//! ## Architecture
//!
//! ```text
//! raw document → Parser → Feed ─┐
//! follow URLs → Fetcher → Parser ┴→ Timeline → sorted, deduplicated posts
//! ```
//!
//! ## Document format
//!
//! ```text
//! # My Feed
//! :author: alice
//! :follow: bob https://bob.example/feed.txt
//!
//! Free text about this feed.
//!
//! **
//! :id: 2024-01-01T10:00:00Z
//!
//! First post.
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Assemble the timeline of a feed and its follows
//! casa timeline feed.txt
//!
//! # Report problems in a feed
//! casa check feed.txt
//!
//! # Append a new post and edit it
//! casa add feed.txt
//!
//! # List the pages kept next to the feed
//! casa pages feed.txt
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the
/// configuration and the fetchers.
pub mod app;

/// Command-line interface using clap.
///
/// - `timeline <feed> [--feed-only]` - Print the assembled timeline
/// - `check <feed>` - Report parser warnings and errors
/// - `add <feed> [--no-edit]` - Append a new post and open an editor
/// - `pages <feed>` - List pages and whether they are readable
pub mod cli;

/// Configuration loaded from `~/.config/casa/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Feed`](domain::Feed) and [`Post`](domain::Post): a parsed document
/// - [`TimelinePost`](domain::TimelinePost): a post tagged with its feed
/// - [`DebugMessage`](domain::DebugMessage): parser diagnostics
pub mod domain;

/// Retrieval of followed feeds.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for reading a feed document
/// - [`UrlFetcher`](fetcher::UrlFetcher): `file://` and HTTP(S) implementation
/// - [`ParallelFetcher`](fetcher::ParallelFetcher): Concurrent fetching with semaphore
pub mod fetcher;

/// Header field and document parsing.
pub mod parser;

/// Timeline assembly: merge, sort and supersede filtering.
pub mod timeline;
