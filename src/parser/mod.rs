//! Plaintext feed documents.
//!
//! A document is a `:key: value` header, a blank line, free "about" text and
//! then posts. Each post starts at a line that is exactly `**` followed by a
//! line beginning with `:`, carries its own metadata block, a blank line and
//! the post body.

pub mod header;

use serde::Serialize;

use crate::domain::{DebugMessage, Feed, Post};

pub use header::{
    parse_header, FieldConfig, FieldValue, HeaderContent, HeaderResult, ParserConfig,
};

const POST_MARKER: &str = "**";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Meta,
    About,
    PostMeta,
    PostContent,
}

#[derive(Debug, Default)]
struct Block<'a> {
    first_line: usize,
    lines: Vec<&'a str>,
}

#[derive(Debug, Default)]
struct RawPost<'a> {
    meta: Block<'a>,
    content: Vec<&'a str>,
}

/// Diagnostics for the header and, aligned by index, for every post.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub header: Vec<DebugMessage>,
    pub posts: Vec<Vec<DebugMessage>>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.posts.iter().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.header.len() + self.posts.iter().map(Vec::len).sum::<usize>()
    }

    /// All messages, header first, then posts in document order.
    pub fn iter(&self) -> impl Iterator<Item = &DebugMessage> {
        self.header.iter().chain(self.posts.iter().flatten())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedParserResult {
    pub feed: Feed,
    pub warnings: Diagnostics,
    pub errors: Diagnostics,
}

impl FeedParserResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parses a document with the default feed and post schemas.
pub fn parse_feed(raw: &str) -> FeedParserResult {
    parse_from_raw(raw, &ParserConfig::feed_default(), &ParserConfig::post_default())
}

/// Splits `raw` into header, about and posts and parses every metadata block.
///
/// Never fails: missing required fields end up in `errors` and the feed is
/// filled in as far as possible.
pub fn parse_from_raw(
    raw: &str,
    feed_config: &ParserConfig,
    post_config: &ParserConfig,
) -> FeedParserResult {
    let lines: Vec<&str> = raw.lines().collect();

    let mut header = Block::default();
    let mut about: Vec<&str> = Vec::new();
    let mut posts: Vec<RawPost> = Vec::new();
    let mut state = ScanState::Meta;

    for (i, line) in lines.iter().copied().enumerate() {
        let blank = line.trim().is_empty();

        match state {
            ScanState::Meta => {
                if blank {
                    state = ScanState::About;
                } else {
                    header.lines.push(line);
                }
            }
            ScanState::About | ScanState::PostContent => {
                if starts_post(&lines, i) {
                    posts.push(RawPost {
                        meta: Block {
                            first_line: i + 1,
                            lines: Vec::new(),
                        },
                        content: Vec::new(),
                    });
                    state = ScanState::PostMeta;
                } else if state == ScanState::About {
                    about.push(line);
                } else if let Some(post) = posts.last_mut() {
                    post.content.push(line);
                }
            }
            ScanState::PostMeta => {
                if blank {
                    state = ScanState::PostContent;
                } else if let Some(post) = posts.last_mut() {
                    post.meta.lines.push(line);
                }
            }
        }
    }

    let header_result = parse_header(&header.lines, feed_config);
    let mut result = FeedParserResult {
        warnings: Diagnostics {
            header: shift(header_result.warnings, header.first_line),
            posts: Vec::with_capacity(posts.len()),
        },
        errors: Diagnostics {
            header: shift(header_result.errors, header.first_line),
            posts: Vec::with_capacity(posts.len()),
        },
        feed: feed_from_header(header_result.content),
    };
    result.feed.about = Some(join_trimmed(&about)).filter(|s| !s.is_empty());

    for raw_post in posts {
        let post_result = parse_header(&raw_post.meta.lines, post_config);
        let first_line = raw_post.meta.first_line;
        result
            .warnings
            .posts
            .push(shift(post_result.warnings, first_line));
        result.errors.posts.push(shift(post_result.errors, first_line));

        let mut post = post_from_header(post_result.content);
        post.content = join_trimmed(&raw_post.content);
        result.feed.posts.push(post);
    }

    result
}

/// A lone `**` only opens a post when the next line starts a metadata block.
fn starts_post(lines: &[&str], i: usize) -> bool {
    lines[i].trim() == POST_MARKER
        && lines
            .get(i + 1)
            .is_some_and(|next| next.trim_start().starts_with(':'))
}

fn shift(messages: Vec<DebugMessage>, first_line: usize) -> Vec<DebugMessage> {
    messages.into_iter().map(|m| m.shifted(first_line)).collect()
}

/// Joins lines, dropping leading and trailing blank lines.
fn join_trimmed(lines: &[&str]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

fn take_single(content: &mut HeaderContent, key: &str) -> Option<String> {
    match content.remove(key)? {
        FieldValue::Single(s) => Some(s),
        FieldValue::Multi(values) => values.into_iter().last(),
    }
}

fn take_list(content: &mut HeaderContent, key: &str) -> Vec<String> {
    content.remove(key).map(FieldValue::into_list).unwrap_or_default()
}

fn into_extra(content: HeaderContent) -> std::collections::BTreeMap<String, String> {
    content
        .into_iter()
        .filter_map(|(key, value)| match value {
            FieldValue::Single(s) => Some((key, s)),
            FieldValue::Multi(values) => values.into_iter().last().map(|s| (key, s)),
        })
        .collect()
}

fn feed_from_header(mut content: HeaderContent) -> Feed {
    Feed {
        title: take_single(&mut content, "title").unwrap_or_default(),
        author: take_single(&mut content, "author").unwrap_or_default(),
        description: take_single(&mut content, "description"),
        lang: take_single(&mut content, "lang"),
        avatar: take_single(&mut content, "avatar"),
        links: take_list(&mut content, "links"),
        follows: take_list(&mut content, "follows"),
        pages: take_list(&mut content, "pages"),
        about: None,
        posts: Vec::new(),
        extra: into_extra(content),
    }
}

fn post_from_header(mut content: HeaderContent) -> Post {
    Post {
        id: take_single(&mut content, "id").unwrap_or_default(),
        date: take_single(&mut content, "date"),
        lang: take_single(&mut content, "lang"),
        tags: take_single(&mut content, "tags"),
        reply_to: take_single(&mut content, "reply_to"),
        supersedes: take_single(&mut content, "supersedes"),
        mood: take_single(&mut content, "mood"),
        content_warning: take_single(&mut content, "content_warning"),
        content: String::new(),
        extra: into_extra(content),
    }
}
