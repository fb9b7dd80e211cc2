use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use url::Url;

use crate::app::{AppContext, CasaError, Result};
use crate::domain::date::is_rfc3339_date;
use crate::domain::{new_post_block, DebugMessage, Feed, TimelineResult};
use crate::parser::{parse_feed, FeedParserResult};
use crate::timeline::assemble_timeline;

/// Directory next to the feed document that holds its pages.
pub const PAGES_DIR: &str = "plaintext.casa";

pub async fn read_feed(path: &Path) -> Result<FeedParserResult> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(parse_feed(&raw))
}

/// `file://` URL of a local feed, used as its identity in the timeline.
pub fn feed_file_url(path: &Path) -> Result<String> {
    let absolute = std::path::absolute(path)?;
    Url::from_file_path(&absolute)
        .map(String::from)
        .map_err(|_| CasaError::Other(format!("Cannot build a URL for {}", absolute.display())))
}

/// Assembles the timeline of the feed parsed from `path`.
pub async fn build_timeline(
    ctx: &AppContext,
    path: &Path,
    parsed: &FeedParserResult,
) -> Result<TimelineResult> {
    if parsed.has_errors() {
        tracing::warn!(
            "{} has {} errors, run `casa check` for details",
            path.display(),
            parsed.errors.len()
        );
    }

    let url = feed_file_url(path)?;
    Ok(assemble_timeline(&ctx.parallel_fetcher, &parsed.feed, Some(&url)).await)
}

pub async fn timeline(ctx: &AppContext, path: &Path, feed_only: bool) -> Result<()> {
    let parsed = read_feed(path).await?;

    if feed_only {
        println!("{}", serde_json::to_string_pretty(&parsed.feed)?);
        return Ok(());
    }

    let follows = parsed.feed.follows.len();
    if follows > 0 {
        eprintln!(
            "Assembling timeline from {} followed feed{}...",
            follows,
            if follows == 1 { "" } else { "s" }
        );
    }

    let result = build_timeline(ctx, path, &parsed).await?;
    if !result.errors.is_empty() {
        eprintln!("Errors fetching followed feeds:");
        for error in &result.errors {
            eprintln!("  - {}: {}", error.url, error.error);
        }
    }

    println!("{}", serde_json::to_string_pretty(&result.posts)?);
    Ok(())
}

/// Every diagnostic for a parsed feed, including ids that are not RFC 3339.
pub fn check_report(parsed: &FeedParserResult) -> Vec<DebugMessage> {
    let mut report: Vec<DebugMessage> = parsed
        .errors
        .iter()
        .chain(parsed.warnings.iter())
        .cloned()
        .collect();

    for post in &parsed.feed.posts {
        if !post.id.is_empty() && !is_rfc3339_date(&post.id) {
            report.push(DebugMessage::info(
                format!("Post id \"{}\" is not an RFC 3339 timestamp", post.id),
                -1,
            ));
        }
    }

    report
}

/// Prints the diagnostics of a feed. Returns `false` if it has errors.
pub async fn check(path: &Path) -> Result<bool> {
    let parsed = read_feed(path).await?;
    let report = check_report(&parsed);

    if report.is_empty() {
        println!("{}: no problems found", path.display());
    }
    for message in &report {
        println!("{}: {}", path.display(), message);
    }

    Ok(!parsed.has_errors())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStatus {
    pub page: String,
    pub path: PathBuf,
    pub readable: bool,
}

/// Resolves every page of `feed` under `<feed dir>/plaintext.casa/`.
pub async fn page_statuses(feed_path: &Path, feed: &Feed) -> Vec<PageStatus> {
    let pages_dir = feed_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(PAGES_DIR);

    let mut statuses = Vec::with_capacity(feed.pages.len());
    for page in &feed.pages {
        let path = pages_dir.join(page);
        let readable = match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => tokio::fs::File::open(&path).await.is_ok(),
            _ => false,
        };
        statuses.push(PageStatus {
            page: page.clone(),
            path,
            readable,
        });
    }
    statuses
}

pub async fn pages(path: &Path) -> Result<()> {
    let parsed = read_feed(path).await?;

    if parsed.feed.pages.is_empty() {
        println!("No pages defined.");
        return Ok(());
    }

    tracing::warn!("Pages are not yet included in feeds");
    println!("Pages:");
    for status in page_statuses(path, &parsed.feed).await {
        if status.readable {
            println!("  - {}", status.page);
        } else {
            println!("  - {} (not readable!)", status.page);
        }
    }
    Ok(())
}

async fn ensure_writable(path: &Path) -> Result<()> {
    let meta = tokio::fs::metadata(path).await?;
    if !meta.is_file() || meta.permissions().readonly() {
        return Err(CasaError::NotWritable(path.to_path_buf()));
    }
    Ok(())
}

/// Appends a new post to the feed at `path` and returns its id.
pub async fn add_post(path: &Path, client: &str) -> Result<String> {
    ensure_writable(path).await?;

    let id = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    let mut file = tokio::fs::OpenOptions::new().append(true).open(path).await?;
    file.write_all(new_post_block(&id, client).as_bytes()).await?;
    file.flush().await?;

    tracing::info!("Added post {} to {}", id, path.display());
    Ok(id)
}

/// `$VISUAL`, then `$EDITOR`, then `vi`.
pub fn resolve_editor(visual: Option<String>, editor: Option<String>) -> String {
    visual
        .into_iter()
        .chain(editor)
        .find(|e| !e.trim().is_empty())
        .unwrap_or_else(|| "vi".to_string())
}

/// Runs `editor` on `path` and waits for it. A non-zero exit is an error.
pub async fn open_in_editor(editor: &str, path: &Path) -> Result<()> {
    let mut parts = editor.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| CasaError::Other("No editor configured".to_string()))?;

    tracing::debug!("Opening {} in {}", path.display(), editor);
    let status = Command::new(program).args(parts).arg(path).status().await?;
    if !status.success() {
        return Err(CasaError::Editor(status));
    }
    Ok(())
}

/// Appends a post and, unless `edit` is false, opens the feed in the user's editor.
pub async fn add(path: &Path, client: &str, edit: bool) -> Result<String> {
    let id = add_post(path, client).await?;
    if edit {
        let editor = resolve_editor(std::env::var("VISUAL").ok(), std::env::var("EDITOR").ok());
        open_in_editor(&editor, path).await?;
    }
    Ok(id)
}
