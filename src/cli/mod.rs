pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "casa")]
#[command(about = "Plaintext feeds and the timeline of the feeds you follow", long_about = None)]
pub struct Cli {
    /// Number of followed feeds fetched at once
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    /// Seconds to wait for a single followed feed
    #[arg(short, long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the timeline of a feed and everything it follows, as JSON
    Timeline {
        /// Path to the feed document
        feed: PathBuf,

        /// Only print the parsed feed, without fetching follows
        #[arg(long)]
        feed_only: bool,
    },
    /// Report warnings and errors found in a feed document
    Check {
        /// Path to the feed document
        feed: PathBuf,
    },
    /// Append an empty post to a feed document and open it in $VISUAL/$EDITOR
    Add {
        /// Path to the feed document
        feed: PathBuf,

        /// Value written to the post's `client` field
        #[arg(short, long, default_value = "casa")]
        client: String,

        /// Only append the post, without launching an editor
        #[arg(long)]
        no_edit: bool,
    },
    /// List the pages of a feed and whether they can be read
    Pages {
        /// Path to the feed document
        feed: PathBuf,
    },
}
