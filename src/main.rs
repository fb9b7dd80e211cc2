use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use casa::app::AppContext;
use casa::cli::{commands, Cli, Commands};
use casa::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(workers) = cli.workers {
        config.fetch.workers = workers;
    }
    if let Some(timeout) = cli.timeout {
        config.fetch.timeout_secs = timeout;
    }
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Timeline { feed, feed_only } => {
            commands::timeline(&ctx, &feed, feed_only).await?;
        }
        Commands::Check { feed } => {
            if !commands::check(&feed).await? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Add {
            feed,
            client,
            no_edit,
        } => {
            let id = commands::add(&feed, &client, !no_edit).await?;
            println!("New post added with ID: {}", id);
        }
        Commands::Pages { feed } => {
            commands::pages(&feed).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
