use std::sync::Arc;

use crate::app::error::Result;
use crate::config::{Config, FetchConfig};
use crate::fetcher::{Fetcher, ParallelFetcher, UrlFetcher};

pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub parallel_fetcher: ParallelFetcher,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(UrlFetcher::new(&config.fetch)?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Wires the context around an existing fetcher.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        let FetchConfig {
            timeout_secs,
            workers,
            ..
        } = config.fetch;
        let parallel_fetcher =
            ParallelFetcher::with_workers(fetcher.clone(), workers, timeout_secs);

        Self {
            config,
            fetcher,
            parallel_fetcher,
        }
    }
}
