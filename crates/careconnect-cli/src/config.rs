//! Process configuration: flags with environment fallbacks.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use careconnect_core::{Clock, DayBoundary, SystemClock};
use careconnect_store::{FileKv, KvStore};
use careconnect_sync::FetcherConfig;
use careconnect_sync::fetcher::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Base URL of the content pipeline
    #[arg(long, env = "CARECONNECT_API_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "CARECONNECT_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs(), global = true)]
    pub timeout_secs: u64,

    /// Directory holding the day cache, profile and feedback log
    #[arg(long, env = "CARECONNECT_DATA_DIR", default_value = ".careconnect", global = true)]
    pub data_dir: PathBuf,

    /// Calendar the day cache rolls over on (local or utc)
    #[arg(long, env = "CARECONNECT_DAY_BOUNDARY", default_value_t = DayBoundary::Local, global = true)]
    pub day_boundary: DayBoundary,
}

impl Settings {
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig::new(self.api_url.clone()).with_timeout(Duration::from_secs(self.timeout_secs))
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::new(SystemClock::new(self.day_boundary))
    }

    pub fn open_kv(&self) -> anyhow::Result<Arc<dyn KvStore>> {
        let kv = FileKv::open(&self.data_dir)
            .with_context(|| format!("opening data dir {}", self.data_dir.display()))?;
        Ok(Arc::new(kv))
    }
}
