//! Orchestrator settings.

use std::path::PathBuf;
use std::time::Duration;

use crate::backoff::BackoffConfig;
use crate::config::Config;

/// Download settings shared by every series in a cycle.
#[derive(Debug, Clone)]
pub struct DownloadSettings {
    pub default_format: String,
    pub merge_output_format: String,
    /// Prefix for the registry's series paths.
    pub library_root: Option<PathBuf>,
    /// Seconds between extraction requests; 0 disables.
    pub sleep_requests: u64,
    /// Pause after each successful download.
    pub download_delay: Duration,
    /// Directory relative cookie files are resolved against.
    pub base_dir: PathBuf,
    pub backoff: BackoffConfig,
}

impl From<&Config> for DownloadSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_format: config.ytdl.default_format.clone(),
            merge_output_format: config.ytdl.merge_output_format.clone(),
            library_root: config.ytdl.library_root.clone(),
            sleep_requests: config.harvester.sleep_requests,
            download_delay: Duration::from_secs(config.harvester.download_delay),
            base_dir: config.base_dir.clone(),
            backoff: config.harvester.backoff(),
        }
    }
}
