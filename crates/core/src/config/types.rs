use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::backoff::BackoffConfig;
use crate::provider::YtDlpConfig;
use crate::reconciler::WatchRule;
use crate::registry::SonarrConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub harvester: HarvesterConfig,
    pub registry: SonarrConfig,
    pub ytdl: YtDlpConfig,
    #[serde(default)]
    pub series: Vec<WatchRule>,
    /// Directory relative cookie files are resolved against.
    /// Set by [`load_config`](super::load_config) to the config file's directory.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Scheduling and rate-limit tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HarvesterConfig {
    /// Minutes between reconciliation cycles.
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,
    #[serde(default)]
    pub debug: bool,
    /// Seconds to wait after each successful download.
    #[serde(default)]
    pub download_delay: u64,
    /// Seconds yt-dlp sleeps between requests during a download (0 = off).
    #[serde(default)]
    pub sleep_requests: u64,
    /// Base sleep in seconds after a rate-limited download.
    #[serde(default = "default_rate_limit_sleep")]
    pub rate_limit_sleep: u64,
    #[serde(default = "default_true")]
    pub exponential_backoff: bool,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Ceiling for the escalated sleep, in seconds.
    #[serde(default = "default_backoff_max")]
    pub backoff_max: u64,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            scan_interval: default_scan_interval(),
            debug: false,
            download_delay: 0,
            sleep_requests: 0,
            rate_limit_sleep: default_rate_limit_sleep(),
            exponential_backoff: true,
            backoff_multiplier: default_backoff_multiplier(),
            backoff_max: default_backoff_max(),
        }
    }
}

impl HarvesterConfig {
    pub fn scan_period(&self) -> Duration {
        Duration::from_secs(self.scan_interval.saturating_mul(60))
    }

    pub fn backoff(&self) -> BackoffConfig {
        BackoffConfig {
            base: Duration::from_secs(self.rate_limit_sleep),
            multiplier: self.backoff_multiplier,
            max: Duration::from_secs(self.backoff_max),
            enabled: self.exponential_backoff,
        }
    }
}

fn default_scan_interval() -> u64 {
    60
}

fn default_rate_limit_sleep() -> u64 {
    900
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_backoff_max() -> u64 {
    3600
}

fn default_true() -> bool {
    true
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub harvester: HarvesterConfig,
    pub registry: SanitizedRegistryConfig,
    pub ytdl: YtDlpConfig,
    pub series: Vec<SanitizedWatchRule>,
}

/// Registry connection with the API key hidden.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedRegistryConfig {
    pub base_url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u64,
}

/// Watch rule summary; cookie file names are not logged.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedWatchRule {
    pub title: String,
    pub url: String,
    pub cookies_configured: bool,
    pub subtitles: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            harvester: config.harvester.clone(),
            registry: SanitizedRegistryConfig {
                base_url: config.registry.base_url(),
                api_key_configured: !config.registry.api_key.is_empty(),
                timeout_secs: config.registry.timeout_secs,
            },
            ytdl: config.ytdl.clone(),
            series: config
                .series
                .iter()
                .map(|rule| SanitizedWatchRule {
                    title: rule.title.clone(),
                    url: rule.url.clone(),
                    cookies_configured: rule.cookies_file.is_some(),
                    subtitles: rule.subtitles.is_some(),
                })
                .collect(),
        }
    }
}
