//! Configuration for the yt-dlp provider.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the yt-dlp based provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YtDlpConfig {
    /// Path to the yt-dlp binary.
    #[serde(default = "default_binary")]
    pub binary: PathBuf,

    /// Format selector used unless a series overrides it.
    pub default_format: String,

    /// Container used when video and audio are merged.
    pub merge_output_format: String,

    /// Prefix prepended to the registry's series path, for when the registry
    /// and this process see the library under different mount points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_root: Option<PathBuf>,

    /// Timeout for a single yt-dlp invocation in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_binary() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_timeout() -> u64 {
    3600 // 1 hour
}
