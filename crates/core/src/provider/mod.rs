//! Media search/download provider abstraction.
//!
//! A provider resolves a title pattern against a channel or playlist and
//! fetches the resulting media. [`YtDlpProvider`] drives the `yt-dlp` binary.
//!
//! # Example
//!
//! ```ignore
//! use harvestarr_core::provider::{MediaProvider, SearchRequest, YtDlpConfig, YtDlpProvider};
//!
//! let provider = YtDlpProvider::new(config.ytdl.clone());
//! let url = provider
//!     .search(&SearchRequest::new("https://www.youtube.com/@channel/videos", "5 Pilot"))
//!     .await?;
//! ```

mod config;
mod types;
mod ytdlp;

pub use config::YtDlpConfig;
pub use types::{DownloadOptions, SearchRequest, SubtitleOptions};
pub use ytdlp::YtDlpProvider;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by a provider.
///
/// The `Display` text carries the provider's own failure message, which the
/// orchestrator inspects to recognise upstream rate limiting.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider binary not found.
    #[error("yt-dlp not found at path: {path}")]
    BinaryNotFound { path: PathBuf },

    /// The title pattern could not be compiled.
    #[error("Invalid title pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The provider ran but reported a failure.
    #[error("{message}")]
    CommandFailed { message: String },

    /// The provider did not finish in time.
    #[error("yt-dlp timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Listing output could not be parsed.
    #[error("Failed to parse listing: {0}")]
    ParseError(String),

    /// I/O error while running the provider.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProviderError {
    /// Creates a command failure from a message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::CommandFailed {
            message: message.into(),
        }
    }
}

/// Resolves titles to media URLs and downloads them.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Returns the name of this provider implementation.
    fn name(&self) -> &str;

    /// Lists `request.source_url` and returns the URL of the first entry whose
    /// title matches `request.title_pattern`, or `None` when nothing matches.
    async fn search(&self, request: &SearchRequest) -> Result<Option<String>, ProviderError>;

    /// Downloads `url` with the given options.
    async fn download(&self, url: &str, options: &DownloadOptions) -> Result<(), ProviderError>;
}
