//! Request and option types passed to a provider.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Throttle floor below which yt-dlp re-extracts the stream.
pub const THROTTLED_RATE: &str = "100K";
/// Fragments fetched in parallel for a single download.
pub const CONCURRENT_FRAGMENTS: u32 = 5;
/// Minimum seconds slept before each download.
pub const SLEEP_INTERVAL_SECS: u64 = 5;
/// Upper bound of the randomized pre-download sleep.
pub const MAX_SLEEP_INTERVAL_SECS: u64 = 30;

/// A listing query against a channel or playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Channel/playlist URL to list.
    pub source_url: String,
    /// Pattern an entry title must match. Built by escaping a literal title.
    pub title_pattern: String,
    /// Prefer the most recently published match.
    pub reverse_order: bool,
    /// Skip short-form entries.
    pub exclude_shorts: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_file: Option<PathBuf>,
}

impl SearchRequest {
    pub fn new(source_url: impl Into<String>, title_pattern: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            title_pattern: title_pattern.into(),
            reverse_order: true,
            exclude_shorts: true,
            cookie_file: None,
        }
    }

    pub fn with_reverse_order(mut self, reverse: bool) -> Self {
        self.reverse_order = reverse;
        self
    }

    pub fn with_cookie_file(mut self, cookie_file: Option<PathBuf>) -> Self {
        self.cookie_file = cookie_file;
        self
    }
}

/// Subtitle tracks to fetch and embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleOptions {
    pub languages: Vec<String>,
    /// Also fetch auto-generated captions.
    pub auto_generated: bool,
}

/// Everything a provider needs to fetch one episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOptions {
    /// Output naming template; `%(ext)s` is filled in by the provider.
    pub output_template: String,
    pub format: String,
    pub merge_output_format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitles: Option<SubtitleOptions>,
    pub throttled_rate: String,
    pub concurrent_fragments: u32,
    pub sleep_interval: u64,
    pub max_sleep_interval: u64,
    /// Seconds to sleep between requests made during extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_requests: Option<u64>,
    pub no_playlist: bool,
    pub force_ipv4: bool,
    /// Never overwrite an existing file.
    pub no_overwrites: bool,
    /// Never resume a partial download.
    pub no_continue: bool,
}

impl DownloadOptions {
    /// Fixed options every download starts from.
    pub fn baseline(
        output_template: impl Into<String>,
        format: impl Into<String>,
        merge_output_format: impl Into<String>,
    ) -> Self {
        Self {
            output_template: output_template.into(),
            format: format.into(),
            merge_output_format: merge_output_format.into(),
            cookie_file: None,
            subtitles: None,
            throttled_rate: THROTTLED_RATE.to_string(),
            concurrent_fragments: CONCURRENT_FRAGMENTS,
            sleep_interval: SLEEP_INTERVAL_SECS,
            max_sleep_interval: MAX_SLEEP_INTERVAL_SECS,
            sleep_requests: None,
            no_playlist: true,
            force_ipv4: true,
            no_overwrites: true,
            no_continue: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_defaults() {
        let request = SearchRequest::new("channelX", "5 Pilot");
        assert!(request.reverse_order);
        assert!(request.exclude_shorts);
        assert!(request.cookie_file.is_none());

        let request = request.with_reverse_order(false);
        assert!(!request.reverse_order);
    }

    #[test]
    fn test_baseline_download_options() {
        let options = DownloadOptions::baseline("/tv/Show/%(ext)s", "best", "mkv");
        assert_eq!(options.throttled_rate, "100K");
        assert_eq!(options.concurrent_fragments, 5);
        assert_eq!(options.sleep_interval, 5);
        assert_eq!(options.max_sleep_interval, 30);
        assert!(options.no_overwrites);
        assert!(options.no_continue);
        assert!(options.no_playlist);
        assert!(options.sleep_requests.is_none());
        assert!(options.subtitles.is_none());
    }
}
