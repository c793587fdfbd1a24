//! yt-dlp based provider implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use regex_lite::Regex;
use serde::Deserialize;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::config::YtDlpConfig;
use super::types::{DownloadOptions, SearchRequest};
use super::{MediaProvider, ProviderError};

/// yt-dlp based provider implementation.
///
/// Sources should be a channel tab or playlist. When a channel root only
/// lists its tabs, each tab is listed once more and searched in turn.
pub struct YtDlpProvider {
    config: YtDlpConfig,
    /// Let yt-dlp print its normal output and log it at debug level.
    verbose: bool,
}

/// Flat listing as printed by `--dump-single-json --flat-playlist`.
#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    webpage_url: Option<String>,
    /// `None` when the source is a single item rather than a playlist.
    #[serde(default)]
    entries: Option<Vec<Option<ListingEntry>>>,
}

#[derive(Debug, Deserialize)]
struct ListingEntry {
    #[serde(default, rename = "_type")]
    entry_type: Option<String>,
    #[serde(default)]
    ie_key: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    webpage_url: Option<String>,
    #[serde(default)]
    is_short: Option<bool>,
    /// Unix seconds.
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    release_timestamp: Option<i64>,
    /// `YYYYMMDD`.
    #[serde(default)]
    upload_date: Option<String>,
    /// Present when a nested playlist was expanded inline.
    #[serde(default)]
    entries: Option<Vec<Option<ListingEntry>>>,
}

impl ListingEntry {
    fn link(&self) -> Option<&str> {
        self.url.as_deref().or(self.webpage_url.as_deref())
    }

    /// Matches short-form videos and a channel's shorts tab.
    fn is_short(&self) -> bool {
        self.is_short.unwrap_or(false)
            || [&self.url, &self.webpage_url]
                .into_iter()
                .flatten()
                .any(|u| u.contains("/shorts/") || u.trim_end_matches('/').ends_with("/shorts"))
    }

    fn is_playlist(&self) -> bool {
        self.entry_type.as_deref() == Some("playlist")
            || self.ie_key.as_deref() == Some("YoutubeTab")
    }

    /// Publish time in unix seconds, from the most precise field present.
    fn published(&self) -> Option<i64> {
        self.timestamp.or(self.release_timestamp).or_else(|| {
            let date = NaiveDate::parse_from_str(self.upload_date.as_deref()?, "%Y%m%d").ok()?;
            Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
        })
    }

    /// The entry itself, or its children when it carries them inline.
    fn expand(&self) -> Vec<&ListingEntry> {
        match &self.entries {
            Some(children) => children.iter().flatten().collect(),
            None => vec![self],
        }
    }
}

impl YtDlpProvider {
    /// Creates a new provider with the given configuration.
    pub fn new(config: YtDlpConfig) -> Self {
        Self {
            config,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Builds yt-dlp arguments for a flat listing of `source_url`.
    fn build_search_args(&self, source_url: &str, request: &SearchRequest) -> Vec<String> {
        let mut args = vec![
            "--flat-playlist".to_string(),
            "--dump-single-json".to_string(),
            "--ignore-errors".to_string(),
        ];
        if !self.verbose {
            args.push("--no-warnings".to_string());
        }

        if let Some(cookie_file) = &request.cookie_file {
            args.extend([
                "--cookies".to_string(),
                cookie_file.to_string_lossy().to_string(),
            ]);
        }

        args.extend(["--".to_string(), source_url.to_string()]);
        args
    }

    /// Builds yt-dlp arguments for downloading one item.
    fn build_download_args(&self, url: &str, options: &DownloadOptions) -> Vec<String> {
        let mut args = Vec::new();
        if !self.verbose {
            args.extend(["--quiet".to_string(), "--no-progress".to_string()]);
        }
        args.extend([
            "--format".to_string(),
            options.format.clone(),
            "--merge-output-format".to_string(),
            options.merge_output_format.clone(),
            "--output".to_string(),
            options.output_template.clone(),
            "--throttled-rate".to_string(),
            options.throttled_rate.clone(),
            "--concurrent-fragments".to_string(),
            options.concurrent_fragments.to_string(),
            "--sleep-interval".to_string(),
            options.sleep_interval.to_string(),
            "--max-sleep-interval".to_string(),
            options.max_sleep_interval.to_string(),
        ]);

        if options.no_playlist {
            args.push("--no-playlist".to_string());
        }
        if options.force_ipv4 {
            args.push("--force-ipv4".to_string());
        }
        if options.no_overwrites {
            args.push("--no-overwrites".to_string());
        }
        if options.no_continue {
            args.push("--no-continue".to_string());
        }

        if let Some(secs) = options.sleep_requests {
            args.extend(["--sleep-requests".to_string(), secs.to_string()]);
        }

        if let Some(cookie_file) = &options.cookie_file {
            args.extend([
                "--cookies".to_string(),
                cookie_file.to_string_lossy().to_string(),
            ]);
        }

        if let Some(subtitles) = &options.subtitles {
            args.extend([
                "--write-subs".to_string(),
                "--sub-langs".to_string(),
                subtitles.languages.join(","),
                "--convert-subs".to_string(),
                "srt".to_string(),
                "--embed-subs".to_string(),
            ]);
            if subtitles.auto_generated {
                args.push("--write-auto-subs".to_string());
            }
        }

        args.extend(["--".to_string(), url.to_string()]);
        args
    }

    /// Picks the listing entry that best satisfies the request.
    ///
    /// Entries with a publish time come first, newest first when
    /// `reverse_order` is set and oldest first otherwise. Undated entries
    /// follow in listing order, walked back-to-front when `reverse_order`
    /// is set.
    fn select_entry(
        listing: &Listing,
        request: &SearchRequest,
        pattern: &Regex,
    ) -> Option<String> {
        let Some(entries) = &listing.entries else {
            // Single item: the source itself is the candidate.
            let title = listing.title.as_deref()?;
            if !pattern.is_match(title) {
                return None;
            }
            return listing
                .webpage_url
                .clone()
                .or_else(|| listing.url.clone());
        };

        let mut candidates: Vec<&ListingEntry> = entries
            .iter()
            .flatten()
            .flat_map(|entry| entry.expand())
            .filter(|entry| !entry.is_playlist())
            .filter(|entry| !(request.exclude_shorts && entry.is_short()))
            .filter(|entry| {
                entry
                    .title
                    .as_deref()
                    .is_some_and(|title| pattern.is_match(title))
            })
            .filter(|entry| entry.link().is_some())
            .collect();

        if request.reverse_order {
            candidates.reverse();
        }
        // Stable: equal keys keep the walk order above.
        candidates.sort_by_key(|entry| match entry.published() {
            Some(ts) if request.reverse_order => (false, ts.saturating_neg()),
            Some(ts) => (false, ts),
            None => (true, 0),
        });

        candidates
            .first()
            .and_then(|entry| entry.link())
            .map(str::to_string)
    }

    /// Playlists listed by URL only, such as the tabs of a channel root.
    fn nested_sources<'a>(listing: &'a Listing, request: &SearchRequest) -> Vec<&'a str> {
        listing
            .entries
            .iter()
            .flatten()
            .flatten()
            .filter(|entry| entry.entries.is_none() && entry.is_playlist())
            .filter(|entry| !(request.exclude_shorts && entry.is_short()))
            .filter_map(|entry| entry.link())
            .collect()
    }

    async fn list(
        &self,
        source_url: &str,
        request: &SearchRequest,
    ) -> Result<Listing, ProviderError> {
        let output = self.run(&self.build_search_args(source_url, request)).await?;
        serde_json::from_slice(&output.stdout)
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }

    /// Runs yt-dlp and returns its output once it exits successfully.
    async fn run(&self, args: &[String]) -> Result<Output, ProviderError> {
        debug!(
            binary = %self.config.binary.display(),
            "yt-dlp args: {:?}",
            redact_cookies(args)
        );

        let command = Command::new(&self.config.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = timeout(Duration::from_secs(self.config.timeout_secs), command)
            .await
            .map_err(|_| ProviderError::Timeout {
                timeout_secs: self.config.timeout_secs,
            })?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProviderError::BinaryNotFound {
                        path: self.config.binary.clone(),
                    }
                } else {
                    ProviderError::Io(e)
                }
            })?;

        if self.verbose {
            log_output("stderr", &output.stderr);
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::failed(failure_message(
                &stderr,
                output.status.code(),
            )));
        }

        Ok(output)
    }
}

/// Extracts yt-dlp's `ERROR:` lines, falling back to the last stderr line.
fn failure_message(stderr: &str, code: Option<i32>) -> String {
    let errors: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("ERROR"))
        .collect();

    if !errors.is_empty() {
        return errors.join("\n");
    }

    stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .map(str::to_string)
        .unwrap_or_else(|| format!("yt-dlp exited with code: {:?}", code))
}

fn log_output(stream: &str, bytes: &[u8]) {
    for line in String::from_utf8_lossy(bytes).lines() {
        let line = line.trim();
        if !line.is_empty() {
            debug!("yt-dlp {}: {}", stream, line);
        }
    }
}

fn redact_cookies(args: &[String]) -> Vec<&str> {
    let mut redacted = Vec::with_capacity(args.len());
    let mut hide_next = false;
    for arg in args {
        if hide_next {
            redacted.push("***REDACTED***");
            hide_next = false;
            continue;
        }
        hide_next = arg == "--cookies";
        redacted.push(arg.as_str());
    }
    redacted
}

#[async_trait]
impl MediaProvider for YtDlpProvider {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Option<String>, ProviderError> {
        let pattern =
            Regex::new(&request.title_pattern).map_err(|e| ProviderError::InvalidPattern {
                pattern: request.title_pattern.clone(),
                reason: e.to_string(),
            })?;

        let listing = self.list(&request.source_url, request).await?;
        if let Some(url) = Self::select_entry(&listing, request, &pattern) {
            return Ok(Some(url));
        }

        for source in Self::nested_sources(&listing, request) {
            debug!("No match in {}, searching {}", request.source_url, source);
            let nested = self.list(source, request).await?;
            if let Some(url) = Self::select_entry(&nested, request, &pattern) {
                return Ok(Some(url));
            }
        }
        Ok(None)
    }

    async fn download(&self, url: &str, options: &DownloadOptions) -> Result<(), ProviderError> {
        let output = self.run(&self.build_download_args(url, options)).await?;
        if self.verbose {
            log_output("stdout", &output.stdout);
        }
        Ok(())
    }
}
