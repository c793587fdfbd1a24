//! Testing utilities and mock collaborators.
//!
//! The mocks implement [`RegistryClient`](crate::registry::RegistryClient) and
//! [`MediaProvider`](crate::provider::MediaProvider) in memory so a full
//! harvest cycle can run without Sonarr or yt-dlp.
//!
//! # Example
//!
//! ```rust,ignore
//! use harvestarr_core::testing::{fixtures, MockProvider, MockRegistry};
//!
//! let registry = MockRegistry::new();
//! registry.set_series(vec![fixtures::series(1, "Show A")]).await;
//!
//! let provider = MockProvider::new();
//! provider.set_search_result("5 Pilot", Ok(Some("https://video/1".into()))).await;
//! ```

mod mock_provider;
mod mock_registry;

pub use mock_provider::{MockProvider, RecordedDownload};
pub use mock_registry::MockRegistry;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::PathBuf;

    use chrono::{DateTime, Utc};

    use crate::config::{Config, HarvesterConfig};
    use crate::provider::YtDlpConfig;
    use crate::reconciler::{NeededEpisode, TitleRegexes, WatchRule};
    use crate::registry::{EpisodeFile, EpisodeRecord, SeriesRecord, SonarrConfig};

    /// A valid configuration with no watch rules.
    pub fn config() -> Config {
        Config {
            harvester: HarvesterConfig::default(),
            registry: SonarrConfig {
                host: "localhost".to_string(),
                port: 8989,
                ssl: false,
                basedir: None,
                version: Some("v4".to_string()),
                api_key: "test-key".to_string(),
                timeout_secs: 30,
            },
            ytdl: YtDlpConfig {
                binary: PathBuf::from("yt-dlp"),
                default_format: "bestvideo+bestaudio/best".to_string(),
                merge_output_format: "mkv".to_string(),
                library_root: None,
                timeout_secs: 3600,
            },
            series: Vec::new(),
            base_dir: PathBuf::new(),
        }
    }

    /// A watch rule with only title and source set.
    pub fn watch_rule(title: &str, url: &str) -> WatchRule {
        WatchRule {
            title: title.to_string(),
            url: url.to_string(),
            regex: TitleRegexes::default(),
            offset: None,
            cookies_file: None,
            format: None,
            playlist_reverse: None,
            subtitles: None,
        }
    }

    /// A monitored series stored under `/tv/<title>`.
    pub fn series(id: u64, title: &str) -> SeriesRecord {
        SeriesRecord {
            id,
            title: title.to_string(),
            monitored: true,
            path: format!("/tv/{}", title),
        }
    }

    /// A monitored episode without a file.
    pub fn episode(
        id: u64,
        series_id: u64,
        season_number: u32,
        episode_number: u32,
        title: &str,
        air_date_utc: Option<DateTime<Utc>>,
    ) -> EpisodeRecord {
        EpisodeRecord {
            id,
            series_id,
            title: title.to_string(),
            season_number,
            episode_number,
            air_date_utc,
            monitored: true,
            has_file: false,
            episode_file_id: None,
        }
    }

    /// An indexed file for season 1 of a series.
    pub fn episode_file(id: u64, series_id: u64) -> EpisodeFile {
        EpisodeFile {
            id,
            series_id,
            season_number: 1,
            relative_path: format!("Season 1/file-{}.mkv", id),
            path: None,
        }
    }

    /// A needed season 1 episode numbered after its id.
    pub fn needed_episode(id: u64, series_id: u64, title: &str) -> NeededEpisode {
        NeededEpisode {
            id,
            series_id,
            title: title.to_string(),
            season_number: 1,
            episode_number: id as u32,
            air_date_utc: None,
        }
    }
}
