//! Per-episode download jobs.

use std::path::{Path, PathBuf};

use tracing::warn;

use super::config::DownloadSettings;
use crate::provider::{DownloadOptions, SubtitleOptions};
use crate::reconciler::{MatchedSeries, NeededEpisode};

/// A resolved URL plus the options to fetch it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub episode_id: u64,
    pub url: String,
    pub options: DownloadOptions,
}

impl DownloadJob {
    /// Merges the baseline options with the series' overrides.
    pub fn build(
        settings: &DownloadSettings,
        series: &MatchedSeries,
        episode: &NeededEpisode,
        url: String,
        cookie_file: Option<PathBuf>,
    ) -> Self {
        let format = series
            .format
            .clone()
            .unwrap_or_else(|| settings.default_format.clone());

        let mut options = DownloadOptions::baseline(
            output_template(settings.library_root.as_deref(), series, episode),
            format,
            settings.merge_output_format.clone(),
        );

        if settings.sleep_requests > 0 {
            options.sleep_requests = Some(settings.sleep_requests);
        }
        options.cookie_file = cookie_file;
        if series.subtitles {
            options.subtitles = Some(SubtitleOptions {
                languages: series.subtitle_languages.clone(),
                auto_generated: series.subtitles_autogenerated,
            });
        }

        Self {
            episode_id: episode.id,
            url,
            options,
        }
    }
}

/// `<root><path>/Season N/<series> - SNEM - <title> WEBDL.%(ext)s`
pub fn output_template(
    library_root: Option<&Path>,
    series: &MatchedSeries,
    episode: &NeededEpisode,
) -> String {
    let root = library_root
        .map(|root| root.to_string_lossy().trim_end_matches('/').to_string())
        .unwrap_or_default();

    format!(
        "{}{}/Season {}/{} - S{}E{} - {} WEBDL.%(ext)s",
        root,
        series.path,
        episode.season_number,
        series.title,
        episode.season_number,
        episode.episode_number,
        episode.title
    )
}

/// Resolves a cookie file against `base_dir`.
///
/// Returns `None` with a warning when the file does not exist.
pub fn resolve_cookie_file(base_dir: &Path, cookies_file: &str) -> Option<PathBuf> {
    let path = base_dir.join(cookies_file);
    if path.is_file() {
        Some(path)
    } else {
        warn!(
            "cookie file '{}' does not exist, continuing without cookies",
            path.display()
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciler::{match_watch_rules, SubtitlePolicy};
    use crate::testing::fixtures;
    use std::time::Duration;

    fn settings() -> DownloadSettings {
        DownloadSettings::from(&fixtures::config())
    }

    fn matched(rule: crate::reconciler::WatchRule) -> MatchedSeries {
        let series = fixtures::series(7, &rule.title);
        match_watch_rules(&[series], &[rule]).pop().unwrap()
    }

    #[test]
    fn test_output_template() {
        let series = matched(fixtures::watch_rule("Show A", "channelX"));
        let mut episode = fixtures::needed_episode(1, 7, "5 Pilot");
        episode.season_number = 2;
        episode.episode_number = 5;

        assert_eq!(
            output_template(None, &series, &episode),
            "/tv/Show A/Season 2/Show A - S2E5 - 5 Pilot WEBDL.%(ext)s"
        );
        assert_eq!(
            output_template(Some(Path::new("/sonarr_root/")), &series, &episode),
            "/sonarr_root/tv/Show A/Season 2/Show A - S2E5 - 5 Pilot WEBDL.%(ext)s"
        );
    }

    #[test]
    fn test_build_baseline_job() {
        let series = matched(fixtures::watch_rule("Show A", "channelX"));
        let episode = fixtures::needed_episode(3, 7, "Pilot");
        let job = DownloadJob::build(
            &settings(),
            &series,
            &episode,
            "https://video/3".to_string(),
            None,
        );

        assert_eq!(job.episode_id, 3);
        assert_eq!(job.options.format, "bestvideo+bestaudio/best");
        assert_eq!(job.options.merge_output_format, "mkv");
        assert!(job.options.sleep_requests.is_none());
        assert!(job.options.subtitles.is_none());
        assert!(job.options.cookie_file.is_none());
        assert!(job.options.no_overwrites);
    }

    #[test]
    fn test_build_applies_series_overrides() {
        let mut rule = fixtures::watch_rule("Show A", "channelX");
        rule.format = Some("best[height<=720]".to_string());
        rule.subtitles = Some(SubtitlePolicy {
            languages: vec!["en".to_string(), "de".to_string()],
            autogenerated: true,
        });
        let series = matched(rule);

        let mut settings = settings();
        settings.sleep_requests = 3;
        settings.download_delay = Duration::from_secs(10);

        let job = DownloadJob::build(
            &settings,
            &series,
            &fixtures::needed_episode(1, 7, "Pilot"),
            "https://video/1".to_string(),
            Some(PathBuf::from("/config/cookies.txt")),
        );

        assert_eq!(job.options.format, "best[height<=720]");
        assert_eq!(job.options.sleep_requests, Some(3));
        assert_eq!(
            job.options.cookie_file,
            Some(PathBuf::from("/config/cookies.txt"))
        );
        let subtitles = job.options.subtitles.unwrap();
        assert_eq!(subtitles.languages, vec!["en", "de"]);
        assert!(subtitles.auto_generated);
    }

    #[test]
    fn test_resolve_cookie_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cookies.txt"), "# Netscape HTTP Cookie File\n").unwrap();

        assert_eq!(
            resolve_cookie_file(dir.path(), "cookies.txt"),
            Some(dir.path().join("cookies.txt"))
        );
        assert_eq!(resolve_cookie_file(dir.path(), "missing.txt"), None);
    }
}
