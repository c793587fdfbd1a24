//! Download orchestrator implementation.
//!
//! Works through needed episodes strictly one at a time:
//! resolve, download, then rescan or back off depending on the outcome.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::backoff::{is_rate_limited, BackoffState};
use crate::provider::MediaProvider;
use crate::reconciler::{MatchedSeries, NeededEpisode};
use crate::registry::RegistryClient;
use crate::resolver::{search_title, Resolution, ResolveOptions, SearchResolver};

use super::config::DownloadSettings;
use super::job::{resolve_cookie_file, DownloadJob};
use super::types::{CycleReport, EpisodeOutcome};

/// Drives downloads for needed episodes.
///
/// Owns the backoff state, so escalation carries over between cycles for as
/// long as the orchestrator lives.
pub struct DownloadOrchestrator {
    settings: DownloadSettings,
    registry: Arc<dyn RegistryClient>,
    provider: Arc<dyn MediaProvider>,
    resolver: SearchResolver,
    backoff: BackoffState,
}

impl DownloadOrchestrator {
    pub fn new(
        settings: DownloadSettings,
        registry: Arc<dyn RegistryClient>,
        provider: Arc<dyn MediaProvider>,
    ) -> Self {
        let backoff = BackoffState::new(settings.backoff);
        Self {
            resolver: SearchResolver::new(Arc::clone(&provider)),
            settings,
            registry,
            provider,
            backoff,
        }
    }

    pub fn backoff(&self) -> &BackoffState {
        &self.backoff
    }

    /// Processes every needed episode, series by series in the given order.
    ///
    /// Episodes whose series is not in `series` are ignored.
    pub async fn run(
        &mut self,
        series: &[MatchedSeries],
        episodes: &[NeededEpisode],
    ) -> CycleReport {
        let mut report = CycleReport {
            matched_series: series.len(),
            needed_episodes: episodes.len(),
            ..Default::default()
        };

        for show in series {
            let cookie_file = show
                .cookies_file
                .as_deref()
                .and_then(|name| resolve_cookie_file(&self.settings.base_dir, name));

            info!("Processing {}", show.title);
            for episode in episodes.iter().filter(|e| e.series_id == show.id) {
                let outcome = self
                    .process_episode(show, episode, cookie_file.clone())
                    .await;
                report.record(&outcome);
            }
        }

        report
    }

    /// Resolves and downloads a single episode.
    pub async fn process_episode(
        &mut self,
        series: &MatchedSeries,
        episode: &NeededEpisode,
        cookie_file: Option<PathBuf>,
    ) -> EpisodeOutcome {
        let title = search_title(series, episode);
        let options = ResolveOptions {
            playlist_reverse: series.playlist_reverse,
            cookie_file: cookie_file.clone(),
        };

        let url = match self
            .resolver
            .resolve_episode_url(&title, &series.url, &options)
            .await
        {
            Resolution::Found(url) => url,
            Resolution::NotFound => {
                info!("    {}: Missing - {}", series.title, episode.title);
                return EpisodeOutcome::NotFound;
            }
        };

        let job = DownloadJob::build(&self.settings, series, episode, url, cookie_file);
        debug!(
            "    {}: Found - {} via {}: {:?}",
            series.title,
            episode.title,
            self.provider.name(),
            job
        );

        match self.provider.download(&job.url, &job.options).await {
            Ok(()) => {
                self.on_downloaded(series, episode).await;
                EpisodeOutcome::Downloaded
            }
            Err(e) => {
                let message = e.to_string();
                if is_rate_limited(&message) {
                    let (next, delay) = self.backoff.on_failure();
                    self.backoff = next;
                    warn!(
                        "    {}: Rate limited on {} (consecutive: {}), sleeping {}s",
                        series.title,
                        episode.title,
                        self.backoff.count(),
                        delay.as_secs()
                    );
                    tokio::time::sleep(delay).await;
                    EpisodeOutcome::RateLimited { delay }
                } else {
                    error!(
                        "    {}: Failed - {} - {}",
                        series.title, episode.title, message
                    );
                    EpisodeOutcome::Failed(message)
                }
            }
        }
    }

    async fn on_downloaded(&mut self, series: &MatchedSeries, episode: &NeededEpisode) {
        if let Err(e) = self.registry.trigger_rescan(series.id).await {
            error!("{}: rescan request failed: {}", series.title, e);
        }
        info!("    {}: Downloaded - {}", series.title, episode.title);

        let (next, reset) = self.backoff.on_success();
        self.backoff = next;
        if reset {
            info!("Download succeeded, rate-limit backoff reset");
        }

        if !self.settings.download_delay.is_zero() {
            debug!(
                "Sleeping {}s before the next download",
                self.settings.download_delay.as_secs()
            );
            tokio::time::sleep(self.settings.download_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;
    use crate::reconciler::match_watch_rules;
    use crate::testing::{fixtures, MockProvider, MockRegistry};
    use std::time::Duration;
    use tokio::time::Instant;

    struct Harness {
        registry: Arc<MockRegistry>,
        provider: Arc<MockProvider>,
        orchestrator: DownloadOrchestrator,
        series: Vec<MatchedSeries>,
    }

    fn harness(settings: DownloadSettings) -> Harness {
        let registry = Arc::new(MockRegistry::new());
        let provider = Arc::new(MockProvider::new());
        let orchestrator =
            DownloadOrchestrator::new(settings, registry.clone(), provider.clone());
        let series = match_watch_rules(
            &[fixtures::series(7, "Show A")],
            &[fixtures::watch_rule("Show A", "channelX")],
        );
        Harness {
            registry,
            provider,
            orchestrator,
            series,
        }
    }

    fn settings() -> DownloadSettings {
        DownloadSettings::from(&fixtures::config())
    }

    async fn found(provider: &MockProvider, title: &str, url: &str) {
        provider
            .set_search_result(title, Ok(Some(url.to_string())))
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_triggers_rescan() {
        let mut h = harness(settings());
        found(&h.provider, "5 Pilot", "https://video/5").await;
        let episodes = vec![fixtures::needed_episode(5, 7, "5 Pilot")];

        let report = h.orchestrator.run(&h.series, &episodes).await;
        assert_eq!(report.downloaded, 1);
        assert_eq!(h.registry.recorded_rescans().await, vec![7]);

        let downloads = h.provider.recorded_downloads().await;
        assert_eq!(downloads[0].url, "https://video/5");
        assert_eq!(
            downloads[0].options.output_template,
            "/tv/Show A/Season 1/Show A - S1E5 - 5 Pilot WEBDL.%(ext)s"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_skips_download() {
        let mut h = harness(settings());
        let episodes = vec![fixtures::needed_episode(1, 7, "Unreleased")];

        let report = h.orchestrator.run(&h.series, &episodes).await;
        assert_eq!(report.not_found, 1);
        assert_eq!(h.provider.download_count().await, 0);
        assert!(h.registry.recorded_rescans().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_sleeps_and_escalates() {
        let mut h = harness(settings());
        for (id, title) in [(1, "One"), (2, "Two"), (3, "Three")] {
            found(&h.provider, title, &format!("https://video/{}", id)).await;
        }
        for _ in 0..2 {
            h.provider
                .push_download_result(Err(ProviderError::failed(
                    "ERROR: [youtube] x: Sign in to confirm, try again later",
                )))
                .await;
        }
        let episodes = vec![
            fixtures::needed_episode(1, 7, "One"),
            fixtures::needed_episode(2, 7, "Two"),
            fixtures::needed_episode(3, 7, "Three"),
        ];

        let start = Instant::now();
        let report = h.orchestrator.run(&h.series, &episodes).await;
        assert_eq!(report.rate_limited, 2);
        assert_eq!(report.downloaded, 1);
        assert_eq!(start.elapsed(), Duration::from_secs(900 + 1800));

        // The third download succeeded and cleared the backoff.
        assert!(h.orchestrator.backoff().is_idle());
        assert_eq!(h.registry.recorded_rescans().await, vec![7]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_persists_across_runs() {
        let mut h = harness(settings());
        found(&h.provider, "One", "https://video/1").await;
        let episodes = vec![fixtures::needed_episode(1, 7, "One")];

        for _ in 0..2 {
            h.provider
                .push_download_result(Err(ProviderError::failed("HTTP Error 429: rate limit")))
                .await;
            h.orchestrator.run(&h.series, &episodes).await;
        }
        assert_eq!(h.orchestrator.backoff().count(), 2);
        assert_eq!(h.orchestrator.backoff().delay(), Duration::from_secs(1800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_failure_does_not_touch_backoff() {
        let mut h = harness(settings());
        found(&h.provider, "One", "https://video/1").await;
        h.provider
            .push_download_result(Err(ProviderError::failed("ERROR: Video unavailable")))
            .await;

        let start = Instant::now();
        let report = h
            .orchestrator
            .run(&h.series, &[fixtures::needed_episode(1, 7, "One")])
            .await;
        assert_eq!(report.failed, 1);
        assert!(h.orchestrator.backoff().is_idle());
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(h.registry.recorded_rescans().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rescan_failure_is_not_fatal() {
        let mut settings = settings();
        settings.download_delay = Duration::from_secs(20);
        let mut h = harness(settings);
        h.registry.fail_rescans(true).await;
        found(&h.provider, "One", "https://video/1").await;
        found(&h.provider, "Two", "https://video/2").await;

        let start = Instant::now();
        let report = h
            .orchestrator
            .run(
                &h.series,
                &[
                    fixtures::needed_episode(1, 7, "One"),
                    fixtures::needed_episode(2, 7, "Two"),
                ],
            )
            .await;
        assert_eq!(report.downloaded, 2);
        assert_eq!(start.elapsed(), Duration::from_secs(40));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_cookie_file_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings();
        settings.base_dir = dir.path().to_path_buf();
        let mut h = harness(settings);
        h.series[0].cookies_file = Some("cookies.txt".to_string());
        found(&h.provider, "One", "https://video/1").await;
        let episodes = [fixtures::needed_episode(1, 7, "One")];

        h.orchestrator.run(&h.series, &episodes).await;
        assert!(h.provider.recorded_searches().await[0].cookie_file.is_none());
        assert!(h.provider.recorded_downloads().await[0]
            .options
            .cookie_file
            .is_none());

        std::fs::write(dir.path().join("cookies.txt"), "").unwrap();
        h.orchestrator.run(&h.series, &episodes).await;
        let expected = Some(dir.path().join("cookies.txt"));
        assert_eq!(h.provider.recorded_searches().await[1].cookie_file, expected);
        assert_eq!(
            h.provider.recorded_downloads().await[1].options.cookie_file,
            expected
        );
    }
}
