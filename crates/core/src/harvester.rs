//! One reconciliation cycle from series listing to downloads.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::config::Config;
use crate::orchestrator::{CycleReport, DownloadOrchestrator, DownloadSettings};
use crate::provider::MediaProvider;
use crate::reconciler::{match_watch_rules, Reconciler, WatchRule};
use crate::registry::RegistryClient;

/// Runs harvest cycles against one registry and provider.
///
/// Holds the orchestrator across cycles so rate-limit backoff keeps
/// escalating between them.
pub struct Harvester {
    registry: Arc<dyn RegistryClient>,
    rules: Vec<WatchRule>,
    reconciler: Reconciler,
    orchestrator: DownloadOrchestrator,
}

impl Harvester {
    /// `now` is the clock every cycle compares air dates against.
    pub fn new(
        config: &Config,
        registry: Arc<dyn RegistryClient>,
        provider: Arc<dyn MediaProvider>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            rules: config.series.clone(),
            reconciler: Reconciler::new(Arc::clone(&registry), now),
            orchestrator: DownloadOrchestrator::new(
                DownloadSettings::from(config),
                Arc::clone(&registry),
                provider,
            ),
            registry,
        }
    }

    pub fn orchestrator(&self) -> &DownloadOrchestrator {
        &self.orchestrator
    }

    /// Runs a single cycle. Failures are logged and reflected in the report.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let series = match self.registry.list_series().await {
            Ok(series) => series,
            Err(e) => {
                error!("Failed to list series from the registry: {}", e);
                return CycleReport::aborted();
            }
        };

        let matched = match_watch_rules(&series, &self.rules);
        info!(
            "{} of {} registry series are on the watch list",
            matched.len(),
            series.len()
        );

        let (matched, needed) = self.reconciler.compute_needed_episodes(matched).await;
        if needed.is_empty() {
            info!("Nothing to process");
            return CycleReport {
                matched_series: matched.len(),
                ..Default::default()
            };
        }

        let report = self.orchestrator.run(&matched, &needed).await;
        info!(
            "Cycle done: {} downloaded, {} missing, {} rate limited, {} failed",
            report.downloaded, report.not_found, report.rate_limited, report.failed
        );
        report
    }
}
