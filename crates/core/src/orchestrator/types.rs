//! Types for the download orchestrator.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What happened to one needed episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeOutcome {
    Downloaded,
    /// No source entry matched the title.
    NotFound,
    /// The provider reported rate limiting; `delay` was slept afterwards.
    RateLimited { delay: Duration },
    Failed(String),
}

/// Summary of one harvest cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Series that matched a watch rule and still need episodes.
    pub matched_series: usize,
    pub needed_episodes: usize,
    pub downloaded: usize,
    pub not_found: usize,
    pub rate_limited: usize,
    pub failed: usize,
    /// The series listing failed, so nothing was attempted.
    pub aborted: bool,
}

impl CycleReport {
    /// Report for a cycle that could not list series.
    pub fn aborted() -> Self {
        Self {
            aborted: true,
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: &EpisodeOutcome) {
        match outcome {
            EpisodeOutcome::Downloaded => self.downloaded += 1,
            EpisodeOutcome::NotFound => self.not_found += 1,
            EpisodeOutcome::RateLimited { .. } => self.rate_limited += 1,
            EpisodeOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Episodes that reached an outcome.
    pub fn attempted(&self) -> usize {
        self.downloaded + self.not_found + self.rate_limited + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcomes() {
        let mut report = CycleReport::default();
        report.record(&EpisodeOutcome::Downloaded);
        report.record(&EpisodeOutcome::NotFound);
        report.record(&EpisodeOutcome::RateLimited {
            delay: Duration::from_secs(900),
        });
        report.record(&EpisodeOutcome::Failed("boom".to_string()));
        report.record(&EpisodeOutcome::Downloaded);

        assert_eq!(report.downloaded, 2);
        assert_eq!(report.not_found, 1);
        assert_eq!(report.rate_limited, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.attempted(), 5);
        assert!(!report.aborted);
    }

    #[test]
    fn test_report_serialization() {
        let report = CycleReport::aborted();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"aborted\":true"));
        let parsed: CycleReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
