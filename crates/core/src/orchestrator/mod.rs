//! Download orchestration.
//!
//! For each needed episode the orchestrator:
//! - resolves a source URL through the search resolver,
//! - downloads it with baseline options plus the series' overrides,
//! - asks the registry to rescan on success, or backs off when rate limited.

mod config;
mod job;
mod runner;
mod types;

pub use config::DownloadSettings;
pub use job::{output_template, resolve_cookie_file, DownloadJob};
pub use runner::DownloadOrchestrator;
pub use types::{CycleReport, EpisodeOutcome};
