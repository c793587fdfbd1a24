pub mod backoff;
pub mod config;
pub mod harvester;
pub mod orchestrator;
pub mod provider;
pub mod reconciler;
pub mod registry;
pub mod resolver;
pub mod testing;

pub use backoff::{is_rate_limited, BackoffConfig, BackoffState};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use harvester::Harvester;
pub use orchestrator::{CycleReport, DownloadOrchestrator, EpisodeOutcome};
pub use provider::{MediaProvider, ProviderError, YtDlpProvider};
pub use reconciler::{MatchedSeries, NeededEpisode, Reconciler, WatchRule};
pub use registry::{RegistryClient, RegistryError, SonarrClient};
pub use resolver::{Resolution, SearchResolver};
