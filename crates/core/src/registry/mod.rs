//! Episode registry (Sonarr) integration.
//!
//! The [`RegistryClient`] trait is the seam the reconciler and orchestrator
//! talk through; [`SonarrClient`] implements it over Sonarr's HTTP API.

mod sonarr;
mod types;

pub use sonarr::{SonarrClient, SonarrConfig};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API key rejected.
    #[error("Registry rejected the API key")]
    Unauthorized,

    /// Registry returned a non-success status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Typed façade over the registry's API.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// All series in the collection.
    async fn list_series(&self) -> Result<Vec<SeriesRecord>, RegistryError>;

    /// All episodes of one series.
    async fn list_episodes(&self, series_id: u64) -> Result<Vec<EpisodeRecord>, RegistryError>;

    /// All files the registry has indexed for one series.
    async fn list_episode_files(&self, series_id: u64)
        -> Result<Vec<EpisodeFile>, RegistryError>;

    /// Ask the registry to rescan the series folder on disk.
    async fn trigger_rescan(&self, series_id: u64) -> Result<CommandAck, RegistryError>;
}
