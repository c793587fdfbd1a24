//! Mock registry for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::registry::{
    CommandAck, EpisodeFile, EpisodeRecord, RegistryClient, RegistryError, SeriesRecord,
};

/// In-memory implementation of [`RegistryClient`].
///
/// Serves configured series, episodes and files, can be told to fail
/// individual calls, and records every rescan request.
#[derive(Debug, Default)]
pub struct MockRegistry {
    series: Arc<RwLock<Vec<SeriesRecord>>>,
    episodes: Arc<RwLock<HashMap<u64, Vec<EpisodeRecord>>>>,
    files: Arc<RwLock<HashMap<u64, Vec<EpisodeFile>>>>,
    fail_series: Arc<RwLock<bool>>,
    fail_episodes: Arc<RwLock<HashSet<u64>>>,
    fail_files: Arc<RwLock<HashSet<u64>>>,
    fail_rescan: Arc<RwLock<bool>>,
    rescans: Arc<RwLock<Vec<u64>>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_series(&self, series: Vec<SeriesRecord>) {
        *self.series.write().await = series;
    }

    pub async fn set_episodes(&self, series_id: u64, episodes: Vec<EpisodeRecord>) {
        self.episodes.write().await.insert(series_id, episodes);
    }

    pub async fn set_files(&self, series_id: u64, files: Vec<EpisodeFile>) {
        self.files.write().await.insert(series_id, files);
    }

    /// Flags an episode as downloaded, as a rescan would.
    pub async fn mark_has_file(&self, episode_id: u64) {
        for episode in self.episodes.write().await.values_mut().flatten() {
            if episode.id == episode_id {
                episode.has_file = true;
            }
        }
    }

    pub async fn fail_list_series(&self, fail: bool) {
        *self.fail_series.write().await = fail;
    }

    pub async fn fail_episodes_for(&self, series_id: u64) {
        self.fail_episodes.write().await.insert(series_id);
    }

    pub async fn fail_files_for(&self, series_id: u64) {
        self.fail_files.write().await.insert(series_id);
    }

    pub async fn fail_rescans(&self, fail: bool) {
        *self.fail_rescan.write().await = fail;
    }

    /// Series ids passed to `trigger_rescan`, in call order.
    pub async fn recorded_rescans(&self) -> Vec<u64> {
        self.rescans.read().await.clone()
    }

    fn failure() -> RegistryError {
        RegistryError::ApiError {
            status: 500,
            message: "mock registry failure".to_string(),
        }
    }
}

#[async_trait]
impl RegistryClient for MockRegistry {
    async fn list_series(&self) -> Result<Vec<SeriesRecord>, RegistryError> {
        if *self.fail_series.read().await {
            return Err(Self::failure());
        }
        Ok(self.series.read().await.clone())
    }

    async fn list_episodes(&self, series_id: u64) -> Result<Vec<EpisodeRecord>, RegistryError> {
        if self.fail_episodes.read().await.contains(&series_id) {
            return Err(Self::failure());
        }
        Ok(self
            .episodes
            .read()
            .await
            .get(&series_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_episode_files(
        &self,
        series_id: u64,
    ) -> Result<Vec<EpisodeFile>, RegistryError> {
        if self.fail_files.read().await.contains(&series_id) {
            return Err(Self::failure());
        }
        Ok(self
            .files
            .read()
            .await
            .get(&series_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn trigger_rescan(&self, series_id: u64) -> Result<CommandAck, RegistryError> {
        self.rescans.write().await.push(series_id);
        if *self.fail_rescan.read().await {
            return Err(Self::failure());
        }
        Ok(CommandAck {
            id: self.rescans.read().await.len() as u64,
            name: "RescanSeries".to_string(),
            status: Some("queued".to_string()),
        })
    }
}
