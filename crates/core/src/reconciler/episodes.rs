//! Episode filtering.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use super::offset::AirDateOffset;
use super::types::{MatchedSeries, NeededEpisode};
use crate::registry::{EpisodeFile, EpisodeRecord, RegistryClient};

/// Whether an episode still has to be fetched.
///
/// Needed iff monitored, without a file, and its offset-adjusted air date is
/// not after `now`. An episode without an air date counts as airing `now`.
pub fn is_needed(
    episode: &EpisodeRecord,
    file_ids: &HashSet<u64>,
    offset: Option<&AirDateOffset>,
    now: DateTime<Utc>,
) -> bool {
    if !episode.monitored {
        return false;
    }
    if episode.has_file
        || episode
            .episode_file_id
            .is_some_and(|id| file_ids.contains(&id))
    {
        return false;
    }

    let air_date = match (episode.air_date_utc, offset) {
        (Some(aired), Some(offset)) => offset.apply(aired),
        (Some(aired), None) => aired,
        (None, _) => now,
    };
    air_date <= now
}

/// Builds the needed list for one series, rewriting titles as configured.
pub fn select_needed_episodes(
    series: &MatchedSeries,
    episodes: &[EpisodeRecord],
    files: &[EpisodeFile],
    now: DateTime<Utc>,
) -> Vec<NeededEpisode> {
    let file_ids: HashSet<u64> = files.iter().map(|f| f.id).collect();

    episodes
        .iter()
        .filter(|episode| is_needed(episode, &file_ids, series.offset.as_ref(), now))
        .map(|episode| {
            let title = match &series.registry_rewrite {
                Some(rewrite) => rewrite.apply(&episode.title),
                None => episode.title.clone(),
            };
            NeededEpisode::from_record(episode, title)
        })
        .collect()
}

/// Computes needed episodes against a fixed clock.
pub struct Reconciler {
    registry: Arc<dyn RegistryClient>,
    now: DateTime<Utc>,
}

impl Reconciler {
    /// `now` is used for every comparison this reconciler makes.
    pub fn new(registry: Arc<dyn RegistryClient>, now: DateTime<Utc>) -> Self {
        Self { registry, now }
    }

    /// Fetches and filters episodes for every matched series.
    ///
    /// Series with nothing needed are dropped from the returned list. A
    /// registry failure for one series skips that series only.
    pub async fn compute_needed_episodes(
        &self,
        matched: Vec<MatchedSeries>,
    ) -> (Vec<MatchedSeries>, Vec<NeededEpisode>) {
        let mut kept = Vec::new();
        let mut needed = Vec::new();

        for series in matched {
            let episodes = match self.registry.list_episodes(series.id).await {
                Ok(episodes) => episodes,
                Err(e) => {
                    error!("{}: failed to list episodes: {}", series.title, e);
                    continue;
                }
            };

            let files = match self.registry.list_episode_files(series.id).await {
                Ok(files) => files,
                Err(e) => {
                    warn!(
                        "{}: failed to list episode files, relying on hasFile: {}",
                        series.title, e
                    );
                    Vec::new()
                }
            };

            let series_needed = select_needed_episodes(&series, &episodes, &files, self.now);
            if series_needed.is_empty() {
                info!("{} no episodes needed", series.title);
                continue;
            }

            info!("{} missing {} episodes", series.title, series_needed.len());
            for (i, episode) in series_needed.iter().enumerate() {
                info!("  {}: {} - {}", i + 1, series.title, episode.title);
            }

            needed.extend(series_needed);
            kept.push(series);
        }

        (kept, needed)
    }
}
