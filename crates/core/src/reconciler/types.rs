//! Reconciliation output types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::offset::AirDateOffset;
use super::rewrite::TitleRewrite;
use super::rules::{default_languages, RegexRule, WatchRule};
use crate::registry::{EpisodeRecord, SeriesRecord};

/// A registry series joined with its watch rule.
#[derive(Debug, Clone)]
pub struct MatchedSeries {
    pub id: u64,
    pub title: String,
    pub monitored: bool,
    pub path: String,
    /// Source URL from the watch rule.
    pub url: String,
    pub registry_rewrite: Option<TitleRewrite>,
    pub site_rewrite: Option<TitleRewrite>,
    pub offset: Option<AirDateOffset>,
    pub cookies_file: Option<String>,
    pub format: Option<String>,
    pub playlist_reverse: bool,
    pub subtitles: bool,
    pub subtitle_languages: Vec<String>,
    pub subtitles_autogenerated: bool,
}

impl MatchedSeries {
    /// Defaults first, then whatever the rule sets.
    pub fn merge(series: &SeriesRecord, rule: &WatchRule) -> Self {
        let mut matched = Self {
            id: series.id,
            title: series.title.clone(),
            monitored: series.monitored,
            path: series.path.clone(),
            url: rule.url.clone(),
            registry_rewrite: None,
            site_rewrite: None,
            offset: None,
            cookies_file: None,
            format: None,
            playlist_reverse: true,
            subtitles: false,
            subtitle_languages: default_languages(),
            subtitles_autogenerated: false,
        };

        matched.registry_rewrite = rule
            .regex
            .registry
            .as_ref()
            .and_then(|r| compile_logged(&series.title, "registry", r));
        matched.site_rewrite = rule
            .regex
            .site
            .as_ref()
            .and_then(|r| compile_logged(&series.title, "site", r));
        matched.offset = rule.offset;
        matched.cookies_file = rule.cookies_file.clone();
        matched.format = rule.format.clone();
        if let Some(reverse) = rule.playlist_reverse {
            matched.playlist_reverse = reverse;
        }
        if let Some(policy) = &rule.subtitles {
            matched.subtitles = true;
            matched.subtitle_languages = policy.languages.clone();
            matched.subtitles_autogenerated = policy.autogenerated;
        }

        matched
    }
}

fn compile_logged(series: &str, side: &str, rule: &RegexRule) -> Option<TitleRewrite> {
    TitleRewrite::compile(rule)
        .map_err(|e| warn!("{} {} regex ignored: {}", series, side, e))
        .ok()
}

/// An episode that has to be fetched this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeededEpisode {
    pub id: u64,
    pub series_id: u64,
    /// Registry title after the series' registry-side rewrite.
    pub title: String,
    pub season_number: u32,
    pub episode_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date_utc: Option<DateTime<Utc>>,
}

impl NeededEpisode {
    pub fn from_record(record: &EpisodeRecord, title: String) -> Self {
        Self {
            id: record.id,
            series_id: record.series_id,
            title,
            season_number: record.season_number,
            episode_number: record.episode_number,
            air_date_utc: record.air_date_utc,
        }
    }
}
