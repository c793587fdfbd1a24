//! Registry-side records as returned by Sonarr.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A series known to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRecord {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub monitored: bool,
    /// Library folder of the series on disk.
    #[serde(default)]
    pub path: String,
}

/// A single episode of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRecord {
    pub id: u64,
    pub series_id: u64,
    #[serde(default)]
    pub title: String,
    pub season_number: u32,
    pub episode_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub monitored: bool,
    #[serde(default)]
    pub has_file: bool,
    /// Sonarr reports 0 when no file is attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_file_id: Option<u64>,
}

/// A media file the registry has indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeFile {
    pub id: u64,
    pub series_id: u64,
    #[serde(default)]
    pub season_number: u32,
    #[serde(default)]
    pub relative_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Acknowledgement of a queued registry command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandAck {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_series_listing() {
        let json = r#"[
            {"id": 7, "title": "Show A", "monitored": true, "path": "/tv/Show A",
             "seasonCount": 2, "tvdbId": 1234},
            {"id": 8, "title": "Show B", "monitored": false, "path": "/tv/Show B"}
        ]"#;
        let series: Vec<SeriesRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].id, 7);
        assert_eq!(series[0].path, "/tv/Show A");
        assert!(!series[1].monitored);
    }

    #[test]
    fn test_parse_episode_with_air_date() {
        let json = r#"{
            "id": 101, "seriesId": 7, "title": "Episode 5 Pilot",
            "seasonNumber": 1, "episodeNumber": 5,
            "airDate": "2024-03-01", "airDateUtc": "2024-03-01T17:00:00Z",
            "monitored": true, "hasFile": false, "episodeFileId": 0
        }"#;
        let episode: EpisodeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(episode.series_id, 7);
        assert_eq!(episode.episode_number, 5);
        assert_eq!(
            episode.air_date_utc,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 17, 0, 0).unwrap())
        );
        assert_eq!(episode.episode_file_id, Some(0));
    }

    #[test]
    fn test_parse_episode_without_air_date() {
        let json = r#"{
            "id": 102, "seriesId": 7, "title": "TBA",
            "seasonNumber": 2, "episodeNumber": 1,
            "monitored": true, "hasFile": false
        }"#;
        let episode: EpisodeRecord = serde_json::from_str(json).unwrap();
        assert!(episode.air_date_utc.is_none());
        assert!(episode.episode_file_id.is_none());
    }

    #[test]
    fn test_parse_command_ack() {
        let json = r#"{"id": 55, "name": "RescanSeries", "status": "queued", "body": {}}"#;
        let ack: CommandAck = serde_json::from_str(json).unwrap();
        assert_eq!(ack.id, 55);
        assert_eq!(ack.status.as_deref(), Some("queued"));
    }
}
