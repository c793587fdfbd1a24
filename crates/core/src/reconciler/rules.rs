//! User-declared watch rules.

use serde::{Deserialize, Serialize};

use super::offset::AirDateOffset;

/// One watch-list entry: where to source a registry series from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchRule {
    /// Must equal the registry's series title exactly.
    pub title: String,
    /// Channel or playlist URL to search.
    pub url: String,
    #[serde(default)]
    pub regex: TitleRegexes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<AirDateOffset>,
    /// Cookie file, relative to the config directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies_file: Option<String>,
    /// Format selector overriding the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(
        default,
        alias = "playlistreverse",
        skip_serializing_if = "Option::is_none"
    )]
    pub playlist_reverse: Option<bool>,
    /// Present = subtitles enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitles: Option<SubtitlePolicy>,
}

/// Title transforms for each side of the match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRegexes {
    /// Applied to registry episode titles.
    #[serde(default, alias = "sonarr", skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegexRule>,
    /// Applied to the title before it is searched on the source site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<RegexRule>,
}

/// A match/replace pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexRule {
    #[serde(rename = "match")]
    pub pattern: String,
    #[serde(default)]
    pub replace: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitlePolicy {
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    #[serde(default)]
    pub autogenerated: bool,
}

impl Default for SubtitlePolicy {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            autogenerated: false,
        }
    }
}

pub(crate) fn default_languages() -> Vec<String> {
    vec!["en".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_subtitles_table_defaults_to_english() {
        let toml = r#"
title = "Show A"
url = "channelX"

[subtitles]
"#;
        let rule: WatchRule = toml::from_str(toml).unwrap();
        let subtitles = rule.subtitles.unwrap();
        assert_eq!(subtitles.languages, vec!["en"]);
        assert!(!subtitles.autogenerated);
    }

    #[test]
    fn test_legacy_keys() {
        let toml = r#"
title = "Show A"
url = "channelX"
playlistreverse = false

[regex.sonarr]
match = "^Episode "

[regex.site]
match = " - Full Episode$"
replace = ""
"#;
        let rule: WatchRule = toml::from_str(toml).unwrap();
        assert_eq!(rule.playlist_reverse, Some(false));
        assert_eq!(rule.regex.registry.unwrap().replace, "");
        assert_eq!(rule.regex.site.unwrap().pattern, " - Full Episode$");
    }
}
