use std::collections::HashSet;

use super::{types::Config, ConfigError};
use crate::reconciler::TitleRewrite;

/// Validate configuration
/// Currently validates:
/// - harvester: scan interval and backoff tuning are usable
/// - registry: host, port and API key are present
/// - ytdl: default and merge formats are present
/// - series: titles/urls present, titles unique, regexes compile
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let harvester = &config.harvester;
    if harvester.scan_interval == 0 {
        return Err(ConfigError::invalid("harvester", "scan_interval cannot be 0"));
    }
    if !harvester.backoff_multiplier.is_finite() || harvester.backoff_multiplier < 1.0 {
        return Err(ConfigError::invalid(
            "harvester",
            format!(
                "backoff_multiplier must be >= 1.0, got {}",
                harvester.backoff_multiplier
            ),
        ));
    }
    if harvester.backoff_max == 0 {
        return Err(ConfigError::invalid("harvester", "backoff_max cannot be 0"));
    }

    let registry = &config.registry;
    if registry.host.trim().is_empty() {
        return Err(ConfigError::invalid("registry", "host cannot be empty"));
    }
    if registry.port == 0 {
        return Err(ConfigError::invalid("registry", "port cannot be 0"));
    }
    if registry.api_key.is_empty() {
        return Err(ConfigError::invalid("registry", "api_key cannot be empty"));
    }

    if config.ytdl.default_format.trim().is_empty() {
        return Err(ConfigError::invalid("ytdl", "default_format cannot be empty"));
    }
    if config.ytdl.merge_output_format.trim().is_empty() {
        return Err(ConfigError::invalid("ytdl", "merge_output_format cannot be empty"));
    }

    let mut titles = HashSet::new();
    for (idx, rule) in config.series.iter().enumerate() {
        if rule.title.is_empty() {
            return Err(ConfigError::invalid(
                "series",
                format!("entry {} has an empty title", idx + 1),
            ));
        }
        if rule.url.trim().is_empty() {
            return Err(ConfigError::invalid(
                "series",
                format!("'{}' has an empty url", rule.title),
            ));
        }
        if !titles.insert(rule.title.as_str()) {
            return Err(ConfigError::invalid(
                "series",
                format!("'{}' is listed more than once", rule.title),
            ));
        }
        for (side, regex) in [("registry", &rule.regex.registry), ("site", &rule.regex.site)] {
            if let Some(regex) = regex {
                TitleRewrite::compile(regex).map_err(|e| {
                    ConfigError::invalid(
                        "series",
                        format!("'{}' has an invalid {} regex: {}", rule.title, side, e),
                    )
                })?;
            }
        }
    }

    Ok(())
}
