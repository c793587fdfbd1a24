//! Joining registry series with watch rules.

use tracing::warn;

use super::rules::WatchRule;
use super::types::MatchedSeries;
use crate::registry::SeriesRecord;

/// Returns one [`MatchedSeries`] per registry series whose title equals a
/// watch rule's title (case-sensitive, no normalization), in registry order.
///
/// Unmonitored matches are kept; they only produce a warning.
pub fn match_watch_rules(series: &[SeriesRecord], rules: &[WatchRule]) -> Vec<MatchedSeries> {
    let matched: Vec<MatchedSeries> = series
        .iter()
        .filter_map(|record| {
            rules
                .iter()
                .find(|rule| rule.title == record.title)
                .map(|rule| MatchedSeries::merge(record, rule))
        })
        .collect();

    for unmonitored in matched.iter().filter(|s| !s.monitored) {
        warn!("{} is not currently monitored", unmonitored.title);
    }

    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_exact_title_match_only() {
        let series = vec![
            fixtures::series(1, "Show A"),
            fixtures::series(2, "show a"),
            fixtures::series(3, "Show A "),
            fixtures::series(4, "Unwatched"),
        ];
        let rules = vec![fixtures::watch_rule("Show A", "channelX")];

        let matched = match_watch_rules(&series, &rules);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, 1);
        assert_eq!(matched[0].url, "channelX");
    }

    #[test]
    fn test_keeps_registry_order() {
        let series = vec![
            fixtures::series(2, "Show B"),
            fixtures::series(1, "Show A"),
        ];
        let rules = vec![
            fixtures::watch_rule("Show A", "channelX"),
            fixtures::watch_rule("Show B", "channelY"),
        ];

        let ids: Vec<u64> = match_watch_rules(&series, &rules)
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_unmonitored_series_is_kept() {
        let mut record = fixtures::series(5, "Paused Show");
        record.monitored = false;
        let rules = vec![fixtures::watch_rule("Paused Show", "channelZ")];

        let matched = match_watch_rules(&[record], &rules);
        assert_eq!(matched.len(), 1);
        assert!(!matched[0].monitored);
    }

    #[test]
    fn test_no_rules_no_matches() {
        let series = vec![fixtures::series(1, "Show A")];
        assert!(match_watch_rules(&series, &[]).is_empty());
    }
}
