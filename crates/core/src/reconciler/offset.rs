//! Air-date offsets.
//!
//! The registry's air time and the moment an upload actually appears on the
//! source rarely line up. An offset shifts the registry time before it is
//! compared with "now".

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Signed shift applied to an episode's air date. Components add up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirDateOffset {
    #[serde(default)]
    pub weeks: i64,
    #[serde(default)]
    pub days: i64,
    #[serde(default)]
    pub hours: i64,
    #[serde(default)]
    pub minutes: i64,
}

impl AirDateOffset {
    /// Total shift, or `None` if it does not fit in a [`TimeDelta`].
    pub fn as_delta(&self) -> Option<TimeDelta> {
        TimeDelta::try_weeks(self.weeks)?
            .checked_add(&TimeDelta::try_days(self.days)?)?
            .checked_add(&TimeDelta::try_hours(self.hours)?)?
            .checked_add(&TimeDelta::try_minutes(self.minutes)?)
    }

    /// Shifts `air_date`, saturating at the representable range.
    pub fn apply(&self, air_date: DateTime<Utc>) -> DateTime<Utc> {
        let shifted = self
            .as_delta()
            .and_then(|delta| air_date.checked_add_signed(delta));
        match shifted {
            Some(date) => date,
            None if self.is_negative() => DateTime::<Utc>::MIN_UTC,
            None => DateTime::<Utc>::MAX_UTC,
        }
    }

    fn is_negative(&self) -> bool {
        self.weeks
            .saturating_mul(7 * 24 * 60)
            .saturating_add(self.days.saturating_mul(24 * 60))
            .saturating_add(self.hours.saturating_mul(60))
            .saturating_add(self.minutes)
            < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_apply_adds_all_components() {
        let offset = AirDateOffset {
            weeks: 1,
            days: 2,
            hours: 3,
            minutes: 30,
        };
        let aired = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            offset.apply(aired),
            Utc.with_ymd_and_hms(2024, 1, 10, 3, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_negative_offset_moves_earlier() {
        let offset = AirDateOffset {
            hours: -5,
            ..Default::default()
        };
        let aired = Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap();
        assert_eq!(
            offset.apply(aired),
            Utc.with_ymd_and_hms(2023, 12, 31, 21, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_default_is_identity() {
        let aired = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(AirDateOffset::default().apply(aired), aired);
    }

    #[test]
    fn test_huge_offset_saturates() {
        let offset = AirDateOffset {
            weeks: i64::MAX,
            ..Default::default()
        };
        let aired = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(offset.apply(aired), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_deserialize_partial() {
        let offset: AirDateOffset = toml::from_str("days = 1").unwrap();
        assert_eq!(offset.days, 1);
        assert_eq!(offset.weeks, 0);
    }
}
