//! Compact duration strings such as `2h 30m` or `1w 2d`.

use chrono::TimeDelta;

use crate::error::{SiteCalError, SiteCalResult};

/// Unit suffixes accepted in an `event-duration` chunk.
const UNITS: [char; 5] = ['w', 'd', 'h', 'm', 's'];

/// A span of time as written in content metadata.
///
/// Each field is present only if its unit appeared in the source string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Duration {
    pub weeks: Option<i64>,
    pub days: Option<i64>,
    pub hours: Option<i64>,
    pub minutes: Option<i64>,
    pub seconds: Option<i64>,
}

impl Duration {
    /// Parse a duration string in the format `[<num><unit> ]*`, e.g. `2h 30m`.
    ///
    /// Repeated units overwrite earlier ones. `title` is only used to name the
    /// event in errors.
    pub fn parse(input: &str, title: &str) -> SiteCalResult<Self> {
        let mut duration = Duration::default();

        for chunk in input.split_whitespace() {
            let Some((idx, unit)) = chunk.char_indices().last() else {
                continue;
            };

            if !UNITS.contains(&unit) {
                tracing::error!(
                    chunk,
                    title,
                    "Unknown time multiplier in the 'event-duration' field"
                );
                return Err(SiteCalError::InvalidUnit {
                    chunk: chunk.to_string(),
                    title: title.to_string(),
                });
            }

            let value: i64 = chunk[..idx].parse().map_err(|_| {
                tracing::error!(chunk, title, "Unable to parse the 'event-duration' field");
                SiteCalError::InvalidNumber {
                    chunk: chunk.to_string(),
                    title: title.to_string(),
                }
            })?;

            let slot = match unit {
                'w' => &mut duration.weeks,
                'd' => &mut duration.days,
                'h' => &mut duration.hours,
                'm' => &mut duration.minutes,
                _ => &mut duration.seconds,
            };
            *slot = Some(value);
        }

        // Surface overflow here rather than when the end time is computed
        if duration.to_time_delta().is_none() {
            tracing::error!(value = input, title, "Duration out of range");
            return Err(SiteCalError::DurationOutOfRange {
                value: input.to_string(),
                title: title.to_string(),
            });
        }

        Ok(duration)
    }

    /// Total span as a chrono delta, or `None` on overflow.
    pub fn to_time_delta(&self) -> Option<TimeDelta> {
        let parts = [
            self.weeks.map(TimeDelta::try_weeks),
            self.days.map(TimeDelta::try_days),
            self.hours.map(TimeDelta::try_hours),
            self.minutes.map(TimeDelta::try_minutes),
            self.seconds.map(TimeDelta::try_seconds),
        ];

        parts
            .into_iter()
            .flatten()
            .try_fold(TimeDelta::zero(), |total, part| total.checked_add(&part?))
    }
}
