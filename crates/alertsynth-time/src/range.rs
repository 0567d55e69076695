//! Per-call timestamp configuration and its resolution into a [`TimeRange`].

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::pattern::TimestampPattern;
use crate::relative::{parse_date_token, DateTokenError};

/// How a caller wants timestamps chosen for one generation call.
///
/// Deserializes from the camelCase shape upstream tooling emits:
///
/// ```json
/// { "startDate": "7d", "endDate": "now", "pattern": "business_hours" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampConfig {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub pattern: Option<TimestampPattern>,
    /// Legacy knob: pin every timestamp to `now + offset` hours. Only used
    /// when neither `start_date` nor `end_date` is given.
    pub event_date_offset_hours: Option<f64>,
}

impl TimestampConfig {
    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start_date: Some(start.into()),
            end_date: Some(end.into()),
            ..Self::default()
        }
    }

    pub fn with_pattern(mut self, pattern: TimestampPattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn pattern(&self) -> TimestampPattern {
        self.pattern.unwrap_or_default()
    }
}

/// A resolved pair of instants. `start <= end` is not required; reversed
/// pairs are sampled over their [`bounds`](TimeRange::bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// A zero-width range at `instant`.
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self::new(instant, instant)
    }

    /// `(earliest, latest)` regardless of the order the pair was built in.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    pub fn width(&self) -> Duration {
        let (lo, hi) = self.bounds();
        hi - lo
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let (lo, hi) = self.bounds();
        lo <= instant && instant <= hi
    }

    /// Resolve `config` against `now`.
    ///
    /// The legacy offset path applies only when no explicit start or end is
    /// given; it yields a zero-width range at `now + offset`.
    pub fn resolve(
        config: &TimestampConfig,
        default_start: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, DateTokenError> {
        if config.start_date.is_none() && config.end_date.is_none() {
            if let Some(hours) = config.event_date_offset_hours {
                return offset_instant(now, hours).map(Self::at);
            }
        }

        let start = parse_date_token(config.start_date.as_deref().unwrap_or(default_start), now)?;
        let end = parse_date_token(config.end_date.as_deref().unwrap_or("now"), now)?;
        Ok(Self::new(start, end))
    }
}

fn offset_instant(now: DateTime<Utc>, hours: f64) -> Result<DateTime<Utc>, DateTokenError> {
    let out_of_range = || DateTokenError::OutOfRange(format!("{hours}h"));
    let millis = hours * 3_600_000.0;
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return Err(out_of_range());
    }
    Duration::try_milliseconds(millis.round() as i64)
        .and_then(|d| now.checked_add_signed(d))
        .ok_or_else(out_of_range)
}
