//! Timestamp pattern generator: draws one instant from a [`TimeRange`]
//! according to a named distribution.
//!
//! Randomness comes from a caller-supplied [`rand::Rng`], so tests can pass
//! a seeded generator and get repeatable draws. Every pattern returns the
//! range's only instant when the range has zero width, without consuming
//! any randomness.
//!
//! Samples have millisecond precision and always fall inside the range.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, SecondsFormat, TimeZone, Timelike, Utc, Weekday};
use rand::Rng;
use serde::Deserialize;
use tracing::warn;

use crate::range::{TimeRange, TimestampConfig};
use crate::relative::DateTokenError;
use crate::settings::TimestampSettings;

/// Ranges longer than this are not scanned day by day; biased patterns use
/// rejection sampling instead.
const MAX_SCAN_DAYS: i64 = 10_000;

/// Draws attempted by rejection sampling before settling for a uniform one.
const REJECTION_ATTEMPTS: usize = 64;

const MILLIS_PER_HOUR: i64 = 3_600_000;

// ---------------------------------------------------------------------------
// Pattern names
// ---------------------------------------------------------------------------

/// A named probability distribution over a time range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPattern {
    #[default]
    Uniform,
    BusinessHours,
    AttackSimulation,
    WeekendHeavy,
    /// Alias of [`Uniform`](TimestampPattern::Uniform).
    Random,
}

impl TimestampPattern {
    pub const ALL: [TimestampPattern; 5] = [
        TimestampPattern::Uniform,
        TimestampPattern::BusinessHours,
        TimestampPattern::AttackSimulation,
        TimestampPattern::WeekendHeavy,
        TimestampPattern::Random,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TimestampPattern::Uniform => "uniform",
            TimestampPattern::BusinessHours => "business_hours",
            TimestampPattern::AttackSimulation => "attack_simulation",
            TimestampPattern::WeekendHeavy => "weekend_heavy",
            TimestampPattern::Random => "random",
        }
    }
}

impl fmt::Display for TimestampPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned by [`TimestampPattern::from_str`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown timestamp pattern {0:?}")]
pub struct UnknownPattern(pub String);

impl FromStr for TimestampPattern {
    type Err = UnknownPattern;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| UnknownPattern(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Produces instants and ISO-8601 strings for alert date fields.
#[derive(Debug, Clone, Default)]
pub struct TimestampGenerator {
    settings: TimestampSettings,
}

impl TimestampGenerator {
    pub fn new(settings: TimestampSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TimestampSettings {
        &self.settings
    }

    /// Resolve `config` into a range, using the configured default start.
    pub fn time_range(
        &self,
        config: &TimestampConfig,
        now: DateTime<Utc>,
    ) -> Result<TimeRange, DateTokenError> {
        TimeRange::resolve(config, &self.settings.default_start, now)
    }

    /// Draw one instant from `range` following `pattern`.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        range: &TimeRange,
        pattern: TimestampPattern,
        rng: &mut R,
    ) -> DateTime<Utc> {
        if range.is_degenerate() {
            return range.start;
        }
        let (earliest, _) = range.bounds();
        let Some((lo, hi)) = millis_bounds(range) else {
            return earliest;
        };

        let picked = match pattern {
            TimestampPattern::Uniform | TimestampPattern::Random => rng.gen_range(lo..=hi),
            TimestampPattern::BusinessHours => {
                let (open, close) = (self.settings.business_hours_start, self.settings.business_hours_end);
                self.biased(
                    lo,
                    hi,
                    self.settings.business_hours_bias,
                    |_| Some((open, close)),
                    |t| (open..close).contains(&t.hour()),
                    rng,
                )
            }
            TimestampPattern::WeekendHeavy => self.biased(
                lo,
                hi,
                self.settings.weekend_bias,
                |day| is_weekend(day.weekday()).then_some((0, 24)),
                |t| is_weekend(t.weekday()),
                rng,
            ),
            TimestampPattern::AttackSimulation => self.burst(lo, hi, rng),
        };

        DateTime::from_timestamp_millis(picked).unwrap_or(earliest)
    }

    /// Compose range resolution and pattern sampling into an ISO-8601 string.
    ///
    /// With no configuration the current instant is used. A configuration
    /// whose range cannot be resolved also falls back to the current instant,
    /// so the result always parses.
    pub fn generate_timestamp<R: Rng + ?Sized>(
        &self,
        config: Option<&TimestampConfig>,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> String {
        let instant = match config {
            None => now,
            Some(cfg) => match self.time_range(cfg, now) {
                Ok(range) => self.generate(&range, cfg.pattern(), rng),
                Err(err) => {
                    warn!(%err, "timestamp range unusable, falling back to current instant");
                    now
                }
            },
        };
        if (0..=9999).contains(&instant.year()) {
            format_timestamp(instant)
        } else {
            warn!(%instant, "generated instant cannot be written as ISO-8601, using current instant");
            format_timestamp(now)
        }
    }

    /// Prefer instants accepted by `window_for` / `prefers` with probability
    /// `bias`, otherwise sample uniformly.
    ///
    /// `window_for` maps a local calendar day to the `[open, close)` hours
    /// that count as preferred on that day. `prefers` answers the same
    /// question for a single instant and is only used for ranges too long to
    /// scan day by day.
    fn biased<R: Rng + ?Sized>(
        &self,
        lo: i64,
        hi: i64,
        bias: f64,
        window_for: impl Fn(NaiveDate) -> Option<(u32, u32)>,
        prefers: impl Fn(DateTime<FixedOffset>) -> bool,
        rng: &mut R,
    ) -> i64 {
        if rng.gen::<f64>() >= bias {
            return rng.gen_range(lo..=hi);
        }

        match self.day_windows(lo, hi, window_for) {
            Some(windows) if !windows.is_empty() => pick_in_windows(&windows, rng),
            Some(_) => rng.gen_range(lo..=hi),
            None => {
                let tz = self.settings.offset();
                for _ in 0..REJECTION_ATTEMPTS {
                    let candidate = rng.gen_range(lo..=hi);
                    let accepted = DateTime::from_timestamp_millis(candidate)
                        .is_some_and(|t| prefers(t.with_timezone(&tz)));
                    if accepted {
                        return candidate;
                    }
                }
                rng.gen_range(lo..=hi)
            }
        }
    }

    /// Closed millisecond intervals of preferred time intersecting `[lo, hi]`.
    /// `None` when the range spans too many days to enumerate.
    fn day_windows(
        &self,
        lo: i64,
        hi: i64,
        window_for: impl Fn(NaiveDate) -> Option<(u32, u32)>,
    ) -> Option<Vec<(i64, i64)>> {
        let tz = self.settings.offset();
        let first = DateTime::from_timestamp_millis(lo)?.with_timezone(&tz).date_naive();
        let last = DateTime::from_timestamp_millis(hi)?.with_timezone(&tz).date_naive();
        let days = (last - first).num_days();
        if days > MAX_SCAN_DAYS {
            return None;
        }

        let mut windows = Vec::new();
        for day in first.iter_days().take(days as usize + 1) {
            let Some((open, close)) = window_for(day) else {
                continue;
            };
            let Some(midnight) = day
                .and_hms_opt(0, 0, 0)
                .and_then(|naive| tz.from_local_datetime(&naive).single())
            else {
                continue;
            };
            let midnight = midnight.timestamp_millis();
            let from = (midnight + i64::from(open) * MILLIS_PER_HOUR).max(lo);
            let to = (midnight + i64::from(close) * MILLIS_PER_HOUR - 1).min(hi);
            if from <= to {
                windows.push((from, to));
            }
        }
        Some(windows)
    }

    /// Cluster around fixed fractions of the range.
    fn burst<R: Rng + ?Sized>(&self, lo: i64, hi: i64, rng: &mut R) -> i64 {
        let points = &self.settings.attack_burst_points;
        if points.is_empty() {
            return rng.gen_range(lo..=hi);
        }
        let width = hi - lo;
        let fraction = points[rng.gen_range(0..points.len())].clamp(0.0, 1.0);
        let centre = lo + (width as f64 * fraction).round() as i64;

        let spread = (i64::from(self.settings.attack_burst_spread_minutes) * 60_000).min(width / 10);
        // Sum of two uniforms: triangular jitter peaked on the centre.
        let jitter = (rng.gen::<f64>() + rng.gen::<f64>() - 1.0) * spread as f64;
        centre.saturating_add(jitter.round() as i64).clamp(lo, hi)
    }
}

/// Format an instant the way alert records carry it:
/// `2024-01-15T10:00:00.000Z`.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

/// Whole-millisecond bounds lying inside the range. Sub-millisecond ends
/// are rounded inward; `None` if no whole millisecond remains.
fn millis_bounds(range: &TimeRange) -> Option<(i64, i64)> {
    let (earliest, latest) = range.bounds();
    let lo = earliest.timestamp_millis()
        + i64::from(earliest.timestamp_subsec_nanos() % 1_000_000 != 0);
    let hi = latest.timestamp_millis();
    (lo <= hi).then_some((lo, hi))
}

fn pick_in_windows<R: Rng + ?Sized>(windows: &[(i64, i64)], rng: &mut R) -> i64 {
    let total: i64 = windows.iter().map(|(a, b)| b - a + 1).sum();
    let mut offset = rng.gen_range(0..total);
    for &(a, b) in windows {
        let len = b - a + 1;
        if offset < len {
            return a + offset;
        }
        offset -= len;
    }
    // Unreachable while `offset < total`; keep the last window's end.
    windows.last().map_or(0, |&(_, b)| b)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
