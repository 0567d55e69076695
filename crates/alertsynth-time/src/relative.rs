//! Relative date parser: turns `now`, `<N><unit>` tokens and absolute
//! ISO-8601 strings into UTC instants.
//!
//! | Token            | Meaning                               |
//! |------------------|---------------------------------------|
//! | `now`            | the reference instant                 |
//! | `15m`            | 15 minutes before the reference       |
//! | `6h`             | 6 hours before                        |
//! | `7d`             | 7 days before                         |
//! | `2w`             | 2 weeks before                        |
//! | `3M`             | 3 calendar months before              |
//! | `1y`             | 1 calendar year before                |
//! | `2024-01-15T10:00:00Z` | that instant, as written        |
//!
//! Unit letters are case-sensitive: `m` is minutes, `M` is months.
//!
//! Parsing never panics. A token that cannot be resolved comes back as a
//! [`DateTokenError`]; callers decide what to fall back to.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

static RELATIVE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([mhdwMy])$").expect("relative token regex is valid"));

/// Naive datetime layouts accepted in addition to RFC 3339. They carry no
/// offset and are read as UTC.
const NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Why a date token could not be resolved to an instant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateTokenError {
    #[error("empty date token")]
    Empty,

    #[error("unrecognised date token {0:?}")]
    Unrecognised(String),

    #[error("offset {0:?} falls outside the representable time range")]
    OutOfRange(String),
}

/// Unit suffix of a relative token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl RelativeUnit {
    fn from_suffix(c: char) -> Option<Self> {
        match c {
            'm' => Some(Self::Minutes),
            'h' => Some(Self::Hours),
            'd' => Some(Self::Days),
            'w' => Some(Self::Weeks),
            'M' => Some(Self::Months),
            'y' => Some(Self::Years),
            _ => None,
        }
    }

    /// Step `amount` units back from `from`. `None` on overflow.
    fn subtract(self, from: DateTime<Utc>, amount: u64) -> Option<DateTime<Utc>> {
        let amount = i64::try_from(amount).ok()?;
        let fixed = |delta: Option<Duration>| delta.and_then(|d| from.checked_sub_signed(d));
        match self {
            Self::Minutes => fixed(Duration::try_minutes(amount)),
            Self::Hours => fixed(Duration::try_hours(amount)),
            Self::Days => fixed(Duration::try_days(amount)),
            Self::Weeks => fixed(Duration::try_weeks(amount)),
            Self::Months => {
                let months = u32::try_from(amount).ok()?;
                from.checked_sub_months(Months::new(months))
            }
            Self::Years => {
                let months = u32::try_from(amount.checked_mul(12)?).ok()?;
                from.checked_sub_months(Months::new(months))
            }
        }
    }
}

/// Resolve `token` against the reference instant `now`.
///
/// Relative tokens always step backwards from `now`, whether they are used
/// as the start or the end of a range.
pub fn parse_date_token(token: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, DateTokenError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(DateTokenError::Empty);
    }
    if token == "now" {
        return Ok(now);
    }

    if let Some(caps) = RELATIVE_TOKEN.captures(token) {
        let unit = caps[2]
            .chars()
            .next()
            .and_then(RelativeUnit::from_suffix)
            .ok_or_else(|| DateTokenError::Unrecognised(token.to_string()))?;
        let amount: u64 = caps[1]
            .parse()
            .map_err(|_| DateTokenError::OutOfRange(token.to_string()))?;
        return unit
            .subtract(now, amount)
            .ok_or_else(|| DateTokenError::OutOfRange(token.to_string()));
    }

    parse_absolute(token).ok_or_else(|| DateTokenError::Unrecognised(token.to_string()))
}

/// Parse an absolute ISO-8601 instant. Offsets are honoured; naive forms
/// are taken as UTC and a bare date means midnight UTC.
pub fn parse_absolute(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// `true` if `text` is an absolute ISO-8601 instant that [`parse_absolute`]
/// accepts, with or without an offset.
pub fn is_valid_timestamp(text: &str) -> bool {
    parse_absolute(text).is_some()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
