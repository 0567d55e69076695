//! alertsynth-time: timestamps for synthetic alerts.
//!
//! ```text
//! TimestampConfig ──► TimeRange::resolve ──► TimestampGenerator::generate ──► ISO-8601
//!   (tokens)            (parse_date_token)       (pattern + injected Rng)
//! ```
//!
//! All functions are pure over their inputs: the reference instant and the
//! random source are passed in. The free functions at the bottom of this
//! module supply `Utc::now()` and `rand::thread_rng()` for callers that do
//! not care about repeatability.

pub mod pattern;
pub mod range;
pub mod relative;
pub mod settings;

pub use pattern::{format_timestamp, TimestampGenerator, TimestampPattern, UnknownPattern};
pub use range::{TimeRange, TimestampConfig};
pub use relative::{is_valid_timestamp, parse_absolute, parse_date_token, DateTokenError};
pub use settings::TimestampSettings;

/// Generate one ISO-8601 timestamp with default settings, the current
/// instant and the thread-local RNG.
pub fn generate_timestamp(config: Option<&TimestampConfig>) -> String {
    TimestampGenerator::default().generate_timestamp(config, chrono::Utc::now(), &mut rand::thread_rng())
}

/// Resolve `config` against the current instant with default settings.
pub fn get_time_range(config: &TimestampConfig) -> Result<TimeRange, DateTokenError> {
    TimestampGenerator::default().time_range(config, chrono::Utc::now())
}
