//! Tunables for timestamp generation. Deserialized from the `[timestamps]`
//! section of the alertsynth configuration.

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

/// `[timestamps]` configuration section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimestampSettings {
    /// Start token used when a timestamp configuration names no start.
    #[serde(default = "default_start")]
    pub default_start: String,
    /// Offset from UTC, in minutes, used to decide hour-of-day and weekday.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_business_hours_start")]
    pub business_hours_start: u32,
    #[serde(default = "default_business_hours_end")]
    pub business_hours_end: u32,
    /// Probability that a `business_hours` draw lands inside working hours.
    #[serde(default = "default_bias")]
    pub business_hours_bias: f64,
    /// Probability that a `weekend_heavy` draw lands on a weekend.
    #[serde(default = "default_bias")]
    pub weekend_bias: f64,
    /// Burst centres for `attack_simulation`, as fractions of the range.
    #[serde(default = "default_attack_burst_points")]
    pub attack_burst_points: Vec<f64>,
    #[serde(default = "default_attack_burst_spread_minutes")]
    pub attack_burst_spread_minutes: u32,
}

fn default_start() -> String { "24h".to_string() }
fn default_business_hours_start() -> u32 { 9 }
fn default_business_hours_end() -> u32 { 17 }
fn default_bias() -> f64 { 0.8 }
fn default_attack_burst_points() -> Vec<f64> { vec![0.2, 0.5, 0.85] }
fn default_attack_burst_spread_minutes() -> u32 { 30 }

impl Default for TimestampSettings {
    fn default() -> Self {
        Self {
            default_start: default_start(),
            utc_offset_minutes: 0,
            business_hours_start: default_business_hours_start(),
            business_hours_end: default_business_hours_end(),
            business_hours_bias: default_bias(),
            weekend_bias: default_bias(),
            attack_burst_points: default_attack_burst_points(),
            attack_burst_spread_minutes: default_attack_burst_spread_minutes(),
        }
    }
}

impl TimestampSettings {
    /// The configured offset, or UTC when the minutes value is out of range.
    pub fn offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }

    /// Describe the first setting that cannot be used, if any.
    pub fn problem(&self) -> Option<String> {
        if !(self.business_hours_start < self.business_hours_end && self.business_hours_end <= 24) {
            return Some(format!(
                "business hours {}..{} must satisfy start < end <= 24",
                self.business_hours_start, self.business_hours_end
            ));
        }
        for (name, bias) in [
            ("business_hours_bias", self.business_hours_bias),
            ("weekend_bias", self.weekend_bias),
        ] {
            if !(0.0..=1.0).contains(&bias) {
                return Some(format!("{name} {bias} must lie in [0, 1]"));
            }
        }
        if let Some(p) = self.attack_burst_points.iter().find(|p| !(0.0..=1.0).contains(*p)) {
            return Some(format!("attack burst point {p} must lie in [0, 1]"));
        }
        if FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).is_none() {
            return Some(format!("utc_offset_minutes {} is out of range", self.utc_offset_minutes));
        }
        None
    }
}
