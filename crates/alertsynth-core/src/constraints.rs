//! Declarative field constraints.
//!
//! A [`ConstraintTable`] maps field paths to [`FieldRule`]s. The normalizer
//! walks the table in order and asks each rule what to do with the current
//! value; rules never look at other fields. Adding a constraint is a
//! [`ConstraintTable::with_rule`] call, not a new branch in the normalizer.
//!
//! Rules that need fresh data (identifiers, timestamps) pull it from a
//! [`FieldSource`] so they stay free of randomness and clocks.

use chrono::DateTime;
use serde_json::{Number, Value};

use crate::config::AlertSettings;
use crate::types::fields;
use alertsynth_time::{format_timestamp, parse_absolute};

pub const SEVERITIES: &[&str] = &["low", "medium", "high", "critical"];
pub const WORKFLOW_STATUSES: &[&str] = &["open", "acknowledged", "closed"];

/// Supplies generated values to rules.
pub trait FieldSource {
    /// A new unique identifier.
    fn fresh_id(&mut self) -> String;
    /// A new ISO-8601 timestamp.
    fn fresh_timestamp(&mut self) -> String;
}

/// What a rule decided for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Enforced {
    Keep,
    Set(Value),
    Remove,
}

/// A constraint on a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    /// Non-blank string, otherwise a generated identifier.
    Identifier,
    /// Non-blank string, otherwise `default`.
    Required { default: String },
    /// One of `allowed` (case-sensitive), otherwise `default`.
    OneOf { allowed: &'static [&'static str], default: String },
    /// Number clamped into `[min, max]`; numeric strings are converted.
    /// Missing or non-numeric values become `default`.
    Range { min: f64, max: f64, default: f64 },
    /// RFC 3339 string. Invalid values are regenerated; a missing value is
    /// generated only when `required`.
    Timestamp { required: bool },
    /// Array of strings. Non-string elements are dropped, a lone string is
    /// wrapped, anything else removed.
    StringList,
}

impl FieldRule {
    pub fn enforce(&self, current: Option<&Value>, source: &mut dyn FieldSource) -> Enforced {
        match self {
            FieldRule::Identifier => match current {
                Some(Value::String(s)) if !s.trim().is_empty() => Enforced::Keep,
                _ => Enforced::Set(Value::String(source.fresh_id())),
            },
            FieldRule::Required { default } => match current {
                Some(Value::String(s)) if !s.trim().is_empty() => Enforced::Keep,
                _ => Enforced::Set(Value::String(default.clone())),
            },
            FieldRule::OneOf { allowed, default } => match current {
                Some(Value::String(s)) if allowed.contains(&s.as_str()) => Enforced::Keep,
                _ => Enforced::Set(Value::String(default.clone())),
            },
            FieldRule::Range { min, max, default } => match current.and_then(numeric) {
                Some(n) if (*min..=*max).contains(&n) && matches!(current, Some(Value::Number(_))) => {
                    Enforced::Keep
                }
                Some(n) => Enforced::Set(number_value(n.clamp(*min, *max))),
                None => Enforced::Set(number_value(*default)),
            },
            FieldRule::Timestamp { required } => match current {
                Some(Value::String(s)) if DateTime::parse_from_rfc3339(s).is_ok() => Enforced::Keep,
                // Offset-free ISO-8601 is valid too; carry it in the record's UTC form.
                Some(Value::String(s)) => match parse_absolute(s) {
                    Some(instant) => Enforced::Set(Value::String(format_timestamp(instant))),
                    None => Enforced::Set(Value::String(source.fresh_timestamp())),
                },
                None if !required => Enforced::Keep,
                _ => Enforced::Set(Value::String(source.fresh_timestamp())),
            },
            FieldRule::StringList => match current {
                None => Enforced::Keep,
                Some(Value::String(s)) => Enforced::Set(Value::Array(vec![Value::String(s.clone())])),
                Some(Value::Array(items)) if items.iter().all(Value::is_string) => Enforced::Keep,
                Some(Value::Array(items)) => Enforced::Set(Value::Array(
                    items.iter().filter(|v| v.is_string()).cloned().collect(),
                )),
                Some(_) => Enforced::Remove,
            },
        }
    }
}

/// Finite numeric reading of a number or numeric string.
fn numeric(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Integral values are written as integers, everything else as floats.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map_or(Value::from(0), Value::Number)
    }
}

/// Ordered field-path → rule table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintTable {
    rules: Vec<(String, FieldRule)>,
}

impl ConstraintTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The alert constraints, with fallbacks taken from `settings`.
    pub fn standard(settings: &AlertSettings) -> Self {
        Self::empty()
            .with_rule(fields::ALERT_UUID, FieldRule::Identifier)
            .with_rule(fields::TIMESTAMP, FieldRule::Timestamp { required: true })
            .with_rule(fields::ALERT_START, FieldRule::Timestamp { required: false })
            .with_rule(fields::ORIGINAL_TIME, FieldRule::Timestamp { required: false })
            .with_rule(fields::LAST_DETECTED, FieldRule::Timestamp { required: false })
            .with_rule(
                fields::SEVERITY,
                FieldRule::OneOf { allowed: SEVERITIES, default: settings.default_severity.clone() },
            )
            .with_rule(
                fields::RISK_SCORE,
                FieldRule::Range { min: 0.0, max: 100.0, default: settings.default_risk_score },
            )
            .with_rule(fields::STATUS, FieldRule::Required { default: "active".to_string() })
            .with_rule(
                fields::WORKFLOW_STATUS,
                FieldRule::OneOf { allowed: WORKFLOW_STATUSES, default: "open".to_string() },
            )
            .with_rule(fields::RULE_TAGS, FieldRule::StringList)
            .with_rule(fields::EVENT_CATEGORY, FieldRule::StringList)
    }

    /// Add a rule, replacing any existing rule for the same path in place.
    pub fn with_rule(mut self, path: impl Into<String>, rule: FieldRule) -> Self {
        let path = path.into();
        match self.rules.iter_mut().find(|(p, _)| *p == path) {
            Some(slot) => slot.1 = rule,
            None => self.rules.push((path, rule)),
        }
        self
    }

    pub fn get(&self, path: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|(p, _)| p == path).map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.rules.iter().map(|(p, r)| (p.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
