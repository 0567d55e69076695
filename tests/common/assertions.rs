//! Domain-specific assertion macros for alertsynth harnesses.
//!
//! These wrap plain panics with context-rich messages that say which alert
//! invariant broke and show the offending record.

// ---------------------------------------------------------------------------
// Field assertions
// ---------------------------------------------------------------------------

/// Assert that an `AlertRecord` has a field with an expected JSON value.
///
/// ```rust
/// assert_has_field!(alert, "kibana.alert.severity", "high");
/// ```
#[macro_export]
macro_rules! assert_has_field {
    ($alert:expr, $key:expr, $value:expr) => {{
        let alert: &alertsynth_core::AlertRecord = &$alert;
        let key: &str = $key;
        let expected = serde_json::json!($value);
        match alert.get(key) {
            Some(actual) if *actual == expected => {}
            Some(actual) => panic!(
                "assert_has_field! failed:\n  alert[{:?}]\n  expected: {}\n  actual:   {}",
                key, expected, actual
            ),
            None => panic!(
                "assert_has_field! failed: field {:?} not found.\n  Available fields: {:?}",
                key,
                alert.keys().collect::<Vec<_>>()
            ),
        }
    }};
}

/// Assert that an `AlertRecord` carries every always-present field.
#[macro_export]
macro_rules! assert_required_fields {
    ($alert:expr) => {{
        let alert: &alertsynth_core::AlertRecord = &$alert;
        let missing: Vec<&str> = alertsynth_core::fields::REQUIRED
            .iter()
            .copied()
            .filter(|key| !alert.contains_key(key))
            .collect();
        if !missing.is_empty() {
            panic!(
                "assert_required_fields! failed: missing {:?}\n  record: {}",
                missing,
                serde_json::to_string(alert).unwrap_or_default()
            );
        }
    }};
}

/// Assert that no key of the record (or of any nested object) is forbidden.
#[macro_export]
macro_rules! assert_no_forbidden_keys {
    ($alert:expr) => {{
        let alert: &alertsynth_core::AlertRecord = &$alert;
        let value = serde_json::to_value(alert).unwrap();
        if let Some(path) = $crate::common::assertions::forbidden_key_path(&value, String::new()) {
            panic!("assert_no_forbidden_keys! failed: forbidden key at {:?}\n  record: {}", path, value);
        }
    }};
}

// ---------------------------------------------------------------------------
// Constraint assertions
// ---------------------------------------------------------------------------

/// Assert severity is one of the four allowed values and risk score is a
/// number in [0, 100].
#[macro_export]
macro_rules! assert_constrained {
    ($alert:expr) => {{
        let alert: &alertsynth_core::AlertRecord = &$alert;
        let severity = alert.get_str(alertsynth_core::fields::SEVERITY);
        if !matches!(severity, Some("low" | "medium" | "high" | "critical")) {
            panic!("assert_constrained! failed: severity {:?} not allowed", severity);
        }
        let risk = alert
            .get(alertsynth_core::fields::RISK_SCORE)
            .and_then(serde_json::Value::as_f64);
        match risk {
            Some(r) if (0.0..=100.0).contains(&r) => {}
            other => panic!("assert_constrained! failed: risk score {:?} outside [0, 100]", other),
        }
    }};
}

/// Assert that a string parses as RFC 3339.
#[macro_export]
macro_rules! assert_iso8601 {
    ($value:expr) => {{
        let value: &str = $value;
        if chrono::DateTime::parse_from_rfc3339(value).is_err() {
            panic!("assert_iso8601! failed: {:?} is not an RFC 3339 instant", value);
        }
    }};
}

// ---------------------------------------------------------------------------
// Time assertions
// ---------------------------------------------------------------------------

/// Assert that an instant lies in `[start, end]`.
#[macro_export]
macro_rules! assert_within {
    ($instant:expr, $start:expr, $end:expr) => {{
        let (instant, start, end) = ($instant, $start, $end);
        if instant < start || instant > end {
            panic!(
                "assert_within! failed:\n  instant: {}\n  range:   [{}, {}]",
                instant, start, end
            );
        }
    }};
}

/// Walk a JSON value and return the dotted path of the first forbidden key.
pub fn forbidden_key_path(value: &serde_json::Value, prefix: String) -> Option<String> {
    match value {
        serde_json::Value::Object(map) => map.iter().find_map(|(key, child)| {
            let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}/{key}") };
            if alertsynth_core::is_forbidden_key(key) {
                Some(path)
            } else {
                forbidden_key_path(child, path)
            }
        }),
        serde_json::Value::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(i, child)| forbidden_key_path(child, format!("{prefix}[{i}]"))),
        _ => None,
    }
}
