//! Batch shape repair.
//!
//! A generator asked for N alerts rarely returns exactly N objects. This
//! module forces whatever came back into a sequence of exactly N maps.

use serde_json::{Map, Value};
use tracing::debug;

use crate::cleaner::clean_json_response;

/// Coerce `value` into exactly `expected` objects.
///
/// | input                 | treated as                     |
/// |-----------------------|--------------------------------|
/// | array                 | its elements                   |
/// | anything else         | a one-element array            |
/// | non-object element    | `{}`                           |
///
/// Short batches are padded with `{}`; long ones keep the first
/// `expected` elements.
pub fn repair_batch(value: Value, expected: usize) -> Vec<Map<String, Value>> {
    if expected == 0 {
        return Vec::new();
    }

    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    let received = items.len();

    let mut batch: Vec<Map<String, Value>> = items
        .into_iter()
        .take(expected)
        .map(|item| match item {
            Value::Object(map) => map,
            _ => Map::new(),
        })
        .collect();
    batch.resize_with(expected, Map::new);

    if received != expected {
        debug!(received, expected, "batch resized");
    }
    batch
}

/// Clean, parse and repair a raw batch response in one go.
///
/// A response that still does not parse after cleaning yields `expected`
/// empty objects.
pub fn parse_batch_response<'a>(text: impl Into<Option<&'a str>>, expected: usize) -> Vec<Map<String, Value>> {
    let cleaned = clean_json_response(text);
    let value = serde_json::from_str(&cleaned).unwrap_or_else(|err| {
        debug!(%err, "cleaned response does not parse");
        Value::Null
    });
    repair_batch(value, expected)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
