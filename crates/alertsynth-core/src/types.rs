//! Core types for alertsynth-core: the normalized [`AlertRecord`], the
//! caller-trusted [`Overrides`], and the field paths the normalizer knows
//! by name.

use serde::Serialize;
use serde_json::{Map, Value};

/// Field paths with semantic meaning to the normalizer.
pub mod fields {
    pub const ALERT_UUID: &str = "kibana.alert.uuid";
    pub const TIMESTAMP: &str = "@timestamp";
    pub const HOST_NAME: &str = "host.name";
    pub const USER_NAME: &str = "user.name";
    pub const SPACE_IDS: &str = "kibana.space_ids";
    pub const SEVERITY: &str = "kibana.alert.severity";
    pub const RISK_SCORE: &str = "kibana.alert.risk_score";
    pub const ALERT_START: &str = "kibana.alert.start";
    pub const ORIGINAL_TIME: &str = "kibana.alert.original_time";
    pub const LAST_DETECTED: &str = "kibana.alert.last_detected";
    pub const STATUS: &str = "kibana.alert.status";
    pub const WORKFLOW_STATUS: &str = "kibana.alert.workflow_status";
    pub const RULE_TAGS: &str = "kibana.alert.rule.tags";
    pub const EVENT_CATEGORY: &str = "event.category";

    /// Keys every normalized record carries.
    pub const REQUIRED: &[&str] = &[
        ALERT_UUID, TIMESTAMP, HOST_NAME, USER_NAME, SPACE_IDS, SEVERITY, RISK_SCORE,
    ];
}

/// A sanitized, constraint-conformant alert.
///
/// Keys are dotted field paths (`host.name`, `kibana.alert.severity`, …) in
/// insertion order: surviving input keys first, then anything the
/// normalizer added. Serializes as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AlertRecord {
    fields: Map<String, Value>,
}

impl AlertRecord {
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.fields.get(path)
    }

    /// The value at `path` if it is a string.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.fields.get(path).and_then(Value::as_str)
    }

    pub fn contains_key(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Caller-trusted context. These always replace whatever the candidate
/// carried under the same keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overrides {
    pub host_name: String,
    pub user_name: String,
    pub space_id: String,
}

impl Overrides {
    pub fn new(host_name: impl Into<String>, user_name: impl Into<String>, space_id: impl Into<String>) -> Self {
        Self {
            host_name: host_name.into(),
            user_name: user_name.into(),
            space_id: space_id.into(),
        }
    }

    /// Write the overrides into `fields`, replacing in place or appending.
    pub(crate) fn apply(&self, fields: &mut Map<String, Value>) {
        fields.insert(fields::HOST_NAME.to_string(), Value::String(self.host_name.clone()));
        fields.insert(fields::USER_NAME.to_string(), Value::String(self.user_name.clone()));
        fields.insert(
            fields::SPACE_IDS.to_string(),
            Value::Array(vec![Value::String(self.space_id.clone())]),
        );
    }
}

impl Default for Overrides {
    fn default() -> Self {
        Self::new("localhost", "unknown", "default")
    }
}
