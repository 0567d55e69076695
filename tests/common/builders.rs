//! Test builders: ergonomic constructors for candidate alerts and cyclic
//! input graphs.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use alertsynth_core::{fields, RawValue};
use fake::faker::internet::en::{IPv4, Username};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// CandidateBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for candidate alerts as an upstream generator would emit
/// them.
///
/// # Example
///
/// ```rust
/// let raw = CandidateBuilder::new()
///     .severity("high")
///     .risk_score(73)
///     .field("process.name", "powershell.exe")
///     .build_raw();
/// ```
#[derive(Debug, Clone, Default)]
pub struct CandidateBuilder {
    fields: Map<String, Value>,
}

impl CandidateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A plausible alert with fake host, user, IP and reason text.
    pub fn realistic() -> Self {
        let user: String = Username().fake();
        let ip: String = IPv4().fake();
        let reason: String = Sentence(4..9).fake();
        Self::new()
            .field(fields::HOST_NAME, format!("ws-{}", (100u32..999).fake::<u32>()))
            .field(fields::USER_NAME, user)
            .field("source.ip", ip)
            .field("kibana.alert.reason", reason)
            .field("kibana.alert.rule.name", "Suspicious PowerShell Execution")
            .field("threat.tactic.name", vec!["Execution"])
            .field("threat.technique.id", vec!["T1059.001"])
            .severity("medium")
            .risk_score((0u32..=100).fake::<u32>())
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn severity(self, severity: impl Into<Value>) -> Self {
        self.field(fields::SEVERITY, severity)
    }

    pub fn risk_score(self, score: impl Into<Value>) -> Self {
        self.field(fields::RISK_SCORE, score)
    }

    pub fn timestamp(self, ts: impl Into<Value>) -> Self {
        self.field(fields::TIMESTAMP, ts)
    }

    pub fn build(self) -> Value {
        Value::Object(self.fields)
    }

    pub fn build_raw(self) -> RawValue {
        RawValue::from(self.build())
    }
}

// ---------------------------------------------------------------------------
// Graph constructors
// ---------------------------------------------------------------------------

/// `{ "name": "loop", "self": <itself> }`
pub fn self_referencing_object() -> RawValue {
    let obj = RawValue::object([("name", RawValue::from("loop"))]);
    obj.insert("self", obj.clone());
    obj
}

/// `a.child = b`, `b.parent = a`, wrapped in an alert-shaped candidate.
pub fn mutually_referencing_candidate() -> RawValue {
    let a = RawValue::object([("id", RawValue::from("a"))]);
    let b = RawValue::object([("id", RawValue::from("b"))]);
    a.insert("child", b.clone());
    b.insert("parent", a.clone());
    RawValue::object([
        (fields::SEVERITY, RawValue::from("high")),
        ("process", a),
    ])
}

/// Objects nested `depth` levels under the key `"n"`.
pub fn nested_objects(depth: usize) -> RawValue {
    let mut value = RawValue::from("leaf");
    for _ in 0..depth {
        value = RawValue::object([("n", value)]);
    }
    value
}
