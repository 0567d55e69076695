//! Untrusted candidate values.
//!
//! [`RawValue`] mirrors the JSON data model, but its arrays and objects are
//! shared handles. That lets in-process generators hand over graphs that
//! JSON cannot express: the same object referenced twice, an object that
//! contains itself, or a container that is locked (mutably borrowed) at the
//! moment it is inspected. The sanitizer is written to survive all three.
//!
//! Parsed JSON converts losslessly via `From<serde_json::Value>`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::{Number, Value};

/// Ordered key/value pairs of a raw object. Duplicate keys are allowed;
/// the last one wins once sanitized.
pub type RawObject = Vec<(String, RawValue)>;

/// A possibly hostile, possibly cyclic candidate value.
#[derive(Clone, Default)]
pub enum RawValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Rc<RefCell<Vec<RawValue>>>),
    Object(Rc<RefCell<RawObject>>),
}

impl RawValue {
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, RawValue)>) -> Self {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        RawValue::Object(Rc::new(RefCell::new(entries)))
    }

    pub fn array(items: impl IntoIterator<Item = RawValue>) -> Self {
        RawValue::Array(Rc::new(RefCell::new(items.into_iter().collect())))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, RawValue::Object(_))
    }

    /// Append an entry to an object. Returns `false` when `self` is not an
    /// object or is currently borrowed elsewhere.
    pub fn insert(&self, key: impl Into<String>, value: RawValue) -> bool {
        match self {
            RawValue::Object(cell) => match cell.try_borrow_mut() {
                Ok(mut entries) => {
                    entries.push((key.into(), value));
                    true
                }
                Err(_) => false,
            },
            _ => false,
        }
    }

    /// Append an element to an array. Same failure rules as [`insert`](Self::insert).
    pub fn push(&self, value: RawValue) -> bool {
        match self {
            RawValue::Array(cell) => match cell.try_borrow_mut() {
                Ok(mut items) => {
                    items.push(value);
                    true
                }
                Err(_) => false,
            },
            _ => false,
        }
    }
}

// Containers may be cyclic, so Debug stays shallow.
impl fmt::Debug for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => f.write_str("Null"),
            RawValue::Bool(b) => write!(f, "Bool({b})"),
            RawValue::Number(n) => write!(f, "Number({n})"),
            RawValue::String(s) => write!(f, "String({s:?})"),
            RawValue::Array(cell) => match cell.try_borrow() {
                Ok(items) => write!(f, "Array(<{} items>)", items.len()),
                Err(_) => f.write_str("Array(<locked>)"),
            },
            RawValue::Object(cell) => match cell.try_borrow() {
                Ok(entries) => write!(f, "Object(<{} entries>)", entries.len()),
                Err(_) => f.write_str("Object(<locked>)"),
            },
        }
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::Number(n) => RawValue::Number(n),
            Value::String(s) => RawValue::String(s),
            Value::Array(items) => RawValue::array(items.into_iter().map(RawValue::from)),
            Value::Object(map) => RawValue::object(map.into_iter().map(|(k, v)| (k, RawValue::from(v)))),
        }
    }
}

impl From<&Value> for RawValue {
    fn from(value: &Value) -> Self {
        RawValue::from(value.clone())
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::String(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::String(s)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        RawValue::Number(n.into())
    }
}

impl From<u64> for RawValue {
    fn from(n: u64) -> Self {
        RawValue::Number(n.into())
    }
}

/// Non-finite floats have no JSON form and become `Null`.
impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(RawValue::Null, RawValue::Number)
    }
}
