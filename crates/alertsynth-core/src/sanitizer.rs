//! Field sanitizer: strips dangerous content from candidate values.
//!
//! # Strings
//!
//! Applied in order:
//!
//! 1. cut to `max_string_length` characters (bounds the work below)
//! 2. drop control characters below U+0020 other than `\t`, `\n`, `\r`
//! 3. remove `<script>` / `<iframe>` blocks and stray tags, `javascript:` /
//!    `vbscript:` schemes and `on<event>=` attributes inside tags, repeating
//!    until nothing matches
//! 4. escape the remaining `<` and `>`
//! 5. cut to `max_string_length` characters again
//!
//! # Containers
//!
//! Objects are rebuilt key by key. Keys go through the string pipeline and
//! forbidden ones are dropped (see [`is_forbidden_key`]). Arrays keep their order and length. A container
//! that was already visited in this call is replaced by [`CIRCULAR_MARKER`];
//! one nested deeper than `max_depth` by [`DEPTH_MARKER`]. A container that
//! cannot be borrowed is read as empty.
//!
//! Null, booleans and numbers pass through untouched.

use std::collections::HashSet;
use std::rc::Rc;
use std::sync::LazyLock;

use phf::phf_set;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::SanitizerSettings;
use crate::raw::{RawObject, RawValue};

pub const CIRCULAR_MARKER: &str = "[Circular]";
pub const DEPTH_MARKER: &str = "[Truncated]";

/// Lowercase names that are never allowed as keys or key segments.
static FORBIDDEN_KEYS: phf::Set<&'static str> = phf_set! {
    "__proto__",
    "constructor",
    "prototype",
    "eval",
    "function",
    "script",
};

static MARKUP_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*(?:script|iframe)\b[^>]*>.*?<\s*/\s*(?:script|iframe)\s*>")
        .expect("markup block regex is valid")
});

static STRAY_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*/?\s*(?:script|iframe)\b[^>]*>?").expect("stray tag regex is valid")
});

static SCRIPT_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:java|vb)script\s*:").expect("script scheme regex is valid")
});

/// An `on<event>=` attribute inside an open tag. Group 1 is everything before
/// the attribute name and is kept.
static EVENT_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<[^<>]*[\s/"'])on[a-z]+\s*="#).expect("event handler regex is valid")
});

/// `true` if `key`, or any of its dot-separated segments, names a forbidden
/// property. Case-insensitive.
pub fn is_forbidden_key(key: &str) -> bool {
    key.to_ascii_lowercase()
        .split('.')
        .any(|segment| FORBIDDEN_KEYS.contains(segment))
}

fn is_stripped_control(c: char) -> bool {
    c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r')
}

fn truncate_chars(s: &mut String, max: usize) {
    if let Some((idx, _)) = s.char_indices().nth(max) {
        s.truncate(idx);
    }
}

/// Recursive sanitizer for candidate values.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    max_string_length: usize,
    max_depth: usize,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(&SanitizerSettings::default())
    }
}

impl Sanitizer {
    pub fn new(settings: &SanitizerSettings) -> Self {
        Self {
            max_string_length: settings.max_string_length,
            max_depth: settings.max_depth,
        }
    }

    /// Sanitize any value. Always returns, whatever the input graph.
    pub fn sanitize_value(&self, value: &RawValue) -> Value {
        self.walk(value, 0, &mut HashSet::new())
    }

    /// Sanitize a top-level object into a fresh map.
    ///
    /// Returns `None` when `value` is not an object or cannot be borrowed;
    /// callers treat that as an empty record.
    pub fn sanitize_object(&self, value: &RawValue) -> Option<Map<String, Value>> {
        let RawValue::Object(cell) = value else {
            return None;
        };
        let entries = cell.try_borrow().ok()?;
        let mut visited = HashSet::from([container_id(cell)]);
        Some(self.entries(&entries, 1, &mut visited))
    }

    /// Sanitize an already-parsed JSON value.
    pub fn sanitize_json(&self, value: &Value) -> Value {
        self.sanitize_value(&RawValue::from(value))
    }

    pub fn sanitize_str(&self, input: &str) -> String {
        let mut s: String = input
            .chars()
            .take(self.max_string_length)
            .filter(|c| !is_stripped_control(*c))
            .collect();

        // Every pass that changes the string makes it shorter, so this ends.
        loop {
            let before = s.len();
            s = MARKUP_BLOCK.replace_all(&s, "").into_owned();
            s = STRAY_TAG.replace_all(&s, "").into_owned();
            s = SCRIPT_SCHEME.replace_all(&s, "").into_owned();
            s = EVENT_HANDLER.replace_all(&s, "$1").into_owned();
            if s.len() == before {
                break;
            }
        }

        let mut escaped = s.replace('<', "&lt;").replace('>', "&gt;");
        truncate_chars(&mut escaped, self.max_string_length);
        escaped
    }

    /// Clean a key with the string pipeline. `None` if the key must be
    /// dropped: it is forbidden before or after cleaning, or nothing is left.
    pub fn sanitize_key(&self, key: &str) -> Option<String> {
        if is_forbidden_key(key) {
            return None;
        }
        let cleaned = self.sanitize_str(key);
        if cleaned.is_empty() || is_forbidden_key(&cleaned) {
            return None;
        }
        Some(cleaned)
    }

    fn walk(&self, value: &RawValue, depth: usize, visited: &mut HashSet<usize>) -> Value {
        match value {
            RawValue::Null => Value::Null,
            RawValue::Bool(b) => Value::Bool(*b),
            RawValue::Number(n) => Value::Number(n.clone()),
            RawValue::String(s) => Value::String(self.sanitize_str(s)),
            RawValue::Array(cell) => {
                if let Some(marker) = self.guard(container_id(cell), depth, visited) {
                    return marker;
                }
                match cell.try_borrow() {
                    Ok(items) => Value::Array(
                        items.iter().map(|item| self.walk(item, depth + 1, visited)).collect(),
                    ),
                    Err(_) => {
                        debug!(depth, "array locked during sanitization, reading as empty");
                        Value::Array(Vec::new())
                    }
                }
            }
            RawValue::Object(cell) => {
                if let Some(marker) = self.guard(container_id(cell), depth, visited) {
                    return marker;
                }
                match cell.try_borrow() {
                    Ok(entries) => Value::Object(self.entries(&entries, depth + 1, visited)),
                    Err(_) => {
                        debug!(depth, "object locked during sanitization, reading as empty");
                        Value::Object(Map::new())
                    }
                }
            }
        }
    }

    fn entries(&self, entries: &RawObject, depth: usize, visited: &mut HashSet<usize>) -> Map<String, Value> {
        let mut out = Map::new();
        for (key, value) in entries {
            let Some(key) = self.sanitize_key(key) else {
                debug!(key = %key.escape_debug(), "dropping forbidden key");
                continue;
            };
            let value = self.walk(value, depth, visited);
            out.insert(key, value);
        }
        out
    }

    /// Marker to emit instead of descending into a container, if any.
    fn guard(&self, id: usize, depth: usize, visited: &mut HashSet<usize>) -> Option<Value> {
        if !visited.insert(id) {
            debug!(depth, "container revisited, breaking the edge");
            return Some(Value::String(CIRCULAR_MARKER.to_string()));
        }
        if depth >= self.max_depth {
            debug!(depth, "nesting limit reached");
            return Some(Value::String(DEPTH_MARKER.to_string()));
        }
        None
    }
}

fn container_id<T>(cell: &Rc<T>) -> usize {
    Rc::as_ptr(cell) as *const () as usize
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
