#![allow(unused)]
//! Sanitizer integration harness.
//!
//! # What this covers
//!
//! - **Hostile strings**: every entry of `HOSTILE_STRINGS` comes out with no
//!   angle brackets, no script scheme, no `on*=` handler and no control
//!   characters.
//! - **Forbidden keys**: every entry of `FORBIDDEN_KEYS` is dropped at any
//!   nesting level; `ALLOWED_KEYS` survive. Hostile keys are defanged like
//!   values.
//! - **Ordinary text**: command lines with `on...=` assignments outside tags
//!   pass through.
//! - **Cyclic graphs**: self and mutual references terminate and are marked.
//! - **Deep acyclic graphs**: nesting beyond `max_depth` is cut, and
//!   configuration can move the cut.
//! - **Length cap**: configured caps are honoured on multi-byte text.
//!
//! # What this does NOT cover
//!
//! - Full HTML sanitization (attributes other than event handlers, CSS)
//!
//! # Running
//!
//! ```sh
//! cargo test --test sanitizer_harness
//! ```

mod common;
use common::*;

use std::sync::LazyLock;

use alertsynth_core::{Config, RawValue, Sanitizer, CIRCULAR_MARKER, DEPTH_MARKER};
use pretty_assertions::assert_eq;
use regex::Regex;
use rstest::rstest;
use serde_json::{json, Value};

static HANDLER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bon[a-z]+\s*=").unwrap());

fn defanged(s: &str) -> bool {
    !s.contains(['<', '>'])
        && !s.to_lowercase().contains("javascript:")
        && !s.to_lowercase().contains("vbscript:")
        && !HANDLER.is_match(s)
        && !s.chars().any(|c| c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r'))
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

#[test]
fn hostile_strings_are_defanged() {
    let sanitizer = Sanitizer::default();
    for input in HOSTILE_STRINGS {
        let out = sanitizer.sanitize_str(input);
        assert!(defanged(&out), "{input:?} sanitized to {out:?}");
    }
}

#[test]
fn hostile_strings_inside_arrays_keep_order_and_length() {
    let raw = RawValue::from(json!(HOSTILE_STRINGS));
    let Value::Array(items) = Sanitizer::default().sanitize_value(&raw) else {
        panic!("array did not stay an array");
    };
    assert_eq!(items.len(), HOSTILE_STRINGS.len());
    for item in &items {
        assert!(defanged(item.as_str().unwrap()), "{item}");
    }
}

#[rstest]
#[case::long_flag("curl --only=headers https://intranet.example/api")]
#[case::word_assignment("count one=1 two=2")]
#[case::windows_switch("cmd.exe /online=true /c whoami")]
#[case::powershell("powershell.exe -NonInteractive -OnError=Continue")]
#[case::comparison("retries > 3 and onfail=alert")]
fn ordinary_text_with_on_assignments_is_untouched(#[case] input: &str) {
    let expected = input.replace('>', "&gt;");
    assert_eq!(Sanitizer::default().sanitize_str(input), expected);
}

#[test]
fn reassembled_script_tag_is_removed() {
    let out = Sanitizer::default().sanitize_str("<scr<script></script>ipt>alert(1)</script>");
    assert_eq!(out, "alert(1)");
}

#[rstest]
#[case::ascii(10, "abcdefghijklmnop", "abcdefghij")]
#[case::multibyte(3, "日本語テキスト", "日本語")]
#[case::escaped_at_cap(6, "a<b>c", "a&lt;b")]
fn configured_length_cap(#[case] cap: usize, #[case] input: &str, #[case] expected: &str) {
    let config = Config::from_toml(&format!("[sanitizer]\nmax_string_length = {cap}")).unwrap();
    assert_eq!(Sanitizer::new(&config.sanitizer).sanitize_str(input), expected);
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

#[test]
fn forbidden_keys_dropped_at_every_level() {
    let sanitizer = Sanitizer::default();
    for key in FORBIDDEN_KEYS {
        let raw = RawValue::from(json!({
            "top": 1,
            (*key): "pwned",
            "nested": { (*key): {"polluted": true}, "kept": 2 },
            "list": [{ (*key): 3 }]
        }));
        let out = sanitizer.sanitize_value(&raw);
        assert_eq!(
            out,
            json!({"top": 1, "nested": {"kept": 2}, "list": [{}]}),
            "key {key:?} leaked"
        );
    }
}

#[test]
fn lookalike_keys_survive() {
    let sanitizer = Sanitizer::default();
    for key in ALLOWED_KEYS {
        let out = sanitizer.sanitize_value(&RawValue::from(json!({ (*key): "v" })));
        assert_eq!(out, json!({ (*key): "v" }), "key {key:?} was dropped");
    }
}

#[test]
fn hostile_keys_are_defanged_like_values() {
    let sanitizer = Sanitizer::default();
    for key in HOSTILE_STRINGS {
        let Value::Object(out) = sanitizer.sanitize_value(&RawValue::from(json!({ (*key): "v" }))) else {
            panic!("object did not stay an object");
        };
        for kept in out.keys() {
            assert!(defanged(kept), "key {key:?} sanitized to {kept:?}");
        }
    }
}

// ---------------------------------------------------------------------------
// Graph shape
// ---------------------------------------------------------------------------

#[test]
fn self_reference_terminates() {
    let out = Sanitizer::default().sanitize_value(&self_referencing_object());
    assert_eq!(out, json!({"name": "loop", "self": CIRCULAR_MARKER}));
}

#[test]
fn mutual_reference_terminates() {
    let out = Sanitizer::default().sanitize_value(&mutually_referencing_candidate());
    assert_eq!(
        out,
        json!({
            "kibana.alert.severity": "high",
            "process": {"id": "a", "child": {"id": "b", "parent": CIRCULAR_MARKER}}
        })
    );
}

#[test]
fn cyclic_array_terminates() {
    let list = RawValue::array([RawValue::from(1i64)]);
    list.push(list.clone());
    let out = Sanitizer::default().sanitize_value(&RawValue::object([("list", list)]));
    assert_eq!(out, json!({"list": [1, CIRCULAR_MARKER]}));
}

#[rstest]
#[case::default_limit(None, 64)]
#[case::configured(Some(4), 4)]
fn nesting_cut_at_max_depth(#[case] configured: Option<usize>, #[case] limit: usize) {
    let config = match configured {
        Some(depth) => Config::from_toml(&format!("[sanitizer]\nmax_depth = {depth}")).unwrap(),
        None => Config::defaults(),
    };
    let mut out = Sanitizer::new(&config.sanitizer).sanitize_value(&nested_objects(limit + 10));

    let mut levels = 0;
    while let Value::Object(mut map) = out {
        out = map.remove("n").unwrap();
        levels += 1;
    }
    assert_eq!(levels, limit);
    assert_eq!(out, json!(DEPTH_MARKER));
}

#[test]
fn wide_shared_graph_stays_linear() {
    // 1 000 references to the same leaf: the first is walked, the rest marked.
    let leaf = RawValue::object([("v", RawValue::from(1i64))]);
    let root = RawValue::array((0..1_000).map(|_| leaf.clone()));
    let Value::Array(items) = Sanitizer::default().sanitize_value(&root) else {
        panic!("array did not stay an array");
    };
    assert_eq!(items[0], json!({"v": 1}));
    assert!(items[1..].iter().all(|v| v == CIRCULAR_MARKER));
}
