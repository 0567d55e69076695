//! Static corpora used across harnesses.
//!
//! Hostile strings and keys exercise the sanitizer; noisy responses are
//! shaped like what text-generation services actually return.

/// Strings that must come out of the sanitizer with no markup, scheme or
/// handler left in them.
pub const HOSTILE_STRINGS: &[&str] = &[
    "<script>alert(1)</script>",
    "<SCRIPT src=//evil.example/x.js></SCRIPT>",
    "<iframe src=\"https://evil.example\"></iframe>",
    "<img src=x onerror=alert(1)>",
    "<a href=\"javascript:alert(document.cookie)\">click</a>",
    "JaVaScRiPt:void(0)",
    "vbscript:msgbox(1)",
    "<body onload = steal()>",
    "<scr<script></script>ipt>alert(1)</script>",
    "<svg/onload=alert(1)>",
    "plain\u{0}text\u{7}with\u{1b}controls",
];

/// Keys that must never appear in a sanitized record.
pub const FORBIDDEN_KEYS: &[&str] = &[
    "__proto__",
    "constructor",
    "prototype",
    "eval",
    "function",
    "script",
    "__PROTO__",
    "Constructor",
    "EVAL",
    "a.__proto__.polluted",
    "constructor.prototype",
];

/// Keys that look suspicious but are legitimate alert fields.
pub const ALLOWED_KEYS: &[&str] = &[
    "process.command_line",
    "file.script_name",
    "function_name",
    "rule.evaluation",
    "kibana.alert.rule.description",
];

/// Raw responses paired with the JSON they should clean up to.
pub const NOISY_RESPONSES: &[(&str, &str)] = &[
    (
        "Here is your JSON response:\n```json\n{\"kibana.alert.severity\": \"high\"}\n```\nLet me know if you need more.",
        r#"{"kibana.alert.severity": "high"}"#,
    ),
    (
        "```\n[{\"host.name\": \"a\"},\n {\"host.name\": \"b\"},\n]\n```",
        r#"[{"host.name": "a"},
 {"host.name": "b"}]"#,
    ),
    (
        "{\n  // generated alert\n  \"event.category\": [\"process\"], /* MITRE */ \"threat.technique.id\": [\"T1059\"],\n}",
        "{\n  \n  \"event.category\": [\"process\"],  \"threat.technique.id\": [\"T1059\"]}",
    ),
    (
        "Sure [see below]: {\"message\": \"ends with }\"}",
        r#"{"message": "ends with }"}"#,
    ),
];

/// Responses with nothing recoverable in them.
pub const EMPTY_RESPONSES: &[&str] = &["", "   ", "\n\t\r\n", "No alerts could be generated."];

/// A batch of `n` alert objects as a single JSON array, wrapped in prose.
pub fn batch_response(n: usize) -> String {
    let items: Vec<String> = (0..n)
        .map(|i| {
            format!(
                r#"{{"kibana.alert.rule.name": "Rule {i}", "kibana.alert.severity": "{}", "kibana.alert.risk_score": {}}}"#,
                ["low", "medium", "high", "critical"][i % 4],
                (i * 17) % 130,
            )
        })
        .collect();
    format!("Generated {n} alerts:\n```json\n[{}]\n```", items.join(",\n"))
}
