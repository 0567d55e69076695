//! JSON response cleaner: recovers JSON text from a noisy model response.
//!
//! Model output tends to arrive wrapped in prose ("Here is your JSON:"),
//! fenced code blocks, comments and trailing commas. The cleaner:
//!
//! - looks for a balanced `{…}` / `[…]` region, respecting string literals
//! - drops fence markers (```` ``` ```` with an optional language tag)
//!   outside strings
//! - removes `//` and `/* */` comments outside strings
//! - removes trailing commas before `}` / `]`
//! - drops control characters inside strings, and outside strings keeps
//!   only `\t`, `\n`, `\r`
//!
//! The first balanced region that then parses wins; failing that, the first
//! balanced region; failing that, the first unterminated region; failing
//! that, `{}`. The result is best effort and may still not parse.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::IgnoredAny;

/// Returned when there is nothing to recover.
pub const EMPTY_OBJECT: &str = "{}";

/// Opening brackets tried before giving up on a response.
const MAX_CANDIDATES: usize = 64;

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z0-9_+.-]*").expect("fence regex is valid"));

enum Region {
    /// Cleaned text and the number of input bytes it spans.
    Balanced(String, usize),
    /// Input ended before the region closed.
    Unterminated(String),
    /// A closer did not match its opener.
    Mismatched,
}

/// Clean a raw response. `None`, empty and whitespace-only input give `{}`.
pub fn clean_json_response<'a>(text: impl Into<Option<&'a str>>) -> String {
    let Some(text) = text.into() else {
        return EMPTY_OBJECT.to_string();
    };
    if text.trim().is_empty() {
        return EMPTY_OBJECT.to_string();
    }

    let mut first_balanced: Option<String> = None;
    let mut first_unterminated: Option<String> = None;
    let mut pos = 0;
    let mut tried = 0;

    while tried < MAX_CANDIDATES {
        let Some(offset) = text[pos..].find(['{', '[']) else {
            break;
        };
        let start = pos + offset;
        tried += 1;

        match scan_region(&text[start..]) {
            Region::Balanced(cleaned, consumed) => {
                if serde_json::from_str::<IgnoredAny>(&cleaned).is_ok() {
                    return cleaned;
                }
                tracing::debug!(start, "balanced region does not parse, trying the next one");
                first_balanced.get_or_insert(cleaned);
                pos = start + consumed;
            }
            Region::Unterminated(cleaned) => {
                first_unterminated.get_or_insert(cleaned);
                pos = start + 1;
            }
            Region::Mismatched => pos = start + 1,
        }
    }

    first_balanced
        .or(first_unterminated)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| EMPTY_OBJECT.to_string())
}

/// Scan from an opening bracket at the start of `input`.
fn scan_region(input: &str) -> Region {
    let mut out = String::with_capacity(input.len());
    let mut closers: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut chars = input.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if in_string {
            if escaped {
                escaped = false;
                if c < '\u{20}' {
                    // A dangling escape would swallow the next character.
                    out.pop();
                } else {
                    out.push(c);
                }
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                c if c < '\u{20}' => {}
                c => out.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                while chars.next_if(|&(_, n)| n != '\n').is_some() {}
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut prev = '\0';
                for (_, n) in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
            }
            '`' => match FENCE.find(&input[idx..]) {
                Some(fence) => {
                    let end = idx + fence.end();
                    while chars.next_if(|&(i, _)| i < end).is_some() {}
                }
                None => out.push(c),
            },
            '{' => {
                closers.push('}');
                out.push(c);
            }
            '[' => {
                closers.push(']');
                out.push(c);
            }
            '}' | ']' => {
                if closers.pop() != Some(c) {
                    return Region::Mismatched;
                }
                drop_trailing_comma(&mut out);
                out.push(c);
                if closers.is_empty() {
                    return Region::Balanced(out, idx + c.len_utf8());
                }
            }
            c if c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }

    Region::Unterminated(out)
}

fn drop_trailing_comma(out: &mut String) {
    let end = out.trim_end().len();
    if out[..end].ends_with(',') {
        out.truncate(end - 1);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
