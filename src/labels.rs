//! Human-readable rendering of raw API keys and counts.

use regex::Regex;
use std::sync::LazyLock;

static AGE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Age\s+(\d+)\s+(\d+)").expect("static regex"));
static AGE_OVER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Age\s+(\d+)\s+Over").expect("static regex"));

/// Converts a raw API key into a human-readable label.
///
/// Underscores become spaces, leading `hdb `/`total ` prefixes are stripped,
/// the remainder is title-cased, and age-bracket keys are rewritten to the
/// compact `55-59` / `85+` forms.
pub fn clean_label(key: &str) -> String {
    let mut label = key.replace('_', " ").trim().to_string();
    for prefix in ["hdb ", "total "] {
        if label.len() > prefix.len() && label.to_lowercase().starts_with(prefix) {
            label = label[prefix.len()..].to_string();
        }
    }
    let label = title_case(&label);

    if let Some(caps) = AGE_RANGE.captures(&label) {
        return format!("{}-{}", &caps[1], &caps[2]);
    }
    if let Some(caps) = AGE_OVER.captures(&label) {
        return format!("{}+", &caps[1]);
    }
    label
}

/// Title-cases a string: a letter is uppercased when it follows a
/// non-alphabetic character, lowercased otherwise. Handles hyphenated
/// names like `NORTH-EASTERN ISLANDS`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Renders a population count with thousands separators and the
/// approximation marker used throughout summaries.
pub fn format_number(n: i64) -> String {
    format!("~{}", thousands(n))
}

/// Comma-grouped rendering of an integer: `1234567` → `"1,234,567"`.
pub fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if n < 0 { format!("-{out}") } else { out }
}
