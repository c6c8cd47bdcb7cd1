//! Utility functions for response parsing
//!
//! The token-exchange endpoint answers with a flat newline-delimited
//! `Key=Value` text block rather than the binary envelope; this module owns
//! that parser plus the best-effort install-count label parser used by the
//! catalog model builders.

use std::collections::HashMap;

/// Parse a flat `Key=Value` response body into a map.
///
/// Lines are split on `\n`/`\r`; each line is split on the first `=` only,
/// so values may themselves contain `=`. Lines without a `=` are ignored.
pub fn parse_key_values(body: &[u8]) -> HashMap<String, String> {
    let text = String::from_utf8_lossy(body);
    let mut map = HashMap::new();
    for line in text.split(['\n', '\r']) {
        if let Some((key, value)) = line.split_once('=') {
            if !key.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Best-effort parse of a human-readable count label such as
/// `"1,000,000+ downloads"` into a number.
///
/// The label format is locale-dependent and not part of any protocol
/// contract; callers must treat the result as informational only. Returns 0
/// when no digits are present.
pub fn parse_count_label(label: &str) -> u64 {
    let Ok(non_digits) = regex::Regex::new(r"[^0-9]") else {
        return 0;
    };
    non_digits
        .replace_all(label, "")
        .parse::<u64>()
        .unwrap_or(0)
}
