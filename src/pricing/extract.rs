//! Price token extraction.

use std::sync::OnceLock;

use regex::Regex;

/// A dollar sign, one or more digits, optionally a decimal point with exactly
/// two digits. Unanchored: it matches anywhere in the text.
pub const PRICE_PATTERN: &str = r"\$\d+(\.\d{2})?";

fn price_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PRICE_PATTERN).expect("PRICE_PATTERN is a valid regex"))
}

/// First price token in `text`, verbatim, dollar sign included.
///
/// No plausibility check is applied; `$999999999` is returned as-is.
pub fn extract_price(text: &str) -> Option<&str> {
    price_regex().find(text).map(|m| m.as_str())
}
