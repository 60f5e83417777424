//! Name normalization helpers shared by source implementations.

use crate::types::CountryName;

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_inline_whitespace<T: AsRef<str>>(text: T) -> String {
    let mut normalized = String::with_capacity(text.as_ref().len());
    let mut seen_space = false;
    for ch in text.as_ref().chars() {
        if ch.is_whitespace() {
            if !seen_space {
                normalized.push(' ');
                seen_space = true;
            }
        } else {
            normalized.push(ch);
            seen_space = false;
        }
    }
    normalized.trim().to_string()
}

/// Normalize a country name, returning `None` when nothing but whitespace remains.
pub fn normalize_name(raw: Option<&str>) -> Option<CountryName> {
    let normalized = normalize_inline_whitespace(raw?);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
