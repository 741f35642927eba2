//! Text normalization
//!
//! Canonical form used by every comparison: lowercase ASCII, only
//! alphanumerics separated by single spaces.

use unicode_normalization::UnicodeNormalization;

/// Normalize descriptive text for comparison.
///
/// Steps, in order:
/// 1. lowercase
/// 2. canonical decomposition (NFD), dropping every non-ASCII code point,
///    which removes combining accents and keeps their base letters
/// 3. drop anything that is not `[a-z0-9]` or whitespace
/// 4. collapse whitespace runs into one space and trim
///
/// Total and idempotent.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;

    for ch in lowered.nfd().filter(char::is_ascii) {
        if is_separator(ch) {
            pending_space = true;
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        }
    }

    out
}

// ASCII whitespace including vertical tab and the information separators
// U+001C..=U+001F, which regex `\s` also treats as spaces
#[inline]
fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '\x1c'..='\x1f')
}

/// Absent text normalizes to the empty string
#[inline]
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize_text).unwrap_or_default()
}
