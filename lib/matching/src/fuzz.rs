//! Lexical similarity scores on a 0–100 scale
//!
//! `ratio` is the indel similarity `100 * 2*LCS / (len_a + len_b)` over
//! characters, as computed by `rapidfuzz`; `token_sort_ratio` applies it
//! after sorting whitespace separated tokens, so word order does not matter.

use rapidfuzz::fuzz;

/// Indel similarity of two strings, 0–100. Two empty strings score 100.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    100.0 * fuzz::ratio(a.chars(), b.chars())
}

/// Word-order-insensitive similarity, 0–100
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sort_tokens(a), &sort_tokens(b))
}

/// Tokens sorted and re-joined with single spaces
pub fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
