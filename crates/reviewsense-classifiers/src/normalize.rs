//! Text normalization shared by training and inference

use regex::Regex;
use std::sync::OnceLock;

const LINE_BREAK: &str = "<br />";

fn digits() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"\d+").expect("digit pattern is valid"))
}

fn punctuation() -> &'static Regex {
    static PUNCTUATION: OnceLock<Regex> = OnceLock::new();
    PUNCTUATION.get_or_init(|| Regex::new(r"[^\w\s]").expect("punctuation pattern is valid"))
}

/// Clean a raw review.
///
/// Replaces HTML line breaks with spaces, removes digits, removes every
/// character that is neither a word character nor whitespace, then
/// lowercases. Training and serving both go through this function.
pub fn normalize(text: &str) -> String {
    let text = text.replace(LINE_BREAK, " ");
    let text = digits().replace_all(&text, "");
    let text = punctuation().replace_all(&text, "");
    text.to_lowercase()
}
