//! Lexical helpers over raw SOQL text.
//!
//! None of these parse SOQL. They split and search the text the way the
//! query operations need: whitespace words for clause detection, a
//! punctuation-aware split for primary-key detection, and a word-bounded
//! search for the `WHERE` keyword.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::LazyLock;

use regex_lite::Regex;

static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*?\)").expect("parenthesized pattern is valid"));

static WHERE_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bwhere\b").expect("where pattern is valid"));

/// Lowercase the query and split it on whitespace.
pub fn words(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

/// Remove every parenthesized group, shortest match first.
///
/// Nested groups are not balanced: `(a(b)c)` leaves `c)` behind.
pub fn strip_parenthesized(query: &str) -> Cow<'_, str> {
    PARENTHESIZED.replace_all(query, "")
}

/// Byte range of the first standalone `where` keyword, any case.
pub fn find_where_keyword(query: &str) -> Option<Range<usize>> {
    WHERE_KEYWORD.find(query).map(|m| m.range())
}

/// Drop every character that is not a letter, digit or underscore.
pub fn strip_non_word(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Split lowercased query text into identifier-like tokens.
///
/// Whitespace always separates tokens. Commas and periods separate tokens
/// too, unless they sit between two digits (`1,000` or `2.5` stay whole).
/// Empty tokens are dropped.
pub fn key_tokens(query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    let chars: Vec<char> = lowered.chars().collect();

    let mut tokens = Vec::new();
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        let separates = if ch.is_whitespace() {
            true
        } else if ch == ',' || ch == '.' {
            let digit_before = i > 0 && chars[i - 1].is_ascii_digit();
            let digit_after = chars.get(i + 1).is_some_and(|c| c.is_ascii_digit());
            !(digit_before && digit_after)
        } else {
            false
        };

        if separates {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
