//! Escaping user text for use inside patterns.

use regex::Regex;

use crate::error::CoreError;

const PATTERN_SPECIALS: &[char] = &[
    '.', '*', '=', '+', ':', '-', '?', '^', '$', '{', '}', '(', ')', '|', '[', ']', '\\',
];

/// Prefix every pattern metacharacter and every whitespace character in
/// `text` with a backslash. All other characters pass through in order.
///
/// `regex` only accepts a bare backslash before ASCII characters, so
/// non-ASCII whitespace is written as a `\x{..}` escape instead. The result
/// always compiles and matches `text` literally.
pub fn escape_for_pattern(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if !needs_escape(c) {
            out.push(c);
        } else if c.is_ascii() {
            out.push('\\');
            out.push(c);
        } else {
            out.push_str(&format!("\\x{{{:x}}}", c as u32));
        }
    }
    out
}

/// Compile `text` into a regex that matches exactly `text` and nothing else.
pub fn literal_pattern(text: &str) -> Result<Regex, CoreError> {
    Ok(Regex::new(&format!("^{}$", escape_for_pattern(text)))?)
}

fn needs_escape(c: char) -> bool {
    PATTERN_SPECIALS.contains(&c) || c.is_whitespace() || c == '\u{feff}'
}
