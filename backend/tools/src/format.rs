//! Text and number formatting helpers for bot replies.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)https?://[^\s]+").unwrap());

const SI_UNITS: [&str; 8] = ["kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];
const BINARY_UNITS: [&str; 8] = ["KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB", "YiB"];

/// First `http(s)://` URL in `text`.
pub fn get_url(text: &str) -> Option<&str> {
    URL_RE.find(text).map(|m| m.as_str())
}

/// Human-readable byte size.
///
/// `si` picks 1000-based units (`kB`, `MB`, …) over 1024-based ones
/// (`KiB`, `MiB`, …); `dp` is the number of decimals.
pub fn format_size(bytes: f64, si: bool, dp: usize) -> String {
    let thresh = if si { 1000.0 } else { 1024.0 };
    if bytes.abs() < thresh {
        return format!("{} B", bytes);
    }

    let units = if si { &SI_UNITS } else { &BINARY_UNITS };
    let r = 10f64.powi(dp as i32);
    let mut value = bytes / thresh;
    let mut u = 0;
    while (value.abs() * r).round() / r >= thresh && u < units.len() - 1 {
        value /= thresh;
        u += 1;
    }

    format!("{:.*} {}", dp, value, units[u])
}

/// Spell out a duration, e.g. `3665` → `"1 hour, 1 minute, 5 seconds"`.
///
/// Zero components are left out; zero seconds yields an empty string.
pub fn runtime(seconds: u64) -> String {
    let parts = [
        (seconds / 86_400, "day"),
        (seconds % 86_400 / 3_600, "hour"),
        (seconds % 3_600 / 60, "minute"),
        (seconds % 60, "second"),
    ];

    parts
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| {
            if *n == 1 {
                format!("{} {}", n, unit)
            } else {
                format!("{} {}s", n, unit)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Upper-case the first letter of every space-separated word.
pub fn to_upper(text: &str) -> String {
    map_word_heads(text, |c| c.to_uppercase().collect())
}

/// Lower-case the first letter of every space-separated word.
pub fn to_lower(text: &str) -> String {
    map_word_heads(text, |c| c.to_lowercase().collect())
}

fn map_word_heads(text: &str, head: impl Fn(char) -> String) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => head(first) + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
