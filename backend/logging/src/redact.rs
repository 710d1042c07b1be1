//! Log Redaction Layer
//!
//! Scrubs WhatsApp JIDs, phone numbers, and bearer tokens from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static JID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{5,20}(?::\d+)?@(?:s\.whatsapp\.net|g\.us|lid)\b").unwrap());
static TELEPHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap());
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(sk-[a-zA-Z0-9]{32,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    // JIDs first, so the phone pattern doesn't eat their user part
    let redacted = JID_RE.replace_all(input, "[REDACTED_JID]");
    let redacted = TELEPHONE_RE.replace_all(&redacted, "[REDACTED_PHONE]");
    API_KEY_RE.replace_all(&redacted, "[REDACTED_TOKEN]").into_owned()
}
