//! Structured logging for wakit.
//!
//! Sets up `tracing` output and scrubs JIDs, phone numbers, and tokens from
//! strings before they are logged.

pub mod logger;
pub mod redact;

pub use logger::{init_logger, LOG_FILE_PREFIX};
pub use redact::redact_sensitive_data;
