//! `wakit-core`: message-content helpers for WhatsApp bots.
//!
//! Provides:
//! - [`ContentResolver`]: peel transport, view-once, and protocol wrappers off an envelope
//! - [`content_type_key`]: pick the message-variant key of a message mapping
//! - [`escape_for_pattern`] / [`literal_pattern`]: safe literal matching of user text

pub mod content;
pub mod error;
pub mod escape;
pub mod extract;

pub use content::{
    content_type_key, is_content_type_key, resolve_content, ContentResolver,
    SENDER_KEY_DISTRIBUTION, WRAPPED_CONTENT_PROTOCOL_TYPE,
};
pub use error::CoreError;
pub use escape::{escape_for_pattern, literal_pattern};
pub use extract::{BaseContentExtractor, PassthroughExtractor, TransportExtractor};
