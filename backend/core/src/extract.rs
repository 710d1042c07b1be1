//! Base content extraction.
//!
//! The first step of content resolution strips transport-level wrapping from
//! an envelope. That behavior belongs to the messaging transport, so it sits
//! behind [`BaseContentExtractor`].

use serde_json::{Map, Value};
use tracing::trace;

use crate::content::{is_truthy, present};

/// Strips transport wrapping from an envelope.
pub trait BaseContentExtractor: Send + Sync {
    fn extract(&self, envelope: &Value) -> Option<Value>;
}

/// Returns the envelope untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughExtractor;

impl BaseContentExtractor for PassthroughExtractor {
    fn extract(&self, envelope: &Value) -> Option<Value> {
        is_truthy(envelope).then(|| envelope.clone())
    }
}

/// Wrapper keys the transport may nest a message under, checked in order.
const FUTURE_PROOF_WRAPPERS: &[&str] = &[
    "ephemeralMessage",
    "viewOnceMessage",
    "documentWithCaptionMessage",
    "viewOnceMessageV2",
    "viewOnceMessageV2Extension",
    "editedMessage",
];

const MAX_WRAPPER_DEPTH: usize = 5;

/// Media variants a template message is reduced to, in priority order.
const TEMPLATE_MEDIA_KEYS: &[&str] = &["imageMessage", "documentMessage", "videoMessage", "locationMessage"];

/// Template sub-keys under `templateMessage`, in priority order.
const TEMPLATE_VARIANTS: &[&str] = &["hydratedFourRowTemplate", "hydratedTemplate", "fourRowTemplate"];

/// Mirrors the transport's own extraction: unwrap up to five
/// future-proof wrappers, then flatten button and template messages into
/// a plain media or text message.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransportExtractor;

impl BaseContentExtractor for TransportExtractor {
    fn extract(&self, envelope: &Value) -> Option<Value> {
        let content = normalize(envelope)?;

        if let Some(buttons) = present(content, "buttonsMessage") {
            trace!("flattening buttons message");
            return Some(flatten_template(buttons));
        }

        if let Some(template) = present(content, "templateMessage") {
            for variant in TEMPLATE_VARIANTS {
                if let Some(inner) = present(template, variant) {
                    trace!(variant, "flattening template message");
                    return Some(flatten_template(inner));
                }
            }
        }

        Some(content.clone())
    }
}

fn normalize(envelope: &Value) -> Option<&Value> {
    if !is_truthy(envelope) {
        return None;
    }

    let mut content = envelope;
    for _ in 0..MAX_WRAPPER_DEPTH {
        let Some(wrapper) = FUTURE_PROOF_WRAPPERS.iter().find_map(|key| present(content, key)) else {
            break;
        };
        content = wrapper.get("message")?;
    }

    (!content.is_null()).then_some(content)
}

fn flatten_template(template: &Value) -> Value {
    for key in TEMPLATE_MEDIA_KEYS {
        if let Some(media) = present(template, key) {
            let mut map = Map::new();
            map.insert((*key).to_string(), media.clone());
            return Value::Object(map);
        }
    }

    let text = template
        .get("contentText")
        .or_else(|| template.get("hydratedContentText"))
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()));

    let mut map = Map::new();
    map.insert("conversation".to_string(), text);
    Value::Object(map)
}
