//! Message content resolution.
//!
//! A WhatsApp envelope can wrap its real payload in several layers: transport
//! wrappers (ephemeral, device-sent, edited), a view-once extension, a
//! protocol message carrying another message, and finally the `message`
//! mapping itself. [`ContentResolver`] peels those layers in a fixed order and
//! hands back the innermost payload.

use serde_json::Value;
use tracing::{debug, trace};

use crate::extract::{BaseContentExtractor, TransportExtractor};

/// Protocol-message `type` whose payload is itself a wrapped content message.
///
/// Taken verbatim from the transport's wire format.
pub const WRAPPED_CONTENT_PROTOCOL_TYPE: i64 = 14;

/// Key the transport uses for its sender-key distribution side channel.
/// It looks like a content key but never carries the payload.
pub const SENDER_KEY_DISTRIBUTION: &str = "senderKeyDistributionMessage";

const VIEW_ONCE_V2_EXTENSION: &str = "viewOnceMessageV2Extension";
const PROTOCOL_MESSAGE: &str = "protocolMessage";
const MESSAGE: &str = "message";

/// Resolves envelopes into their innermost payload.
#[derive(Debug, Clone)]
pub struct ContentResolver<E = TransportExtractor> {
    extractor: E,
}

impl ContentResolver<TransportExtractor> {
    /// Resolver backed by the transport's own wrapper normalization.
    pub fn transport() -> Self {
        Self::new(TransportExtractor)
    }
}

impl Default for ContentResolver<TransportExtractor> {
    fn default() -> Self {
        Self::transport()
    }
}

impl<E: BaseContentExtractor> ContentResolver<E> {
    pub fn new(extractor: E) -> Self {
        Self { extractor }
    }

    /// Return the innermost addressable payload of `envelope`, or `None`.
    ///
    /// Never fails: missing or malformed layers collapse to `None`.
    pub fn resolve(&self, envelope: Option<&Value>) -> Option<Value> {
        let envelope = envelope.filter(|e| !is_empty(e))?;
        let mut content = self.extractor.extract(envelope)?;

        if let Some(extension) = present(&content, VIEW_ONCE_V2_EXTENSION) {
            trace!("unwrapping view-once v2 extension");
            content = extension.get(MESSAGE)?.clone();
        }

        if let Some(protocol) = present(&content, PROTOCOL_MESSAGE).filter(|p| carries_content(p)) {
            let key = content_type_key(Some(protocol))?;
            trace!(key, "unwrapping protocol message");
            content = protocol.get(key)?.clone();
        }

        if let Some(message) = present(&content, MESSAGE) {
            let key = content_type_key(Some(message))?;
            trace!(key, "unwrapping inner message");
            content = message.get(key)?.clone();
        }

        if content.is_null() {
            debug!("envelope resolved to null content");
            return None;
        }
        Some(content)
    }
}

/// Resolve `envelope` with the transport extractor.
pub fn resolve_content(envelope: Option<&Value>) -> Option<Value> {
    ContentResolver::transport().resolve(envelope)
}

/// First key of `content` that names a message variant, in the mapping's
/// own key order.
///
/// Returns `None` for absent, empty or non-object input, and when no key
/// qualifies.
pub fn content_type_key(content: Option<&Value>) -> Option<&str> {
    content?
        .as_object()?
        .keys()
        .map(String::as_str)
        .find(|key| is_content_type_key(key))
}

/// Whether `key` looks like a message-variant key.
pub fn is_content_type_key(key: &str) -> bool {
    (key == "conversation" || key.ends_with("Message") || key.contains("V2") || key.contains("V3"))
        && key != SENDER_KEY_DISTRIBUTION
}

fn carries_content(protocol: &Value) -> bool {
    protocol
        .get("type")
        .and_then(Value::as_f64)
        .is_some_and(|t| t == WRAPPED_CONTENT_PROTOCOL_TYPE as f64)
}

/// Field lookup with the presence rules of the transport's object model:
/// `null`, `false`, `0` and `""` count as missing.
pub(crate) fn present<'a>(content: &'a Value, key: &str) -> Option<&'a Value> {
    content.get(key).filter(|v| is_truthy(v))
}

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::PassthroughExtractor;
    use serde_json::json;

    fn resolve(envelope: Value) -> Option<Value> {
        ContentResolver::transport().resolve(Some(&envelope))
    }

    #[test]
    fn none_resolves_to_none() {
        assert_eq!(ContentResolver::transport().resolve(None), None);
        assert_eq!(ContentResolver::transport().resolve(Some(&Value::Null)), None);
        assert_eq!(resolve(json!({})), None);
    }

    #[test]
    fn plain_mapping_is_returned_unchanged() {
        let envelope = json!({ "conversation": "hello", "messageContextInfo": { "deviceListMetadata": {} } });
        assert_eq!(resolve(envelope.clone()), Some(envelope));
    }

    #[test]
    fn unwraps_view_once_extension() {
        let envelope = json!({ "viewOnceMessageV2Extension": { "message": { "conversation": "hi" } } });
        assert_eq!(resolve(envelope.clone()), Some(json!({ "conversation": "hi" })));

        let passthrough = ContentResolver::new(PassthroughExtractor);
        assert_eq!(passthrough.resolve(Some(&envelope)), Some(json!({ "conversation": "hi" })));
    }

    #[test]
    fn view_once_extension_without_message_is_absent() {
        let passthrough = ContentResolver::new(PassthroughExtractor);
        let envelope = json!({ "viewOnceMessageV2Extension": { "other": 1 } });
        assert_eq!(passthrough.resolve(Some(&envelope)), None);
    }

    #[test]
    fn protocol_message_type_14_is_unwrapped() {
        let envelope = json!({
            "protocolMessage": {
                "type": 14,
                "revokeMessage": { "id": "ABC123" }
            }
        });
        assert_eq!(resolve(envelope), Some(json!({ "id": "ABC123" })));
    }

    #[test]
    fn protocol_message_other_type_falls_through() {
        let envelope = json!({
            "protocolMessage": {
                "type": 0,
                "revokeMessage": { "id": "ABC123" }
            }
        });
        assert_eq!(resolve(envelope.clone()), Some(envelope));
    }

    #[test]
    fn protocol_message_other_type_reaches_generic_unwrap() {
        let envelope = json!({
            "protocolMessage": {
                "type": 0,
                "revokeMessage": { "id": "ABC123" }
            },
            "message": { "conversation": "x" }
        });
        assert_eq!(resolve(envelope), Some(json!("x")));
    }

    #[test]
    fn protocol_message_string_type_is_not_unwrapped() {
        let envelope = json!({ "protocolMessage": { "type": "14", "editedMessage": {} } });
        assert_eq!(resolve(envelope.clone()), Some(envelope));
    }

    #[test]
    fn protocol_message_without_content_key_is_absent() {
        let envelope = json!({ "protocolMessage": { "type": 14, "key": { "id": "x" } } });
        assert_eq!(resolve(envelope), None);
    }

    #[test]
    fn generic_message_is_unwrapped() {
        let envelope = json!({
            "message": {
                "senderKeyDistributionMessage": { "groupId": "g" },
                "extendedTextMessage": { "text": "yo" }
            }
        });
        assert_eq!(resolve(envelope), Some(json!({ "text": "yo" })));
    }

    #[test]
    fn protocol_then_generic_unwrap_chain() {
        let envelope = json!({
            "protocolMessage": {
                "type": 14,
                "editedMessage": {
                    "message": { "conversation": "edited text" }
                }
            }
        });
        assert_eq!(resolve(envelope), Some(json!("edited text")));
    }

    #[test]
    fn null_payload_collapses_to_none() {
        let envelope = json!({ "message": { "conversation": null } });
        assert_eq!(resolve(envelope), None);
    }

    #[test]
    fn null_message_field_is_treated_as_absent() {
        let envelope = json!({ "message": null, "conversation": "kept" });
        assert_eq!(resolve(envelope.clone()), Some(envelope));
    }

    #[test]
    fn content_type_key_skips_sender_key_distribution() {
        let content = json!({ "senderKeyDistributionMessage": {}, "conversation": "x" });
        assert_eq!(content_type_key(Some(&content)), Some("conversation"));
    }

    #[test]
    fn content_type_key_empty_and_none() {
        assert_eq!(content_type_key(Some(&json!({}))), None);
        assert_eq!(content_type_key(None), None);
        assert_eq!(content_type_key(Some(&json!("conversation"))), None);
    }

    #[test]
    fn content_type_key_keeps_insertion_order() {
        let content = json!({ "imageMessage": {}, "videoMessage": {} });
        assert_eq!(content_type_key(Some(&content)), Some("imageMessage"));

        let reversed = json!({ "videoMessage": {}, "imageMessage": {} });
        assert_eq!(content_type_key(Some(&reversed)), Some("videoMessage"));
    }

    #[test]
    fn content_type_key_matches_versioned_keys() {
        assert_eq!(content_type_key(Some(&json!({ "type": 1, "pollCreationV3": {} }))), Some("pollCreationV3"));
        assert_eq!(content_type_key(Some(&json!({ "key": {}, "viewOnceV2": {} }))), Some("viewOnceV2"));
        assert_eq!(content_type_key(Some(&json!({ "key": {}, "timestamp": 1 }))), None);
    }
}
