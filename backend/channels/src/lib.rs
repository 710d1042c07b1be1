use async_trait::async_trait;
use serde_json::{Map, Value};

pub mod error;
pub mod wa_buttons;

pub use error::ChannelError;
pub use wa_buttons::{
    generate_message_id, selected_button_id, ButtonKind, ButtonMessage, ListRow, ListSection,
    NativeFlowButton,
};

/// Delivery options passed alongside relayed content.
#[derive(Debug, Clone)]
pub struct RelayOptions {
    pub message_id: String,
    /// The envelope being replied to, if any.
    pub quoted: Option<Value>,
}

/// The WhatsApp socket, as seen by message builders.
///
/// Media upload and message encoding live in the transport; builders only
/// hand it plain JSON content.
#[async_trait]
pub trait MessageRelay: Send + Sync {
    /// Fetch and upload an image, returning the header fields that reference it
    /// (e.g. `{ "imageMessage": { ... } }`).
    async fn prepare_image(&self, url: &str) -> anyhow::Result<Map<String, Value>>;

    /// Send `content` to `jid`.
    async fn relay(&self, jid: &str, content: Value, options: RelayOptions) -> anyhow::Result<()>;
}
