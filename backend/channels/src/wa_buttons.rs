//! WhatsApp Interactive Buttons
//!
//! Builds the native-flow carousel payload WhatsApp renders as a card with
//! tappable buttons, and reads the button id back out of the reply.

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use uuid::Uuid;
use wakit_core::{content_type_key, ContentResolver};
use wakit_logging::redact_sensitive_data;

use crate::error::ChannelError;
use crate::{MessageRelay, RelayOptions};

const DEFAULT_DISPLAY_TEXT: &str = "test";
const DEFAULT_REPLY_ID: &str = "test";
const DEFAULT_URL: &str = "https://google.com";

/// One native-flow button as the transport expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeFlowButton {
    pub name: String,
    /// The button parameters, JSON-encoded into a string.
    pub button_params_json: String,
}

/// A row of a `single_select` list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ListSection {
    pub title: String,
    pub rows: Vec<ListRow>,
}

/// Button kinds, with the transport name each one maps to.
#[derive(Debug, Clone)]
pub enum ButtonKind {
    /// `quick_reply`; both fields default to `"test"`.
    Reply {
        display_text: Option<String>,
        id: Option<String>,
    },
    /// `cta_url`; text defaults to `"test"`, both URLs to `https://google.com`.
    Url {
        display_text: Option<String>,
        url: Option<String>,
        merchant_url: Option<String>,
    },
    /// `cta_call`
    Call {
        display_text: Option<String>,
        id: Option<String>,
    },
    /// `address_message`
    Address {
        display_text: Option<String>,
        id: Option<String>,
    },
    /// `single_select`
    List {
        title: Option<String>,
        sections: Vec<ListSection>,
    },
}

#[derive(Serialize)]
struct TextAndId<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    display_text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
}

#[derive(Serialize)]
struct UrlParams<'a> {
    display_text: &'a str,
    url: &'a str,
    merchant_url: &'a str,
}

#[derive(Serialize)]
struct ListParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    sections: &'a [ListSection],
}

impl ButtonKind {
    /// Transport name of this button kind.
    pub fn name(&self) -> &'static str {
        match self {
            ButtonKind::Reply { .. } => "quick_reply",
            ButtonKind::Url { .. } => "cta_url",
            ButtonKind::Call { .. } => "cta_call",
            ButtonKind::Address { .. } => "address_message",
            ButtonKind::List { .. } => "single_select",
        }
    }

    fn params_json(&self) -> Result<String, serde_json::Error> {
        match self {
            ButtonKind::Reply { display_text, id } => serde_json::to_string(&TextAndId {
                display_text: Some(display_text.as_deref().unwrap_or(DEFAULT_DISPLAY_TEXT)),
                id: Some(id.as_deref().unwrap_or(DEFAULT_REPLY_ID)),
            }),
            ButtonKind::Url { display_text, url, merchant_url } => serde_json::to_string(&UrlParams {
                display_text: display_text.as_deref().unwrap_or(DEFAULT_DISPLAY_TEXT),
                url: url.as_deref().unwrap_or(DEFAULT_URL),
                merchant_url: merchant_url.as_deref().unwrap_or(DEFAULT_URL),
            }),
            ButtonKind::Call { display_text, id } | ButtonKind::Address { display_text, id } => {
                serde_json::to_string(&TextAndId {
                    display_text: display_text.as_deref(),
                    id: id.as_deref(),
                })
            }
            ButtonKind::List { title, sections } => serde_json::to_string(&ListParams {
                title: title.as_deref(),
                sections,
            }),
        }
    }
}

/// Builder for a single-card interactive carousel message.
#[derive(Debug, Clone, Default)]
pub struct ButtonMessage {
    caption: String,
    text: String,
    image: Option<String>,
    buttons: Vec<NativeFlowButton>,
}

impl ButtonMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Card title.
    pub fn set_caption(&mut self, caption: impl Into<String>) -> &mut Self {
        self.caption = caption.into();
        self
    }

    /// Message body text.
    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = text.into();
        self
    }

    /// Card header image, fetched and uploaded by the relay on send.
    pub fn set_image(&mut self, url: impl Into<String>) -> &mut Self {
        self.image = Some(url.into());
        self
    }

    pub fn add_button(&mut self, kind: ButtonKind) -> Result<&mut Self, ChannelError> {
        let button = NativeFlowButton {
            name: kind.name().to_string(),
            button_params_json: kind.params_json()?,
        };
        debug!(name = %button.name, "Added interactive button");
        self.buttons.push(button);
        Ok(self)
    }

    pub fn buttons(&self) -> &[NativeFlowButton] {
        &self.buttons
    }

    /// Assemble the message content.
    ///
    /// `media_header` holds the fields returned by
    /// [`MessageRelay::prepare_image`]; it is merged into the card header.
    pub fn build(&self, media_header: Map<String, Value>) -> Value {
        let mut header = media_header;
        header.insert("title".into(), json!(self.caption));
        header.insert("subtitle".into(), json!(""));
        header.insert("hasMediaAttachment".into(), json!(false));

        json!({
            "viewOnceMessage": {
                "message": {
                    "interactiveMessage": {
                        "body": { "text": self.text },
                        "carouselMessage": {
                            "cards": [{
                                "header": header,
                                "body": { "text": null },
                                "nativeFlowMessage": { "buttons": self.buttons }
                            }],
                            "messageVersion": 1
                        }
                    }
                }
            }
        })
    }

    /// Prepare the header media, build the payload, and relay it to `jid`.
    ///
    /// Returns the id the message was sent under.
    pub async fn send(
        &self,
        relay: &dyn MessageRelay,
        jid: &str,
        quoted: Option<Value>,
    ) -> Result<String, ChannelError> {
        let media_header = match &self.image {
            Some(url) => relay.prepare_image(url).await.map_err(ChannelError::Relay)?,
            None => Map::new(),
        };

        let message_id = generate_message_id();
        let content = self.build(media_header);
        info!(jid = %redact_sensitive_data(jid), message_id = %message_id, buttons = self.buttons.len(), "Relaying interactive message");

        relay
            .relay(jid, content, RelayOptions { message_id: message_id.clone(), quoted })
            .await
            .map_err(ChannelError::Relay)?;
        Ok(message_id)
    }
}

/// Message id in the transport's `3EB0…` format.
pub fn generate_message_id() -> String {
    let hex = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("3EB0{}", &hex[..16])
}

/// Id of the button or list row the sender picked, if `envelope` is a reply
/// to an interactive message.
pub fn selected_button_id(envelope: &Value) -> Option<String> {
    let content = ContentResolver::transport().resolve(Some(envelope))?;
    let key = content_type_key(Some(&content))?;
    let reply = &content[key];

    let id = match key {
        "interactiveResponseMessage" => {
            let params = reply["nativeFlowResponseMessage"]["paramsJson"].as_str()?;
            let params: Value = serde_json::from_str(params).ok()?;
            params["id"].as_str()?.to_string()
        }
        "buttonsResponseMessage" => reply["selectedButtonId"].as_str()?.to_string(),
        "listResponseMessage" => reply["singleSelectReply"]["selectedRowId"].as_str()?.to_string(),
        "templateButtonReplyMessage" => reply["selectedId"].as_str()?.to_string(),
        _ => return None,
    };
    Some(id)
}
