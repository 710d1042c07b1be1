use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("failed to encode button parameters: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("relay failed: {0}")]
    Relay(anyhow::Error),
}
