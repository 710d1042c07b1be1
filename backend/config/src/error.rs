use std::path::PathBuf;

use thiserror::Error;

/// Reasons the bot refuses to start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing env var \"{var_name}\" referenced at config path: {config_path}")]
    MissingEnvVar { var_name: String, config_path: String },

    #[error("invalid render mode \"{render}\" (supported: {})", supported.join(", "))]
    InvalidRender {
        render: String,
        supported: &'static [&'static str],
    },

    #[error("invalid config version \"{version}\"")]
    InvalidVersion { version: String },
}
