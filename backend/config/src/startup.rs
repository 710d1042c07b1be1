//! Startup gate: the bot only boots against a readable `config.svy` with a
//! supported render mode and config version.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, error, info};

use crate::env::resolve_env_vars;
use crate::error::ConfigError;

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "config.svy";

/// Env var that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "WAKIT_CONFIG";

/// Render modes the bot can run in.
pub const SUPPORTED_RENDER_MODES: &[&str] = &["multidevice"];

/// Config versions this build understands.
pub const SUPPORTED_VERSIONS: &[&str] = &["SYV-A0324F55-DD88-4E5A-8DD7-516CC1CDA6E3"];

/// Settings read from `config.svy`.
///
/// `render` and `V` are kept as raw JSON so a value of the wrong type is
/// reported by [`validate`] as unsupported instead of failing the parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartupConfig {
    /// Connection mode of the WhatsApp session.
    #[serde(default)]
    pub render: Value,

    #[serde(rename = "V", default)]
    pub version: Value,

    /// Everything else in the file, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Resolve the config file path.
/// Priority: `WAKIT_CONFIG` env > `./config.svy`
pub fn config_file_path() -> PathBuf {
    resolve_config_path(std::env::var(CONFIG_PATH_ENV).ok())
}

fn resolve_config_path(override_path: Option<String>) -> PathBuf {
    match override_path {
        Some(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from(CONFIG_FILE_NAME),
    }
}

/// Read and parse the config, substituting `${VAR}` references.
pub async fn load_startup_config(path: &Path) -> Result<StartupConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let raw = fs::read_to_string(path).await.map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_err = |source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let value: Value = serde_json::from_str(&raw).map_err(parse_err)?;
    let value = resolve_env_vars(&value)?;
    let config = serde_json::from_value(value).map_err(parse_err)?;

    debug!(path = %path.display(), "Loaded startup config");
    Ok(config)
}

impl StartupConfig {
    pub fn render_mode(&self) -> Option<&str> {
        self.render.as_str()
    }

    pub fn version_id(&self) -> Option<&str> {
        self.version.as_str()
    }
}

/// Check the render mode against [`SUPPORTED_RENDER_MODES`], then the
/// version against [`SUPPORTED_VERSIONS`].
pub fn validate(config: &StartupConfig) -> Result<(), ConfigError> {
    if !config.render_mode().is_some_and(|r| SUPPORTED_RENDER_MODES.contains(&r)) {
        return Err(ConfigError::InvalidRender {
            render: display_value(&config.render),
            supported: SUPPORTED_RENDER_MODES,
        });
    }
    if !config.version_id().is_some_and(|v| SUPPORTED_VERSIONS.contains(&v)) {
        return Err(ConfigError::InvalidVersion {
            version: display_value(&config.version),
        });
    }
    Ok(())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Load and validate the config at `path`.
///
/// Callers decide whether a failure is fatal; nothing here exits the process.
pub async fn check_startup(path: &Path) -> Result<StartupConfig, ConfigError> {
    let result = load_startup_config(path).await.and_then(|config| {
        validate(&config)?;
        Ok(config)
    });

    match &result {
        Ok(config) => info!(
            path = %path.display(),
            render = config.render_mode().unwrap_or_default(),
            "Startup config accepted"
        ),
        Err(e) => error!(path = %path.display(), "Startup check failed: {}", e),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn write(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, body).await.unwrap();
        path
    }

    #[test]
    fn env_override_wins() {
        assert_eq!(resolve_config_path(Some("/etc/bot/config.svy".into())), PathBuf::from("/etc/bot/config.svy"));
        assert_eq!(resolve_config_path(Some("  ".into())), PathBuf::from(CONFIG_FILE_NAME));
        assert_eq!(resolve_config_path(None), PathBuf::from(CONFIG_FILE_NAME));
    }

    const V1: &str = "SYV-A0324F55-DD88-4E5A-8DD7-516CC1CDA6E3";

    #[tokio::test]
    async fn accepts_multidevice() {
        let dir = TempDir::new().unwrap();
        let body = format!(r#"{{ "render": "multidevice", "V": "{V1}", "owner": ["628123"] }}"#);
        let path = write(&dir, &body).await;

        let config = check_startup(&path).await.unwrap();
        assert_eq!(config.render_mode(), Some("multidevice"));
        assert_eq!(config.version_id(), Some(V1));
        assert_eq!(config.extra["owner"][0], "628123");
        assert!(!config.extra.contains_key("V"));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = check_startup(&dir.path().join(CONFIG_FILE_NAME)).await.unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[tokio::test]
    async fn rejects_unknown_render_mode() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, r#"{ "render": "legacy" }"#).await;

        let err = check_startup(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRender { ref render, .. } if render == "legacy"));
        assert_eq!(err.to_string(), "invalid render mode \"legacy\" (supported: multidevice)");
    }

    #[tokio::test]
    async fn non_string_render_is_invalid_not_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, &format!(r#"{{ "render": 1, "V": "{V1}" }}"#)).await;

        let err = check_startup(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRender { ref render, .. } if render == "1"));
    }

    #[tokio::test]
    async fn rejects_unknown_version() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, r#"{ "render": "multidevice", "V": "SYV-OLD" }"#).await;

        let err = check_startup(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVersion { ref version } if version == "SYV-OLD"));
        assert_eq!(err.to_string(), "invalid config version \"SYV-OLD\"");
    }

    #[tokio::test]
    async fn missing_version_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, r#"{ "render": "multidevice" }"#).await;
        assert!(matches!(check_startup(&path).await, Err(ConfigError::InvalidVersion { .. })));
    }

    #[tokio::test]
    async fn render_is_checked_before_version() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, r#"{ "render": "legacy", "V": "SYV-OLD" }"#).await;
        assert!(matches!(check_startup(&path).await, Err(ConfigError::InvalidRender { .. })));
    }

    #[tokio::test]
    async fn missing_render_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "{}").await;
        assert!(matches!(check_startup(&path).await, Err(ConfigError::InvalidRender { .. })));
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "render = multidevice").await;
        assert!(matches!(check_startup(&path).await, Err(ConfigError::Parse { .. })));
    }
}
