//! `wakit-config`: startup configuration for wakit bots.
//!
//! Provides:
//! - `config.svy` loading with `${ENV_VAR}` substitution
//! - Render-mode validation returning an error instead of exiting

pub mod env;
pub mod error;
pub mod startup;

pub use env::{resolve_env_vars, resolve_env_vars_with};
pub use error::ConfigError;
pub use startup::{
    check_startup, config_file_path, load_startup_config, validate, StartupConfig,
    CONFIG_FILE_NAME, CONFIG_PATH_ENV, SUPPORTED_RENDER_MODES, SUPPORTED_VERSIONS,
};
