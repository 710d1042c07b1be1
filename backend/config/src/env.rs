//! `${VAR_NAME}` substitution in config string values.
//!
//! Only uppercase `[A-Z_][A-Z0-9_]*` names are matched.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::error::ConfigError;

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Substitute `${VAR}` references from the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value, ConfigError> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute `${VAR}` references from `env`.
///
/// A reference to an unset or empty variable is an error.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value, ConfigError> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value, ConfigError> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String, ConfigError> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut missing = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| match env.get(&caps[1]) {
        Some(val) if !val.is_empty() => val.clone(),
        _ => {
            missing.get_or_insert_with(|| caps[1].to_string());
            String::new()
        }
    });

    match missing {
        Some(var_name) => Err(ConfigError::MissingEnvVar {
            var_name,
            config_path: path.to_string(),
        }),
        None => Ok(substituted.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_nested_vars() {
        let v = json!({ "owner": ["${OWNER_NUMBER}"], "bot": { "name": "${BOT_NAME} v2" } });
        let result = resolve_env_vars_with(&v, &env(&[("OWNER_NUMBER", "628123"), ("BOT_NAME", "svy")])).unwrap();
        assert_eq!(result["owner"][0], "628123");
        assert_eq!(result["bot"]["name"], "svy v2");
    }

    #[test]
    fn missing_var_reports_path() {
        let v = json!({ "bot": { "name": "${BOT_NAME}" } });
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err();
        match err {
            ConfigError::MissingEnvVar { var_name, config_path } => {
                assert_eq!(var_name, "BOT_NAME");
                assert_eq!(config_path, "bot.name");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn plain_values_pass_through() {
        let v = json!({ "render": "multidevice", "port": 3000, "lowercase": "${not_a_var}" });
        assert_eq!(resolve_env_vars_with(&v, &HashMap::new()).unwrap(), v);
    }
}
