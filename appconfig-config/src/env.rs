// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env::{self, VarError};

/// Default prefix for SDK environment variables.
pub const ENV_PREFIX: &str = "APPCONFIG";

/// Reads prefixed environment variables as lower-case setting keys:
/// `APPCONFIG_COLLECTION_ID` becomes `collection_id`.
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load all matching environment variables.
    ///
    /// Variables whose name is not valid UTF-8 cannot match and are skipped.
    /// A matching variable with a non-UTF-8 value is an `EnvError`.
    pub fn load(&self) -> Result<HashMap<String, String>> {
        let mut config = HashMap::new();

        for (key, value) in env::vars_os() {
            let Some(key) = key.to_str() else {
                continue;
            };
            let Some(name) = self.strip_prefix(key) else {
                continue;
            };
            let value = value
                .into_string()
                .map_err(|raw| ConfigError::EnvError(VarError::NotUnicode(raw)))?;
            config.insert(name.to_lowercase(), value);
        }

        Ok(config)
    }

    fn strip_prefix<'a>(&self, key: &'a str) -> Option<&'a str> {
        match self.prefix {
            Some(ref prefix) => key
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix('_')),
            None => Some(key),
        }
    }

    /// Load a single variable, applying the prefix.
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.full_key(key)).map_err(ConfigError::EnvError)
    }

    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }

    fn full_key(&self, key: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(Some(ENV_PREFIX.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // std::env::set_var is unsafe and races with other tests, so these only
    // read variables; tests that set variables live in tests/.

    #[test]
    fn test_full_key() {
        assert_eq!(EnvLoader::default().full_key("collection_id"), "APPCONFIG_COLLECTION_ID");
        assert_eq!(EnvLoader::new(None).full_key("path"), "PATH");
    }

    #[test]
    fn test_load_var_or_default() {
        let loader = EnvLoader::default();
        assert_eq!(loader.load_var_or("NONEXISTENT_VAR_12345", "fallback"), "fallback");
    }

    #[test]
    fn test_strip_prefix() {
        let loader = EnvLoader::default();
        assert_eq!(loader.strip_prefix("APPCONFIG_LOG_LEVEL"), Some("LOG_LEVEL"));
        assert_eq!(loader.strip_prefix("APPCONFIGLOG_LEVEL"), None);
        assert_eq!(loader.strip_prefix("HOME"), None);
        assert_eq!(EnvLoader::new(None).strip_prefix("HOME"), Some("HOME"));
    }

    #[test]
    fn test_missing_var() {
        let loader = EnvLoader::new(Some("APPCONFIG_UNIT".to_string()));
        assert!(matches!(
            loader.load_var("MISSING_VAR_67890"),
            Err(ConfigError::EnvError(_))
        ));
    }
}
