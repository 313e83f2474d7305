// SDK settings assembled from defaults, files and the environment

use crate::env::{ENV_PREFIX, EnvLoader};
use crate::loader::{ConfigLoader, FileFormat};
use crate::validation::{ConfigValidator, Validate};
use crate::{ConfigError, Result};
use appconfig_features::LoadPolicy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Settings for one collection/environment pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdkSettings {
    pub collection_id: String,
    pub environment_id: String,
    /// Snapshot file read before any remote configuration is available
    #[serde(default)]
    pub bootstrap_file: Option<PathBuf>,
    #[serde(default)]
    pub load_policy: LoadPolicy,
    #[serde(default)]
    pub log_level: Option<String>,
}

impl SdkSettings {
    /// Settings from `APPCONFIG_*` environment variables only.
    pub fn from_env() -> Result<Self> {
        SettingsBuilder::new().with_env()?.build()
    }
}

impl Validate for SdkSettings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::not_empty(&self.collection_id, "collection_id")?;
        ConfigValidator::not_empty(&self.environment_id, "environment_id")?;
        if let Some(ref level) = self.log_level {
            ConfigValidator::log_level(level, "log_level")?;
        }
        Ok(())
    }
}

/// Layers setting sources; later sources override earlier keys.
#[derive(Debug, Clone, Default)]
pub struct SettingsBuilder {
    values: Map<String, Value>,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Merge a JSON, TOML or `.env` file. `.env` keys may carry the
    /// `APPCONFIG_` prefix and are matched case-insensitively.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let loader = ConfigLoader::auto(path)?;
        let data = loader.load_file(path)?;

        let Value::Object(map) = data else {
            return Err(ConfigError::LoadError(format!(
                "{} does not contain a table of settings",
                path.display()
            )));
        };

        for (key, value) in map {
            let key = match loader.format() {
                FileFormat::Env => env_key(&key),
                _ => key,
            };
            self.values.insert(key, value);
        }

        Ok(self)
    }

    /// Merge `APPCONFIG_*` environment variables.
    pub fn with_env(self) -> Result<Self> {
        self.with_env_loader(&EnvLoader::default())
    }

    pub fn with_env_loader(mut self, loader: &EnvLoader) -> Result<Self> {
        for (key, value) in loader.load()? {
            self.values.insert(key, Value::String(value));
        }
        Ok(self)
    }

    /// Load a `.env` file into the process environment, then merge the
    /// environment. Without a path a missing `./.env` is not an error.
    pub fn with_dotenv(self, path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        self.with_env()
    }

    pub fn build(self) -> Result<SdkSettings> {
        let settings: SdkSettings = serde_json::from_value(Value::Object(self.values))
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

fn env_key(key: &str) -> String {
    let upper = key.to_uppercase();
    let prefix = format!("{}_", ENV_PREFIX);
    upper
        .strip_prefix(&prefix)
        .unwrap_or(&upper)
        .to_lowercase()
}
