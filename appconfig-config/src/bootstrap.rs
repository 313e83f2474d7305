// Bootstrap snapshot files

use crate::loader::{ConfigLoader, FileFormat};
use crate::{ConfigError, Result};
use appconfig_features::{EvaluationDispatcher, FeatureSet, LoadPolicy};
use appconfig_log::info;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Reads a JSON or TOML snapshot file shaped as `{ "features": [ ... ] }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BootstrapLoader {
    policy: LoadPolicy,
}

impl BootstrapLoader {
    pub fn new(policy: LoadPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> LoadPolicy {
        self.policy
    }

    /// Read the raw snapshot record.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let loader = ConfigLoader::auto(path)?;
        if loader.format() == FileFormat::Env {
            return Err(ConfigError::LoadError(format!(
                "{} cannot hold a feature snapshot",
                path.display()
            )));
        }
        loader.load_file(path)
    }

    /// Read and parse the snapshot into a feature set.
    pub fn load(
        &self,
        path: impl AsRef<Path>,
        dispatcher: Arc<dyn EvaluationDispatcher>,
    ) -> Result<FeatureSet> {
        let path = path.as_ref();
        info!("Loading bootstrap snapshot from {}", path.display());

        let snapshot = self.read(path)?;
        Ok(FeatureSet::from_snapshot(&snapshot, self.policy, dispatcher)?)
    }
}
