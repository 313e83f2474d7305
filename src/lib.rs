// appconfig - feature flag core for a remotely configured SDK
//
// Typed feature flags parsed from configuration snapshots, segment-rule
// evaluation through an injected dispatcher, and copy-on-write snapshot
// replacement.

pub use appconfig_config as config;
pub use appconfig_features as features;
pub use appconfig_log as log;

pub use appconfig_config::{BootstrapLoader, ConfigError, SdkSettings, SettingsBuilder};
pub use appconfig_features::{
    Attributes, ConstructionError, EvaluationDispatcher, EvaluationError, FeatureFlag, FeatureSet,
    FlagType, FlagValue, Identity, LoadPolicy, NoSegments, RuleEvaluator, SegmentMatcher,
    SegmentRule, SnapshotError, SnapshotStore,
};

use std::sync::Arc;

/// Apply the logging settings and build the initial snapshot store.
///
/// The store starts from `settings.bootstrap_file` when one is configured,
/// otherwise from an empty feature set.
pub fn bootstrap(
    settings: &SdkSettings,
    dispatcher: Arc<dyn EvaluationDispatcher>,
) -> Result<SnapshotStore, ConfigError> {
    appconfig_log::init();
    if let Some(level) = settings.log_level.as_deref().and_then(appconfig_log::Level::parse) {
        appconfig_log::set_level(level);
    }

    let features = match settings.bootstrap_file {
        Some(ref path) => BootstrapLoader::new(settings.load_policy).load(path, dispatcher)?,
        None => FeatureSet::new(Vec::new(), dispatcher)?,
    };

    appconfig_log::info!(
        "Feature store ready for {}/{} with {} features",
        settings.collection_id,
        settings.environment_id,
        features.len()
    );
    Ok(SnapshotStore::new(features))
}

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Attributes, EvaluationDispatcher, FeatureFlag, FeatureSet, FlagType, FlagValue, Identity,
        LoadPolicy, NoSegments, RuleEvaluator, SdkSettings, SegmentMatcher, SnapshotStore,
        bootstrap,
    };
}
