//! Feature collections and snapshot replacement.

use crate::dispatcher::EvaluationDispatcher;
use crate::error::{EvaluationError, SnapshotError};
use crate::flag::FeatureFlag;
use crate::identity::Identity;
use crate::value::FlagValue;
use appconfig_log::{info, warn};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// What to do with a feature record that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Reject the whole snapshot
    #[default]
    Strict,
    /// Log and drop the feature, keep the rest
    SkipInvalid,
}

/// An immutable set of features with unique ids, plus the dispatcher used to
/// evaluate them.
#[derive(Clone)]
pub struct FeatureSet {
    features: Vec<FeatureFlag>,
    index: HashMap<String, usize>,
    dispatcher: Arc<dyn EvaluationDispatcher>,
    loaded_at: DateTime<Utc>,
}

impl FeatureSet {
    /// Collect features, rejecting duplicate ids.
    pub fn new(
        features: Vec<FeatureFlag>,
        dispatcher: Arc<dyn EvaluationDispatcher>,
    ) -> Result<Self, SnapshotError> {
        let mut index = HashMap::with_capacity(features.len());
        for (position, feature) in features.iter().enumerate() {
            if index
                .insert(feature.feature_id().to_string(), position)
                .is_some()
            {
                return Err(SnapshotError::DuplicateFeatureId(
                    feature.feature_id().to_string(),
                ));
            }
        }

        Ok(Self {
            features,
            index,
            dispatcher,
            loaded_at: Utc::now(),
        })
    }

    /// Parse a snapshot record of the form `{ "features": [ ... ] }`.
    pub fn from_snapshot(
        snapshot: &Value,
        policy: LoadPolicy,
        dispatcher: Arc<dyn EvaluationDispatcher>,
    ) -> Result<Self, SnapshotError> {
        let records = snapshot
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                SnapshotError::Malformed("expected an object with a 'features' array".to_string())
            })?;

        let mut features = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            match FeatureFlag::from_payload(record) {
                Ok(feature) => features.push(feature),
                Err(source) if policy == LoadPolicy::SkipInvalid => {
                    warn!("Skipping feature at index {}: {}", index, source);
                }
                Err(source) => return Err(SnapshotError::InvalidFeature { index, source }),
            }
        }

        let set = Self::new(features, dispatcher)?;
        info!(
            "Loaded {} of {} features from snapshot",
            set.len(),
            records.len()
        );
        Ok(set)
    }

    pub fn get(&self, feature_id: &str) -> Option<&FeatureFlag> {
        self.index.get(feature_id).map(|&i| &self.features[i])
    }

    pub fn contains(&self, feature_id: &str) -> bool {
        self.index.contains_key(feature_id)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Features in load order.
    pub fn iter(&self) -> impl Iterator<Item = &FeatureFlag> {
        self.features.iter()
    }

    pub fn feature_ids(&self) -> Vec<&str> {
        self.features.iter().map(FeatureFlag::feature_id).collect()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn dispatcher(&self) -> &Arc<dyn EvaluationDispatcher> {
        &self.dispatcher
    }

    /// Resolve a feature's value for `identity` with this set's dispatcher.
    pub fn resolve(&self, feature_id: &str, identity: &Identity) -> Result<FlagValue, EvaluationError> {
        let feature = self
            .get(feature_id)
            .ok_or_else(|| EvaluationError::UnknownFeature(feature_id.to_string()))?;

        feature.resolve_value(self.dispatcher.as_ref(), identity.id(), identity.attributes())
    }
}

impl fmt::Debug for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureSet")
            .field("features", &self.feature_ids())
            .field("loaded_at", &self.loaded_at)
            .finish_non_exhaustive()
    }
}

/// Holds the current [`FeatureSet`].
///
/// Readers take an `Arc` to one set and keep using it even if a refresh
/// replaces it meanwhile. Sets are never mutated in place.
#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Arc<FeatureSet>>,
}

impl SnapshotStore {
    pub fn new(initial: FeatureSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    pub fn current(&self) -> Arc<FeatureSet> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a new set, returning the previous one.
    pub fn replace(&self, next: FeatureSet) -> Arc<FeatureSet> {
        let next = Arc::new(next);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        info!(
            "Replacing feature snapshot ({} -> {} features)",
            guard.len(),
            next.len()
        );
        std::mem::replace(&mut *guard, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::RuleEvaluator;
    use crate::error::ConstructionError;
    use crate::rule::NoSegments;
    use serde_json::json;

    fn dispatcher() -> Arc<dyn EvaluationDispatcher> {
        Arc::new(RuleEvaluator::new(NoSegments))
    }

    fn record(id: &str, enabled: bool) -> Value {
        json!({
            "isEnabled": enabled,
            "name": id,
            "feature_id": id,
            "type": "BOOLEAN",
            "enabled_value": true,
            "disabled_value": false,
            "segment_rules": []
        })
    }

    #[test]
    fn test_from_snapshot() {
        let snapshot = json!({"features": [record("a", true), record("b", false)]});
        let set = FeatureSet::from_snapshot(&snapshot, LoadPolicy::Strict, dispatcher()).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.feature_ids(), vec!["a", "b"]);
        assert!(set.contains("a"));
        assert!(set.get("c").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let snapshot = json!({"features": [record("a", true), record("a", false)]});
        let err = FeatureSet::from_snapshot(&snapshot, LoadPolicy::SkipInvalid, dispatcher())
            .unwrap_err();
        assert_eq!(err, SnapshotError::DuplicateFeatureId("a".to_string()));
    }

    #[test]
    fn test_strict_policy_aborts() {
        let mut broken = record("b", true);
        broken.as_object_mut().unwrap().remove("enabled_value");
        let snapshot = json!({"features": [record("a", true), broken]});

        let err = FeatureSet::from_snapshot(&snapshot, LoadPolicy::Strict, dispatcher()).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::InvalidFeature {
                index: 1,
                source: ConstructionError::MissingField {
                    field: "enabled_value"
                },
            }
        );
    }

    #[test]
    fn test_skip_invalid_policy() {
        let mut broken = record("b", true);
        broken["type"] = json!("JSON");
        let snapshot = json!({"features": [record("a", true), broken, record("c", true)]});

        let set = FeatureSet::from_snapshot(&snapshot, LoadPolicy::SkipInvalid, dispatcher()).unwrap();
        assert_eq!(set.feature_ids(), vec!["a", "c"]);
    }

    #[test]
    fn test_malformed_snapshot() {
        for snapshot in [json!([]), json!({}), json!({"features": {}})] {
            assert!(matches!(
                FeatureSet::from_snapshot(&snapshot, LoadPolicy::Strict, dispatcher()),
                Err(SnapshotError::Malformed(_))
            ));
        }
    }

    #[test]
    fn test_resolve() {
        let snapshot = json!({"features": [record("on", true), record("off", false)]});
        let set = FeatureSet::from_snapshot(&snapshot, LoadPolicy::Strict, dispatcher()).unwrap();
        let identity = Identity::new("user-42");

        assert_eq!(set.resolve("on", &identity), Ok(FlagValue::Boolean(true)));
        assert_eq!(set.resolve("off", &identity), Ok(FlagValue::Boolean(false)));
        assert_eq!(
            set.resolve("missing", &identity),
            Err(EvaluationError::UnknownFeature("missing".to_string()))
        );
        assert_eq!(
            set.resolve("on", &Identity::new("")),
            Err(EvaluationError::MissingIdentity)
        );
    }

    #[test]
    fn test_store_replace_keeps_old_readers() {
        let first = FeatureSet::from_snapshot(
            &json!({"features": [record("a", true)]}),
            LoadPolicy::Strict,
            dispatcher(),
        )
        .unwrap();
        let second = FeatureSet::from_snapshot(
            &json!({"features": [record("a", false), record("b", true)]}),
            LoadPolicy::Strict,
            dispatcher(),
        )
        .unwrap();

        let store = SnapshotStore::new(first);
        let held = store.current();

        let previous = store.replace(second);
        assert!(Arc::ptr_eq(&held, &previous));
        assert_eq!(held.len(), 1);
        assert_eq!(store.current().len(), 2);
        assert_eq!(
            held.resolve("a", &Identity::new("u")),
            Ok(FlagValue::Boolean(true))
        );
        assert_eq!(
            store.current().resolve("a", &Identity::new("u")),
            Ok(FlagValue::Boolean(false))
        );
    }

    #[test]
    fn test_load_policy_serde() {
        let policy: LoadPolicy = serde_json::from_value(json!("skip_invalid")).unwrap();
        assert_eq!(policy, LoadPolicy::SkipInvalid);
        assert_eq!(LoadPolicy::default(), LoadPolicy::Strict);
    }
}
