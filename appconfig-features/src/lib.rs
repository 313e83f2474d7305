//! Feature flags for appconfig
//!
//! Parses remotely-configured feature records into immutable
//! [`FeatureFlag`]s and resolves their value for an identity.
//!
//! # Quick Start
//!
//! ```
//! use appconfig_features::*;
//! use serde_json::json;
//!
//! let flag = FeatureFlag::from_payload(&json!({
//!     "isEnabled": true,
//!     "name": "dark-mode",
//!     "feature_id": "f1",
//!     "type": "BOOLEAN",
//!     "enabled_value": true,
//!     "disabled_value": false,
//!     "segment_rules": []
//! }))
//! .unwrap();
//!
//! let evaluator = RuleEvaluator::new(NoSegments);
//! let value = flag
//!     .resolve_value(&evaluator, "user-42", &Attributes::new())
//!     .unwrap();
//! assert_eq!(value.as_bool(), Some(true));
//! ```
//!
//! # Segment Rules
//!
//! Segment membership is decided by a [`SegmentMatcher`]; any
//! `Fn(&str, &str, &Attributes) -> bool` works.
//!
//! ```
//! use appconfig_features::*;
//! use serde_json::json;
//!
//! let flag = FeatureFlag::from_payload(&json!({
//!     "isEnabled": true,
//!     "name": "button-color",
//!     "feature_id": "button-color",
//!     "type": "STRING",
//!     "enabled_value": "red",
//!     "disabled_value": "grey",
//!     "segment_rules": [
//!         {"rules": [{"segments": ["staff"]}], "value": "blue", "order": 1}
//!     ]
//! }))
//! .unwrap();
//!
//! let staff = |segment: &str, _: &str, attrs: &Attributes| {
//!     segment == "staff"
//!         && attrs
//!             .get("email")
//!             .and_then(|v| v.as_str())
//!             .is_some_and(|e| e.ends_with("@company.com"))
//! };
//! let evaluator = RuleEvaluator::new(staff);
//!
//! let identity = Identity::new("ann").with_attribute("email", "ann@company.com");
//! let value = flag
//!     .resolve_value(&evaluator, identity.id(), identity.attributes())
//!     .unwrap();
//! assert_eq!(value.as_str(), Some("blue"));
//! ```

pub mod dispatcher;
pub mod error;
pub mod flag;
pub mod identity;
pub mod rule;
pub mod snapshot;
pub mod value;

pub use dispatcher::{EvaluationDispatcher, RuleEvaluator};
pub use error::{ConstructionError, EvaluationError, SnapshotError, ValueError};
pub use flag::FeatureFlag;
pub use identity::{Attributes, Identity};
pub use rule::{DEFAULT_VALUE_SENTINEL, NoSegments, SegmentMatcher, SegmentRule};
pub use snapshot::{FeatureSet, LoadPolicy, SnapshotStore};
pub use value::{FlagType, FlagValue};
