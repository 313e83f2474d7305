//! Evaluation dispatch.
//!
//! [`FeatureFlag::resolve_value`] hands the flag, the identity id and the
//! identity attributes to an [`EvaluationDispatcher`]. The dispatcher is
//! always supplied by the caller or held by the owning [`FeatureSet`](crate::FeatureSet).

use crate::error::EvaluationError;
use crate::flag::FeatureFlag;
use crate::identity::Attributes;
use crate::rule::{NoSegments, SegmentMatcher};
use crate::value::FlagValue;
use appconfig_log::debug;

/// Resolves a feature's value for one identity.
///
/// Implementations are expected to honour the following contract:
/// a disabled feature yields its disabled value; otherwise segment rules are
/// walked in stored order and the first matching rule's value wins; when no
/// rule matches the enabled value is served.
pub trait EvaluationDispatcher: Send + Sync {
    fn evaluate(
        &self,
        flag: &FeatureFlag,
        identity_id: &str,
        attributes: &Attributes,
    ) -> Result<FlagValue, EvaluationError>;
}

/// Dispatcher applying segment rules with a pluggable [`SegmentMatcher`].
#[derive(Debug, Clone, Default)]
pub struct RuleEvaluator<M = NoSegments> {
    matcher: M,
}

impl<M: SegmentMatcher> RuleEvaluator<M> {
    pub fn new(matcher: M) -> Self {
        Self { matcher }
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }
}

impl<M: SegmentMatcher> EvaluationDispatcher for RuleEvaluator<M> {
    fn evaluate(
        &self,
        flag: &FeatureFlag,
        identity_id: &str,
        attributes: &Attributes,
    ) -> Result<FlagValue, EvaluationError> {
        if !flag.is_enabled() {
            return flag.typed(flag.disabled_value());
        }

        for (position, rule) in flag.segment_rules().iter().enumerate() {
            if !rule.matches(&self.matcher, identity_id, attributes) {
                continue;
            }

            debug!(
                "Feature '{}' matched rule {} for identity '{}'",
                flag.feature_id(),
                position,
                identity_id
            );
            return match rule.value() {
                Some(value) if !rule.uses_default_value() => flag.typed(value),
                _ => flag.typed(flag.enabled_value()),
            };
        }

        flag.typed(flag.enabled_value())
    }
}

impl<D: EvaluationDispatcher + ?Sized> EvaluationDispatcher for std::sync::Arc<D> {
    fn evaluate(
        &self,
        flag: &FeatureFlag,
        identity_id: &str,
        attributes: &Attributes,
    ) -> Result<FlagValue, EvaluationError> {
        (**self).evaluate(flag, identity_id, attributes)
    }
}
