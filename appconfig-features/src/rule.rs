//! Segment rules and segment membership.
//!
//! A segment rule is kept as the raw record received from the configuration
//! source. The views below read the fields the evaluator needs:
//!
//! ```json
//! {
//!   "rules": [{ "segments": ["beta-users", "staff"] }],
//!   "value": "$default",
//!   "order": 1
//! }
//! ```

use crate::identity::Attributes;
use serde_json::{Map, Value};

/// Rule value meaning "serve the feature's enabled value".
pub const DEFAULT_VALUE_SENTINEL: &str = "$default";

/// A targeting rule, stored exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRule {
    raw: Map<String, Value>,
}

impl SegmentRule {
    pub fn new(raw: Map<String, Value>) -> Self {
        Self { raw }
    }

    /// The full rule record.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Priority declared by the source. Informational only: rules are
    /// evaluated in stored order. `None` when absent or not an integer
    /// (`1.5`, `"2"`); negative integers are kept.
    pub fn order(&self) -> Option<i64> {
        self.raw.get("order").and_then(Value::as_i64)
    }

    /// Value served when this rule matches.
    pub fn value(&self) -> Option<&Value> {
        self.raw.get("value").filter(|v| !v.is_null())
    }

    /// True when the rule serves the feature's enabled value instead of its own.
    pub fn uses_default_value(&self) -> bool {
        match self.value() {
            None => true,
            Some(Value::String(s)) => s == DEFAULT_VALUE_SENTINEL,
            Some(_) => false,
        }
    }

    /// Segment id groups from `rules[].segments[]`. Entries that are not
    /// strings are ignored.
    pub fn segment_groups(&self) -> Vec<Vec<&str>> {
        self.raw
            .get("rules")
            .and_then(Value::as_array)
            .map(|groups| {
                groups
                    .iter()
                    .map(|group| {
                        group
                            .get("segments")
                            .and_then(Value::as_array)
                            .map(|ids| ids.iter().filter_map(Value::as_str).collect())
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether the identity belongs to any segment referenced by this rule.
    pub fn matches<M: SegmentMatcher + ?Sized>(
        &self,
        matcher: &M,
        identity_id: &str,
        attributes: &Attributes,
    ) -> bool {
        self.segment_groups().iter().any(|group| {
            group
                .iter()
                .any(|segment| matcher.is_member(segment, identity_id, attributes))
        })
    }
}

/// Decides segment membership. How a segment is defined lives outside this crate.
pub trait SegmentMatcher: Send + Sync {
    fn is_member(&self, segment_id: &str, identity_id: &str, attributes: &Attributes) -> bool;
}

impl<F> SegmentMatcher for F
where
    F: Fn(&str, &str, &Attributes) -> bool + Send + Sync,
{
    fn is_member(&self, segment_id: &str, identity_id: &str, attributes: &Attributes) -> bool {
        self(segment_id, identity_id, attributes)
    }
}

/// Matcher for which no identity belongs to any segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSegments;

impl SegmentMatcher for NoSegments {
    fn is_member(&self, _segment_id: &str, _identity_id: &str, _attributes: &Attributes) -> bool {
        false
    }
}
