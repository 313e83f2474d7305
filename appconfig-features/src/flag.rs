//! Feature Flag Core
//!
//! Parses one feature record from a configuration snapshot and resolves its
//! value for an identity through an [`EvaluationDispatcher`].

use crate::dispatcher::EvaluationDispatcher;
use crate::error::{ConstructionError, EvaluationError, json_kind};
use crate::identity::Attributes;
use crate::rule::SegmentRule;
use crate::value::{FlagType, FlagValue};
use appconfig_log::{debug, error};
use serde_json::{Map, Value};

/// One feature flag definition, immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFlag {
    name: String,
    feature_id: String,
    enabled: bool,
    flag_type: FlagType,
    enabled_value: Value,
    disabled_value: Value,
    segment_rules: Vec<SegmentRule>,
    raw: Map<String, Value>,
}

impl FeatureFlag {
    /// Build a flag from a feature record.
    ///
    /// Expected keys: `isEnabled`, `name`, `feature_id`, `segment_rules`,
    /// `type`, `enabled_value`, `disabled_value`. Values are kept as received;
    /// they are read as `type` only when resolved.
    ///
    /// # Examples
    ///
    /// ```
    /// use appconfig_features::{FeatureFlag, FlagType};
    /// use serde_json::json;
    ///
    /// let flag = FeatureFlag::from_payload(&json!({
    ///     "isEnabled": true,
    ///     "name": "dark-mode",
    ///     "feature_id": "f1",
    ///     "type": "BOOLEAN",
    ///     "enabled_value": true,
    ///     "disabled_value": false,
    ///     "segment_rules": []
    /// }))
    /// .unwrap();
    ///
    /// assert_eq!(flag.feature_id(), "f1");
    /// assert_eq!(flag.flag_type(), FlagType::Boolean);
    /// ```
    pub fn from_payload(payload: &Value) -> Result<Self, ConstructionError> {
        Self::parse(payload).inspect_err(|e| {
            error!("Invalid feature record: {}", e);
        })
    }

    fn parse(payload: &Value) -> Result<Self, ConstructionError> {
        let record = payload.as_object().ok_or(ConstructionError::TypeMismatch {
            field: "$",
            expected: "object",
            found: json_kind(payload),
        })?;

        let enabled = required(record, "isEnabled")?
            .as_bool()
            .ok_or_else(|| mismatch(record, "isEnabled", "boolean"))?;
        let name = string_field(record, "name")?;
        let feature_id = string_field(record, "feature_id")?;

        let segment_rules = required(record, "segment_rules")?
            .as_array()
            .ok_or_else(|| mismatch(record, "segment_rules", "array"))?
            .iter()
            .map(|rule| match rule {
                Value::Object(map) => Ok(SegmentRule::new(map.clone())),
                other => Err(ConstructionError::TypeMismatch {
                    field: "segment_rules",
                    expected: "array of objects",
                    found: json_kind(other),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let flag_type = string_field(record, "type")?
            .parse::<FlagType>()
            .map_err(ConstructionError::UnknownFlagType)?;

        let enabled_value = required(record, "enabled_value")?.clone();
        let disabled_value = required(record, "disabled_value")?.clone();

        Ok(Self {
            name,
            feature_id,
            enabled,
            flag_type,
            enabled_value,
            disabled_value,
            segment_rules,
            raw: record.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn feature_id(&self) -> &str {
        &self.feature_id
    }

    pub fn flag_type(&self) -> FlagType {
        self.flag_type
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Targeting rules in the order received.
    pub fn segment_rules(&self) -> &[SegmentRule] {
        &self.segment_rules
    }

    /// Value served when enabled and no rule matches, as received.
    pub fn enabled_value(&self) -> &Value {
        &self.enabled_value
    }

    /// Value served when disabled, as received.
    pub fn disabled_value(&self) -> &Value {
        &self.disabled_value
    }

    /// The complete feature record, including keys not modelled here.
    pub fn raw_payload(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Read a raw value of this feature as its declared type.
    pub fn typed(&self, raw: &Value) -> Result<FlagValue, EvaluationError> {
        FlagValue::coerce(raw, self.flag_type).map_err(|source| EvaluationError::InvalidValue {
            feature_id: self.feature_id.clone(),
            source,
        })
    }

    /// Resolve the effective value of this feature for an identity.
    ///
    /// An empty `identity_id` fails with [`EvaluationError::MissingIdentity`]
    /// without consulting `dispatcher`.
    pub fn resolve_value<D>(
        &self,
        dispatcher: &D,
        identity_id: &str,
        attributes: &Attributes,
    ) -> Result<FlagValue, EvaluationError>
    where
        D: EvaluationDispatcher + ?Sized,
    {
        if identity_id.is_empty() {
            error!(
                "Cannot evaluate feature '{}': identity id is empty",
                self.feature_id
            );
            return Err(EvaluationError::MissingIdentity);
        }

        debug!(
            "Evaluating feature '{}' for identity '{}'",
            self.feature_id, identity_id
        );
        dispatcher.evaluate(self, identity_id, attributes)
    }
}

impl TryFrom<&Value> for FeatureFlag {
    type Error = ConstructionError;

    fn try_from(payload: &Value) -> Result<Self, Self::Error> {
        Self::from_payload(payload)
    }
}

impl TryFrom<Value> for FeatureFlag {
    type Error = ConstructionError;

    fn try_from(payload: Value) -> Result<Self, Self::Error> {
        Self::from_payload(&payload)
    }
}

fn required<'a>(
    record: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, ConstructionError> {
    record
        .get(field)
        .filter(|v| !v.is_null())
        .ok_or(ConstructionError::MissingField { field })
}

fn string_field(record: &Map<String, Value>, field: &'static str) -> Result<String, ConstructionError> {
    required(record, field)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| mismatch(record, field, "string"))
}

fn mismatch(
    record: &Map<String, Value>,
    field: &'static str,
    expected: &'static str,
) -> ConstructionError {
    ConstructionError::TypeMismatch {
        field,
        expected,
        found: record.get(field).map(json_kind).unwrap_or("nothing"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "isEnabled": true,
            "name": "dark-mode",
            "feature_id": "f1",
            "type": "BOOLEAN",
            "enabled_value": true,
            "disabled_value": false,
            "segment_rules": []
        })
    }

    fn without(key: &str) -> Value {
        let mut p = payload();
        p.as_object_mut().unwrap().remove(key);
        p
    }

    fn with(key: &str, value: Value) -> Value {
        let mut p = payload();
        p[key] = value;
        p
    }

    #[test]
    fn test_construct_valid() {
        let flag = FeatureFlag::from_payload(&payload()).unwrap();

        assert_eq!(flag.name(), "dark-mode");
        assert_eq!(flag.feature_id(), "f1");
        assert!(flag.is_enabled());
        assert_eq!(flag.flag_type(), FlagType::Boolean);
        assert_eq!(flag.enabled_value(), &json!(true));
        assert_eq!(flag.disabled_value(), &json!(false));
        assert!(flag.segment_rules().is_empty());
    }

    #[test]
    fn test_missing_fields() {
        for key in [
            "isEnabled",
            "name",
            "feature_id",
            "segment_rules",
            "type",
            "enabled_value",
            "disabled_value",
        ] {
            let err = FeatureFlag::from_payload(&without(key)).unwrap_err();
            assert_eq!(err, ConstructionError::MissingField { field: key }, "{key}");
        }
    }

    #[test]
    fn test_null_value_is_missing() {
        let err = FeatureFlag::from_payload(&with("disabled_value", Value::Null)).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::MissingField {
                field: "disabled_value"
            }
        );
    }

    #[test]
    fn test_wrong_types() {
        let err = FeatureFlag::from_payload(&with("isEnabled", json!("true"))).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::TypeMismatch {
                field: "isEnabled",
                expected: "boolean",
                found: "string",
            }
        );

        let err = FeatureFlag::from_payload(&with("segment_rules", json!({}))).unwrap_err();
        assert!(matches!(
            err,
            ConstructionError::TypeMismatch {
                field: "segment_rules",
                ..
            }
        ));

        let err = FeatureFlag::from_payload(&with("segment_rules", json!([1]))).unwrap_err();
        assert!(matches!(
            err,
            ConstructionError::TypeMismatch {
                field: "segment_rules",
                found: "number",
                ..
            }
        ));

        let err = FeatureFlag::from_payload(&with("feature_id", json!(7))).unwrap_err();
        assert!(matches!(
            err,
            ConstructionError::TypeMismatch {
                field: "feature_id",
                ..
            }
        ));
    }

    #[test]
    fn test_payload_must_be_object() {
        let err = FeatureFlag::from_payload(&json!([1, 2])).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::TypeMismatch {
                field: "$",
                expected: "object",
                found: "array",
            }
        );
    }

    #[test]
    fn test_unknown_type() {
        for ty in ["JSON", "boolean", ""] {
            let err = FeatureFlag::from_payload(&with("type", json!(ty))).unwrap_err();
            assert_eq!(err, ConstructionError::UnknownFlagType(ty.to_string()));
        }
    }

    #[test]
    fn test_values_not_coerced_at_construction() {
        let p = with("type", json!("NUMERIC"));
        let flag = FeatureFlag::from_payload(&p).unwrap();

        assert_eq!(flag.flag_type(), FlagType::Numeric);
        assert_eq!(flag.enabled_value(), &json!(true));
        assert!(matches!(
            flag.typed(flag.enabled_value()),
            Err(EvaluationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_rule_order_preserved() {
        let rules = json!([
            {"order": 3, "value": "c", "rules": [{"segments": ["s3"]}]},
            {"order": 1, "value": "a", "rules": [{"segments": ["s1"]}]},
            {"order": 1, "value": "a", "rules": [{"segments": ["s1"]}]}
        ]);
        let p = with("segment_rules", rules.clone());
        let flag = FeatureFlag::from_payload(&p).unwrap();

        let stored: Vec<Value> = flag
            .segment_rules()
            .iter()
            .map(|r| Value::Object(r.raw().clone()))
            .collect();
        assert_eq!(Value::Array(stored), rules);
    }

    #[test]
    fn test_raw_payload_keeps_extra_keys() {
        let p = with("collections", json!([{"collection_id": "web"}]));
        let flag = FeatureFlag::try_from(&p).unwrap();

        assert_eq!(flag.raw_payload().get("collections"), Some(&json!([{"collection_id": "web"}])));
        assert_eq!(&Value::Object(flag.raw_payload().clone()), &p);
    }

    #[test]
    fn test_accessors_idempotent() {
        let flag = FeatureFlag::try_from(payload()).unwrap();

        assert_eq!(flag.name(), flag.name());
        assert_eq!(flag.enabled_value(), flag.enabled_value());
        assert_eq!(flag.segment_rules(), flag.segment_rules());
        assert_eq!(flag.clone(), flag);
    }
}
