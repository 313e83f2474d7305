//! Feature types and typed feature values.

use crate::error::{ValueError, json_kind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Declared type of a feature's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlagType {
    Boolean,
    String,
    Numeric,
}

impl FlagType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagType::Boolean => "BOOLEAN",
            FlagType::String => "STRING",
            FlagType::Numeric => "NUMERIC",
        }
    }
}

impl FromStr for FlagType {
    type Err = String;

    /// Matches the textual names exactly; `"boolean"` is not a valid type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BOOLEAN" => Ok(FlagType::Boolean),
            "STRING" => Ok(FlagType::String),
            "NUMERIC" => Ok(FlagType::Numeric),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for FlagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A feature value read according to its [`FlagType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Boolean(bool),
    String(String),
    Numeric(f64),
}

impl FlagValue {
    /// Read a raw configuration value as `flag_type`.
    ///
    /// No conversion between kinds is attempted: `"true"` is not a BOOLEAN
    /// value and `"42"` is not a NUMERIC one.
    pub fn coerce(raw: &Value, flag_type: FlagType) -> Result<Self, ValueError> {
        let value = match (flag_type, raw) {
            (FlagType::Boolean, Value::Bool(b)) => Some(FlagValue::Boolean(*b)),
            (FlagType::String, Value::String(s)) => Some(FlagValue::String(s.clone())),
            (FlagType::Numeric, Value::Number(n)) => n.as_f64().map(FlagValue::Numeric),
            _ => None,
        };

        value.ok_or(ValueError::Mismatch {
            expected: flag_type,
            found: json_kind(raw),
        })
    }

    pub fn flag_type(&self) -> FlagType {
        match self {
            FlagValue::Boolean(_) => FlagType::Boolean,
            FlagValue::String(_) => FlagType::String,
            FlagValue::Numeric(_) => FlagType::Numeric,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for FlagValue {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        Self::Numeric(value as f64)
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Boolean(b) => write!(f, "{}", b),
            FlagValue::String(s) => f.write_str(s),
            FlagValue::Numeric(n) => write!(f, "{}", n),
        }
    }
}
