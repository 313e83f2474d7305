//! Identity context for evaluation.

use serde_json::Value;
use std::collections::HashMap;

/// Identity attributes rules are evaluated against.
pub type Attributes = HashMap<String, Value>;

/// The subject a feature is evaluated for (user, device, session).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Identity {
    id: String,
    attributes: Attributes,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}
