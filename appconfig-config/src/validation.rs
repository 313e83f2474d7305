// Settings validation

use crate::{ConfigError, Result};

/// Trait for validating loaded settings
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reusable validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not empty or blank
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate a log level name understood by `appconfig-log`
    pub fn log_level(value: &str, field: &str) -> Result<()> {
        if appconfig_log::Level::parse(value).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "{} must be one of trace, debug, info, warn, error, off",
                field
            )));
        }
        Ok(())
    }
}
