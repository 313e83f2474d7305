// Settings and bootstrap snapshot loading for appconfig

pub mod bootstrap;
pub mod env;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use bootstrap::BootstrapLoader;
pub use env::{ENV_PREFIX, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use settings::{SdkSettings, SettingsBuilder};
pub use validation::{ConfigValidator, Validate};
