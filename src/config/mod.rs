//! Application configuration.
//!
//! Layered: `config/default.toml` (optional) first, then environment
//! variables prefixed `STAG_PLANNER` with `__` separating nesting
//! levels, e.g. `STAG_PLANNER__AI__MODEL`.

mod ai;
mod error;

pub use ai::AiConfig;
pub use error::ConfigError;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub ai: AiConfig,
}

impl AppConfig {
    /// Loads configuration from file and environment.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(
                config::Environment::with_prefix("STAG_PLANNER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: AppConfig = settings.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.ai.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let app = AppConfig {
            ai: AiConfig::default(),
        };
        assert!(app.validate().is_ok());
    }
}
