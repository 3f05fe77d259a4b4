//! API configuration

use serde::{Deserialize, Serialize};

use domain_simulation::SimulationConfig;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Directory holding `plans/` and `scenarios/` JSON files
    pub catalog_dir: String,
    /// Log level: trace, debug, info, warn, error
    pub log_level: String,
    pub log_format: LogFormat,
    pub simulation: SimulationConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            catalog_dir: "data".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            simulation: SimulationConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_`-prefixed environment variables
    ///
    /// Nested keys use a double underscore, e.g.
    /// `API_SIMULATION__CLIFF_MATERIALITY_RATIO=0.5`. Unset keys keep their
    /// defaults.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&ApiConfig::default())?)
            .add_source(
                config::Environment::with_prefix("API")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.simulation.cliff_materiality_ratio.is_zero());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ApiConfig =
            serde_json::from_str(r#"{"port": 9000, "log_format": "json"}"#).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.catalog_dir, "data");
    }
}
