//! API configuration

use serde::Deserialize;

use domain_reimbursement::{EstimatorConfig, FonasaEstimateMode};

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// Fonasa estimate presentation: "illustrative" or "suppressed"
    pub fonasa_estimates: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            fonasa_estimates: "illustrative".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Estimator configuration derived from the Fonasa flag; unknown
    /// values fall back to the illustrative default
    pub fn estimator_config(&self) -> EstimatorConfig {
        let fonasa_mode = match self.fonasa_estimates.as_str() {
            "suppressed" => FonasaEstimateMode::Suppressed,
            _ => FonasaEstimateMode::Illustrative,
        };
        EstimatorConfig { fonasa_mode }
    }
}
