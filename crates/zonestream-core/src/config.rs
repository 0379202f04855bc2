//! Runtime configuration.
//!
//! Deployments with a single shared credential provide the endpoint and key
//! here (TOML file or embedded string) instead of per-call; the values are
//! still handed to constructors explicitly — nothing in the library reads
//! ambient globals.

use serde::Deserialize;
use url::Url;
use validator::Validate;

use crate::delivery::{DeliveryConfig, DEFAULT_ENDPOINT};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoggingConfig {
    pub level: log::LevelFilter,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: log::LevelFilter::Info,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DeliverySection {
    #[validate(length(min = 1))]
    pub endpoint: String,
    pub key: Option<String>,
}

impl Default for DeliverySection {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            key: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AppConfig {
    #[serde(default)]
    #[validate(nested)]
    pub logging: LoggingConfig,
    #[serde(default)]
    #[validate(nested)]
    pub delivery: DeliverySection,
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, String> {
        let cfg: AppConfig = toml::from_str(s).map_err(|e| format!("toml parse error: {}", e))?;
        cfg.validate().map_err(|e| e.to_string())?;
        Url::parse(&cfg.delivery.endpoint)
            .map_err(|e| format!("validation error: delivery.endpoint is not a URL: {}", e))?;
        Ok(cfg)
    }

    /// The delivery configuration this deployment hands to widgets.
    pub fn delivery_config(&self) -> DeliveryConfig {
        let endpoint = Url::parse(&self.delivery.endpoint)
            .unwrap_or_else(|_| Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"));
        DeliveryConfig {
            endpoint,
            key: self.delivery.key.clone(),
        }
    }
}
