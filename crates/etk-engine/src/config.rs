//! Configuration for the engine

use etk_domain::ErrorPolicy;
use serde::{Deserialize, Serialize};

/// Origin URL given to documents created without one
pub const DEFAULT_ORIGIN_URL: &str = "http://ex.com/123";

/// Configuration for [`Etk`](crate::Etk)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtkConfig {
    /// How module and extractor failures are handled
    pub error_policy: ErrorPolicy,

    /// Origin URL for documents created without one
    pub default_origin_url: String,

    /// Check the tokenizer round trip on every tokenization
    pub verify_reconstruction: bool,
}

impl EtkConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.default_origin_url.trim().is_empty() {
            return Err("default_origin_url must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for EtkConfig {
    /// Process policy with reconstruction checks on
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::Process,
            default_origin_url: DEFAULT_ORIGIN_URL.to_string(),
            verify_reconstruction: true,
        }
    }
}

impl EtkConfig {
    /// Strict preset: every error propagates to the caller
    pub fn strict() -> Self {
        Self {
            error_policy: ErrorPolicy::Raise,
            ..Self::default()
        }
    }

    /// Lenient preset: keep going on errors, skip reconstruction checks
    pub fn lenient() -> Self {
        Self {
            error_policy: ErrorPolicy::Process,
            verify_reconstruction: false,
            ..Self::default()
        }
    }

    /// Set the error policy from its selector string
    pub fn with_error_policy(mut self, selector: &str) -> Self {
        self.error_policy = ErrorPolicy::from_selector(selector);
        self
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
