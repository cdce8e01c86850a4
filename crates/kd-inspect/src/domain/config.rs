//! Inspector configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! command-line flags (or their `KD_INSPECT_*` environment variables).  Only
//! the first two layers are handled here; `main.rs` applies the last one.
//!
//! ```toml
//! log_level = "debug"
//! expected_product = "kpiDashboard"
//! strict = true
//! ```

use kd_core::ProductName;
use serde::{Deserialize, Serialize};

/// Resolved inspector configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InspectConfig {
    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Product every message is expected to carry.
    #[serde(default = "default_expected_product")]
    pub expected_product: ProductName,
    /// Stop with an error at the first message with an invalid body or an
    /// unexpected product.
    #[serde(default)]
    pub strict: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}

fn default_expected_product() -> ProductName {
    ProductName::KpiDashboard
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            expected_product: default_expected_product(),
            strict: false,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        // Arrange / Act
        let config = InspectConfig::default();

        // Assert
        assert_eq!(config.log_level, "info");
        assert_eq!(config.expected_product, ProductName::KpiDashboard);
        assert!(!config.strict);
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: InspectConfig = toml::from_str("").unwrap();
        assert_eq!(config, InspectConfig::default());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: InspectConfig =
            toml::from_str("expected_product = \"analyticalDesigner\"").unwrap();
        assert_eq!(config.expected_product, ProductName::AnalyticalDesigner);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(toml::from_str::<InspectConfig>("verbose = true").is_err());
    }
}
