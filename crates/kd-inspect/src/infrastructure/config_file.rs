//! TOML config file loading.
//!
//! Unlike a per-user settings file, the inspector config is only read when
//! its path is given explicitly (`--config` or `KD_INSPECT_CONFIG`), so a
//! missing file is an error rather than a reason to fall back to defaults.
//! Keys that are absent from the file keep their defaults.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::domain::InspectConfig;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads an [`InspectConfig`] from `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if the TOML is malformed or has unknown keys.
pub fn load_config(path: &Path) -> Result<InspectConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&content)?;
    debug!(path = %path.display(), ?config, "loaded config file");
    Ok(config)
}

/// Parses config TOML text.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the TOML is malformed.
pub fn parse_config(content: &str) -> Result<InspectConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use kd_core::ProductName;

    #[test]
    fn test_parse_config_full() {
        // Arrange
        let text = r#"
            log_level = "debug"
            expected_product = "analyticalDesigner"
            strict = true
        "#;

        // Act
        let config = parse_config(text).unwrap();

        // Assert
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.expected_product, ProductName::AnalyticalDesigner);
        assert!(config.strict);
    }

    #[test]
    fn test_parse_config_rejects_unknown_product() {
        let result = parse_config("expected_product = \"spreadsheet\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_parse_config_rejects_malformed_toml() {
        assert!(matches!(parse_config("strict = "), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_missing_file_is_io_error() {
        // Arrange
        let path = std::env::temp_dir().join("kd-inspect-test-does-not-exist.toml");

        // Act
        let result = load_config(&path);

        // Assert
        match result {
            Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_config_reads_file() {
        // Arrange
        let path = std::env::temp_dir().join(format!("kd-inspect-test-{}.toml", std::process::id()));
        std::fs::write(&path, "strict = true\n").unwrap();

        // Act
        let result = load_config(&path);
        let _ = std::fs::remove_file(&path);

        // Assert
        let config = result.unwrap();
        assert!(config.strict);
        assert_eq!(config.log_level, "info");
    }
}
