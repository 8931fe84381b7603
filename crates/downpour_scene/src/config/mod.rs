//! Configuration system
//!
//! Entity configurations (car dimensions, camera placement, road layout) and
//! the demo application's settings are plain serde structures implementing
//! [`Config`], so they can be read from TOML or RON files.

pub use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

/// Configuration trait
pub trait Config: Serialize + DeserializeOwned + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            Self::from_toml_str(&contents)
        } else if path.ends_with(".ron") {
            Self::from_ron_str(&contents)
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Parse configuration from TOML text
    fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse configuration from RON text
    fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A required numeric field was never set (still zero)
    #[error("{owner}: required value '{field}' is missing")]
    MissingValue {
        /// Configuration or entity the value belongs to
        owner: String,
        /// Field name
        field: &'static str,
    },

    /// A field holds a value outside its valid range
    #[error("{owner}: value '{field}' is invalid ({value})")]
    InvalidValue {
        /// Configuration or entity the value belongs to
        owner: String,
        /// Field name
        field: &'static str,
        /// Offending value
        value: f32,
    },
}

/// Check that a required quantity was set and is usable
///
/// Zero means "never configured"; negative or non-finite values are invalid.
pub fn require_positive(owner: &str, field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidValue {
            owner: owner.to_string(),
            field,
            value,
        });
    }
    if value == 0.0 {
        return Err(ConfigError::MissingValue {
            owner: owner.to_string(),
            field,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        width: f32,
        label: String,
    }

    impl Config for Sample {}

    #[test]
    fn test_parse_toml_and_ron() {
        let from_toml = Sample::from_toml_str("width = 2.5\nlabel = \"road\"\n").unwrap();
        let from_ron = Sample::from_ron_str("(width: 2.5, label: \"road\")").unwrap();

        assert_eq!(from_toml, from_ron);
        assert_eq!(from_toml.label, "road");
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let err = Sample::default().save_to_file("settings.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_save_and_load_roundtrip_through_file() {
        let path = std::env::temp_dir().join(format!("downpour_config_{}.toml", std::process::id()));
        let path = path.to_string_lossy().into_owned();

        let sample = Sample { width: 4.0, label: "lane".to_string() };
        sample.save_to_file(&path).unwrap();
        let loaded = Sample::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, sample);
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive("car", "mass", 1200.0).is_ok());
        assert!(matches!(
            require_positive("car", "mass", 0.0),
            Err(ConfigError::MissingValue { field: "mass", .. })
        ));
        assert!(matches!(
            require_positive("car", "mass", -1.0),
            Err(ConfigError::InvalidValue { field: "mass", .. })
        ));
        assert!(matches!(
            require_positive("car", "mass", f32::NAN),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
