use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AudiocutError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds removed before each keyword match.
    pub buffer_before: f64,
    /// Seconds removed after each keyword match.
    pub buffer_after: f64,
    /// Chunk length for voice conversion, seconds.
    pub chunk_length: f64,
    /// Overlap between consecutive chunks, seconds.
    pub overlap: f64,
    /// Chunks transformed in parallel.
    pub concurrency: usize,
    /// Per-chunk transform timeout, seconds.
    pub transform_timeout: u64,
    /// Transform argv template; `{input}` and `{output}` are substituted.
    pub transform_command: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_before: 0.5,
            buffer_after: 0.5,
            chunk_length: 30.0,
            overlap: 2.0,
            concurrency: 2,
            transform_timeout: 300,
            transform_command: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                config = toml::from_str(&contents).map_err(|e| {
                    AudiocutError::Config(format!(
                        "failed to parse {}: {e}",
                        config_path.display()
                    ))
                })?;
            }
        }

        // Override with environment variables
        if let Ok(value) = std::env::var("AUDIOCUT_CHUNK_LENGTH") {
            if let Ok(v) = value.parse() {
                config.chunk_length = v;
            }
        }
        if let Ok(value) = std::env::var("AUDIOCUT_OVERLAP") {
            if let Ok(v) = value.parse() {
                config.overlap = v;
            }
        }
        if let Ok(value) = std::env::var("AUDIOCUT_CONCURRENCY") {
            if let Ok(v) = value.parse() {
                config.concurrency = v;
            }
        }
        if let Ok(value) = std::env::var("AUDIOCUT_TIMEOUT") {
            if let Ok(v) = value.parse() {
                config.transform_timeout = v;
            }
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffer_before < 0.0 || self.buffer_after < 0.0 {
            return Err(AudiocutError::Config(
                "Buffers must not be negative".to_string(),
            ));
        }
        if self.chunk_length <= 0.0 {
            return Err(AudiocutError::Config(
                "Chunk length must be positive".to_string(),
            ));
        }
        if self.overlap < 0.0 || self.overlap >= self.chunk_length {
            return Err(AudiocutError::Config(
                "Overlap must be >= 0 and smaller than the chunk length".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(AudiocutError::Config(
                "Concurrency must be greater than 0".to_string(),
            ));
        }
        if self.transform_timeout == 0 {
            return Err(AudiocutError::Config(
                "Transform timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("audiocut").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.chunk_length, 30.0);
        assert_eq!(config.overlap, 2.0);
    }

    #[test]
    fn test_validate_rejects_bad_overlap() {
        let config = Config {
            overlap: 30.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            overlap: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = Config {
            concurrency: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_buffers() {
        let config = Config {
            buffer_before: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("concurrency = 8").unwrap();
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.chunk_length, 30.0);
    }

    #[test]
    fn test_transform_command_from_toml() {
        let config: Config =
            toml::from_str(r#"transform_command = ["rvc", "{input}", "{output}"]"#).unwrap();
        assert_eq!(
            config.transform_command,
            Some(vec![
                "rvc".to_string(),
                "{input}".to_string(),
                "{output}".to_string()
            ])
        );
    }
}
