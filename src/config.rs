//! # Configuration Management
//!
//! Centralized configuration for hosts embedding the codec.
//!
//! The codec itself holds no hardcoded token lists: the host supplies the
//! dictionary here, along with the hardening limits and logging settings.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-specific overrides via `from_env()`
//!
//! ## Example
//! ```toml
//! [dictionary]
//! version = 1
//! tags = ["iq", "query", "message"]
//! single_byte = ["stream:start"]
//! double_byte = ["offer", "audio"]
//!
//! [limits]
//! max_depth = 64
//! max_frame_size = 16777216
//! ```

use crate::core::codec::NodeCodec;
use crate::core::marker::{MAX_DOUBLE_BYTE_TOKENS, MAX_SINGLE_BYTE_TOKENS};
use crate::error::{CodecError, Result};
use crate::protocol::dictionary::TokenDictionary;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::Level;

/// Default bound on node nesting (the root is depth 1)
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Hard ceiling accepted for `max_depth`
pub const MAX_DEPTH_CEILING: usize = 4096;

/// Max allowed encoded frame size (16 MB)
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Top-level codec configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CodecConfig {
    /// Token lists shared with the peer
    #[serde(default)]
    pub dictionary: DictionaryConfig,

    /// Hardening limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CodecConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| CodecError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| CodecError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| CodecError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Defaults, overridden by environment variables where set
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(depth) = std::env::var("BINARY_NODE_MAX_DEPTH") {
            config.limits.max_depth = depth.parse::<usize>().map_err(|e| {
                CodecError::ConfigError(format!("Invalid BINARY_NODE_MAX_DEPTH '{depth}': {e}"))
            })?;
        }

        if let Ok(size) = std::env::var("BINARY_NODE_MAX_FRAME_SIZE") {
            config.limits.max_frame_size = size.parse::<usize>().map_err(|e| {
                CodecError::ConfigError(format!(
                    "Invalid BINARY_NODE_MAX_FRAME_SIZE '{size}': {e}"
                ))
            })?;
        }

        if let Ok(level) = std::env::var("BINARY_NODE_LOG_LEVEL") {
            config.logging.log_level = level.parse::<Level>().map_err(|_| {
                CodecError::ConfigError(format!("Invalid BINARY_NODE_LOG_LEVEL '{level}'"))
            })?;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CodecError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| CodecError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.dictionary.validate());
        errors.extend(self.limits.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CodecError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }

    /// Build the token dictionary described by this configuration
    pub fn build_dictionary(&self) -> Result<TokenDictionary> {
        TokenDictionary::from_config(&self.dictionary)
    }

    /// Validate, then build a streaming codec with these limits
    pub fn build_codec(&self) -> Result<NodeCodec> {
        self.validate_strict()?;
        let dictionary = Arc::new(self.build_dictionary()?);
        Ok(NodeCodec::new(dictionary)
            .with_max_depth(self.limits.max_depth)
            .with_max_frame_size(self.limits.max_frame_size))
    }
}

/// Ordered token lists. `tags` and `single_byte` share the single-byte code
/// space, in that order; `double_byte` fills the escaped table.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DictionaryConfig {
    /// Version number of this token table
    #[serde(default)]
    pub version: u32,

    /// Common tag names
    #[serde(default)]
    pub tags: Vec<String>,

    /// Further single-byte tokens
    #[serde(default)]
    pub single_byte: Vec<String>,

    /// Double-byte tokens
    #[serde(default)]
    pub double_byte: Vec<String>,
}

impl DictionaryConfig {
    /// Validate dictionary configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let single_count = self.tags.len() + self.single_byte.len();
        if single_count > MAX_SINGLE_BYTE_TOKENS - 1 {
            errors.push(format!(
                "Too many single-byte tokens: {} (maximum: {})",
                single_count,
                MAX_SINGLE_BYTE_TOKENS - 1
            ));
        }

        if self.double_byte.len() > MAX_DOUBLE_BYTE_TOKENS {
            errors.push(format!(
                "Too many double-byte tokens: {} (maximum: {})",
                self.double_byte.len(),
                MAX_DOUBLE_BYTE_TOKENS
            ));
        }

        let mut seen = HashSet::new();
        for entry in self
            .tags
            .iter()
            .chain(&self.single_byte)
            .chain(&self.double_byte)
        {
            if entry.is_empty() {
                errors.push("Dictionary entries cannot be empty".to_string());
            } else if !seen.insert(entry.as_str()) {
                errors.push(format!("Duplicate dictionary entry: '{entry}'"));
            }
        }

        errors
    }
}

/// Hardening limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Maximum node nesting depth
    pub max_depth: usize,

    /// Maximum encoded size of a single frame in bytes
    pub max_frame_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_frame_size: MAX_FRAME_SIZE,
        }
    }
}

impl LimitsConfig {
    /// Validate limits configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_depth == 0 {
            errors.push("Max depth must be greater than 0".to_string());
        } else if self.max_depth > MAX_DEPTH_CEILING {
            errors.push(format!(
                "Max depth too large: {} (maximum: {MAX_DEPTH_CEILING})",
                self.max_depth
            ));
        }

        // smallest possible node: list-start, tag, attribute count, list-end
        if self.max_frame_size < 4 {
            errors.push("Max frame size too small (minimum: 4 bytes)".to_string());
        } else if self.max_frame_size > 1024 * 1024 * 1024 {
            errors.push(format!(
                "Max frame size too large: {} bytes (maximum: 1 GB)",
                self.max_frame_size
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("binary-node"),
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
