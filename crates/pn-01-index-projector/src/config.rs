//! Projector configuration from environment variables.

use crate::domain::errors::ConfigError;
use crate::domain::rows::CompressionAlgorithmId;
use serde::{Deserialize, Serialize};
use std::env;

/// Column compression algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    #[default]
    None,
    Zstd,
}

impl CompressionAlgorithm {
    /// Algorithm tag stored next to compressed bytes.
    pub fn id(self) -> CompressionAlgorithmId {
        match self {
            CompressionAlgorithm::None => None,
            CompressionAlgorithm::Zstd => Some(1),
        }
    }

    fn parse(key: &'static str, raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(CompressionAlgorithm::None),
            "zstd" => Ok(CompressionAlgorithm::Zstd),
            _ => Err(ConfigError::InvalidValue {
                key,
                value: raw.to_string(),
            }),
        }
    }
}

/// Per-column compression settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCompressionConfig {
    pub create_argument: CompressionAlgorithm,
    pub create_key_value: CompressionAlgorithm,
    pub exercise_argument: CompressionAlgorithm,
    pub exercise_result: CompressionAlgorithm,
    /// Zstd compression level (1-22, default 3)
    pub zstd_level: i32,
}

impl Default for ColumnCompressionConfig {
    fn default() -> Self {
        Self::uniform(CompressionAlgorithm::None)
    }
}

impl ColumnCompressionConfig {
    /// Same algorithm for every column.
    pub fn uniform(algorithm: CompressionAlgorithm) -> Self {
        Self {
            create_argument: algorithm,
            create_key_value: algorithm,
            exercise_argument: algorithm,
            exercise_result: algorithm,
            zstd_level: 3,
        }
    }
}

/// Configuration for the index projector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectorConfig {
    pub compression: ColumnCompressionConfig,
    /// Batches at least this large are projected on the rayon pool.
    pub parallel_threshold: usize,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            compression: ColumnCompressionConfig::default(),
            parallel_threshold: 4,
        }
    }
}

impl ProjectorConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `PN_COMPRESSION`: `zstd` or `none` for every column (default: none)
    /// - `PN_COMPRESS_CREATE_ARGUMENT`: overrides the create argument column
    /// - `PN_COMPRESS_CREATE_KEY`: overrides the create key column
    /// - `PN_COMPRESS_EXERCISE_ARGUMENT`: overrides the exercise argument column
    /// - `PN_COMPRESS_EXERCISE_RESULT`: overrides the exercise result column
    /// - `PN_ZSTD_LEVEL`: zstd level (default: 3)
    /// - `PN_PARALLEL_THRESHOLD`: batch size switching to rayon (default: 4)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("PN_COMPRESSION") {
            let algorithm = CompressionAlgorithm::parse("PN_COMPRESSION", &raw)?;
            config.compression = ColumnCompressionConfig::uniform(algorithm);
        }

        let columns: [(&'static str, &mut CompressionAlgorithm); 4] = [
            (
                "PN_COMPRESS_CREATE_ARGUMENT",
                &mut config.compression.create_argument,
            ),
            (
                "PN_COMPRESS_CREATE_KEY",
                &mut config.compression.create_key_value,
            ),
            (
                "PN_COMPRESS_EXERCISE_ARGUMENT",
                &mut config.compression.exercise_argument,
            ),
            (
                "PN_COMPRESS_EXERCISE_RESULT",
                &mut config.compression.exercise_result,
            ),
        ];
        for (key, column) in columns {
            if let Some(raw) = lookup(key) {
                *column = CompressionAlgorithm::parse(key, &raw)?;
            }
        }

        if let Some(raw) = lookup("PN_ZSTD_LEVEL") {
            config.compression.zstd_level = match raw.trim().parse::<i32>() {
                Ok(level) if (1..=22).contains(&level) => level,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "PN_ZSTD_LEVEL",
                        value: raw,
                    })
                }
            };
        }

        if let Some(raw) = lookup("PN_PARALLEL_THRESHOLD") {
            config.parallel_threshold =
                raw.trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: "PN_PARALLEL_THRESHOLD",
                        value: raw.clone(),
                    })?;
        }

        Ok(config)
    }
}
