//! # Column Compression
//!
//! Zstd and pass-through implementations of [`FieldCompressor`].

use crate::config::{ColumnCompressionConfig, CompressionAlgorithm};
use crate::domain::errors::CompressionError;
use crate::domain::rows::CompressionAlgorithmId;
use crate::ports::outbound::{CompressionStrategy, FieldCompressor};
use std::sync::Arc;

// =============================================================================
// ZSTD COMPRESSOR
// =============================================================================

/// Zstd-based column compressor.
#[derive(Debug, Clone, Copy)]
pub struct ZstdFieldCompressor {
    level: i32,
}

impl ZstdFieldCompressor {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Default for ZstdFieldCompressor {
    fn default() -> Self {
        Self::new(3)
    }
}

impl FieldCompressor for ZstdFieldCompressor {
    fn algorithm_id(&self) -> CompressionAlgorithmId {
        CompressionAlgorithm::Zstd.id()
    }

    fn compress(&self, bytes: Vec<u8>) -> Result<Vec<u8>, CompressionError> {
        zstd::encode_all(bytes.as_slice(), self.level).map_err(CompressionError::CompressFailed)
    }
}

// =============================================================================
// NO-OP COMPRESSOR
// =============================================================================

/// Stores bytes as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompression;

impl FieldCompressor for NoCompression {
    fn algorithm_id(&self) -> CompressionAlgorithmId {
        CompressionAlgorithm::None.id()
    }

    fn compress(&self, bytes: Vec<u8>) -> Result<Vec<u8>, CompressionError> {
        Ok(bytes)
    }
}

// =============================================================================
// STRATEGY CONSTRUCTION
// =============================================================================

fn compressor_for(algorithm: CompressionAlgorithm, level: i32) -> Arc<dyn FieldCompressor> {
    match algorithm {
        CompressionAlgorithm::None => Arc::new(NoCompression),
        CompressionAlgorithm::Zstd => Arc::new(ZstdFieldCompressor::new(level)),
    }
}

impl CompressionStrategy {
    /// No column is compressed.
    pub fn none() -> Self {
        Self::uniform(Arc::new(NoCompression))
    }

    /// Every column is zstd compressed at `level`.
    pub fn all_zstd(level: i32) -> Self {
        Self::uniform(Arc::new(ZstdFieldCompressor::new(level)))
    }

    pub fn from_config(config: &ColumnCompressionConfig) -> Self {
        let level = config.zstd_level;
        Self::new(
            compressor_for(config.create_argument, level),
            compressor_for(config.create_key_value, level),
            compressor_for(config.exercise_argument, level),
            compressor_for(config.exercise_result, level),
        )
    }
}
