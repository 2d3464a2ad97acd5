//! Error types for the Index Projector
//!
//! Projection is all-or-nothing per update: any error below aborts the whole
//! update and no rows are returned.

use shared_types::NodeId;
use thiserror::Error;

/// All errors that can occur while projecting an update
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The injected value serializer failed
    #[error("Serialization failed for {event}: {source}")]
    Serialization {
        event: String,
        #[source]
        source: SerializationError,
    },

    /// A column compressor failed
    #[error("Compression of {column} failed: {source}")]
    Compression {
        column: &'static str,
        #[source]
        source: CompressionError,
    },

    /// The trace context could not be encoded
    #[error("Trace context encoding failed: {0}")]
    TraceContext(String),

    /// A root or child id has no node in the transaction arena
    #[error("Dangling node reference: {0}")]
    DanglingNode(NodeId),

    /// A node id is reachable through more than one parent
    #[error("Node {0} is referenced more than once")]
    RepeatedNode(NodeId),

    /// A deduplication duration does not fit the signed seconds column
    #[error("Deduplication duration of {seconds}s is out of range")]
    DeduplicationOutOfRange { seconds: u64 },
}

impl ProjectionError {
    /// Whether the failure came from an injected strategy rather than the
    /// update itself.
    pub fn is_strategy_failure(&self) -> bool {
        matches!(
            self,
            ProjectionError::Serialization { .. } | ProjectionError::Compression { .. }
        )
    }
}

/// Error raised by a value serializer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot serialize {context}: {reason}")]
pub struct SerializationError {
    pub context: String,
    pub reason: String,
}

impl SerializationError {
    pub fn new(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

/// Error raised by a field compressor
#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("Compression failed: {0}")]
    CompressFailed(#[from] std::io::Error),

    #[error("Compression rejected: {0}")]
    Rejected(String),
}

/// Errors raised while resolving sequential id placeholders
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequencingError {
    /// Placeholders are resolved exactly once
    #[error("Row {index} already carries a sequential id")]
    AlreadyAssigned { index: usize },

    /// An id filter row must follow the event it indexes
    #[error("Id filter row {index} has no preceding event row")]
    OrphanFilterRow { index: usize },

    #[error("Sequential id space exhausted")]
    Overflow,
}

/// Invalid projector configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}
