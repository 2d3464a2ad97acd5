//! Outbound Ports (Driven Ports / SPI)
//!
//! Strategies injected into the projector: value serialization and per-column
//! compression. Both are called synchronously on the projecting thread and
//! must be fast, local and deterministic.

use crate::domain::errors::{CompressionError, SerializationError};
use crate::domain::rows::CompressionAlgorithmId;
use shared_types::{ContractId, CreateNode, EventId, ExerciseNode, VersionedValue};
use std::sync::Arc;

/// Serialized payloads of a create node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedCreate {
    pub argument: Vec<u8>,
    pub key: Option<Vec<u8>>,
}

/// Serialized payloads of an exercise node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedExercise {
    pub argument: Vec<u8>,
    pub result: Option<Vec<u8>>,
    pub key: Option<Vec<u8>>,
}

/// Value serialization strategy.
///
/// Must produce identical bytes for identical logical values. Any error fails
/// the projection of the whole update.
pub trait ValueSerializer: Send + Sync {
    /// Serialize one value belonging to `contract_id`.
    fn serialize_value(
        &self,
        contract_id: &ContractId,
        value: &VersionedValue,
    ) -> Result<Vec<u8>, SerializationError>;

    /// Serialize the argument and, if present, the key of a create node.
    fn serialize_create(
        &self,
        create: &CreateNode,
    ) -> Result<SerializedCreate, SerializationError> {
        let argument = self.serialize_value(&create.contract_id, &create.argument)?;
        let key = create
            .key
            .as_ref()
            .map(|key| self.serialize_value(&create.contract_id, &key.value))
            .transpose()?;
        Ok(SerializedCreate { argument, key })
    }

    /// Serialize the choice argument, result and key of an exercise node.
    fn serialize_exercise(
        &self,
        _event_id: &EventId,
        exercise: &ExerciseNode,
    ) -> Result<SerializedExercise, SerializationError> {
        let contract_id = &exercise.target_contract_id;
        let argument = self.serialize_value(contract_id, &exercise.chosen_value)?;
        let result = exercise
            .exercise_result
            .as_ref()
            .map(|result| self.serialize_value(contract_id, result))
            .transpose()?;
        let key = exercise
            .key
            .as_ref()
            .map(|key| self.serialize_value(contract_id, &key.value))
            .transpose()?;
        Ok(SerializedExercise {
            argument,
            result,
            key,
        })
    }
}

/// Compressor for a single column family.
pub trait FieldCompressor: Send + Sync {
    /// Algorithm tag stored next to the bytes; `None` means uncompressed.
    fn algorithm_id(&self) -> CompressionAlgorithmId;

    fn compress(&self, bytes: Vec<u8>) -> Result<Vec<u8>, CompressionError>;
}

/// One independent compressor per compressed column family.
#[derive(Clone)]
pub struct CompressionStrategy {
    pub create_argument: Arc<dyn FieldCompressor>,
    pub create_key_value: Arc<dyn FieldCompressor>,
    pub exercise_argument: Arc<dyn FieldCompressor>,
    pub exercise_result: Arc<dyn FieldCompressor>,
}

impl CompressionStrategy {
    pub fn new(
        create_argument: Arc<dyn FieldCompressor>,
        create_key_value: Arc<dyn FieldCompressor>,
        exercise_argument: Arc<dyn FieldCompressor>,
        exercise_result: Arc<dyn FieldCompressor>,
    ) -> Self {
        Self {
            create_argument,
            create_key_value,
            exercise_argument,
            exercise_result,
        }
    }

    /// Same compressor for every column.
    pub fn uniform(compressor: Arc<dyn FieldCompressor>) -> Self {
        Self::new(
            compressor.clone(),
            compressor.clone(),
            compressor.clone(),
            compressor,
        )
    }
}

impl std::fmt::Debug for CompressionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompressionStrategy")
            .field("create_argument", &self.create_argument.algorithm_id())
            .field("create_key_value", &self.create_key_value.algorithm_id())
            .field("exercise_argument", &self.exercise_argument.algorithm_id())
            .field("exercise_result", &self.exercise_result.algorithm_id())
            .finish()
    }
}
