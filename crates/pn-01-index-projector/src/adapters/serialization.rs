//! Bincode value serializer.
//!
//! Encodes the versioned value as a whole, version tag included. Bincode is
//! deterministic for the closed [`shared_types::Value`] type: records keep
//! their field order and party sets are ordered.

use crate::domain::errors::SerializationError;
use crate::ports::outbound::ValueSerializer;
use shared_types::{ContractId, VersionedValue};

#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeValueSerializer;

impl ValueSerializer for BincodeValueSerializer {
    fn serialize_value(
        &self,
        contract_id: &ContractId,
        value: &VersionedValue,
    ) -> Result<Vec<u8>, SerializationError> {
        bincode::serialize(value)
            .map_err(|e| SerializationError::new(contract_id.to_string(), e.to_string()))
    }
}
