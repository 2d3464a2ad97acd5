//! # Ledger Values
//!
//! Contract arguments, keys, choice arguments and results as they arrive from
//! the synchronization layer. The index never interprets them; it hands them
//! to an injected serializer.

use crate::identifiers::{ContractId, Party, Timestamp};
use serde::{Deserialize, Serialize};

/// A ledger value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Unit,
    Bool(bool),
    Int64(i64),
    /// Decimal kept in its canonical textual form.
    Numeric(String),
    Text(String),
    Timestamp(Timestamp),
    Party(Party),
    ContractId(ContractId),
    Optional(Option<Box<Value>>),
    List(Vec<Value>),
    /// Record fields in declaration order.
    Record(Vec<(String, Value)>),
    Variant {
        constructor: String,
        value: Box<Value>,
    },
}

impl Value {
    /// Record from `(field, value)` pairs.
    pub fn record<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        Value::Record(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }
}

/// A value tagged with the transaction version it was produced under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedValue {
    pub version: u32,
    pub value: Value,
}

impl VersionedValue {
    /// Current transaction version used by fresh submissions.
    pub const LATEST_VERSION: u32 = 31;

    pub fn new(version: u32, value: Value) -> Self {
        Self { version, value }
    }

    /// Tag a value with [`Self::LATEST_VERSION`].
    pub fn latest(value: Value) -> Self {
        Self::new(Self::LATEST_VERSION, value)
    }
}
