//! # Ledger Identifiers
//!
//! Scalar identifiers shared by the synchronization layer and the index.
//!
//! All of them are thin newtypes over strings or integers so they persist as
//! single columns while keeping distinct types at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Implements the common string-newtype surface (constructor, `as_str`,
/// `Display`, `From<&str>`, `From<String>`).
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// A ledger party.
    Party
);
string_id!(
    /// Identifier of a participant node.
    ParticipantId
);
string_id!(
    /// Identifier of a synchronization domain.
    DomainId
);
string_id!(
    /// Identifier of a contract instance.
    ContractId
);
string_id!(
    /// Identifier of a committed update (transaction id, reassignment id, ...).
    UpdateId
);
string_id!(
    /// Package name a template belongs to.
    PackageName
);

/// Application that submitted a command.
pub type ApplicationId = String;

/// Client-chosen command identifier.
pub type CommandId = String;

/// Identifier of a submission attempt.
pub type SubmissionId = String;

/// Workflow identifier attached to a transaction.
pub type WorkflowId = String;

/// Absolute position in the participant's ledger.
///
/// Offsets are strictly increasing; the projector only passes them through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Offset(pub u64);

impl Offset {
    /// Fixed-width lowercase hex form of the offset.
    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Construct from microseconds since the epoch.
    pub fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Microseconds since the epoch.
    pub fn micros(self) -> i64 {
        self.0
    }
}

/// Stable index of a node inside a transaction.
///
/// [`TransactionBuilder`](crate::TransactionBuilder) hands these out in
/// insertion order, so they are pre-order only for depth-first construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Raw index.
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a single event: an update plus the node that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    pub update_id: UpdateId,
    pub node_id: NodeId,
}

impl EventId {
    pub fn new(update_id: UpdateId, node_id: NodeId) -> Self {
        Self { update_id, node_id }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.update_id, self.node_id)
    }
}

/// Fully qualified template identifier (`package:module:entity`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TemplateId {
    pub package_id: String,
    pub module_name: String,
    pub entity_name: String,
}

impl TemplateId {
    pub fn new(
        package_id: impl Into<String>,
        module_name: impl Into<String>,
        entity_name: impl Into<String>,
    ) -> Self {
        Self {
            package_id: package_id.into(),
            module_name: module_name.into(),
            entity_name: entity_name.into(),
        }
    }

    /// Parse the `package:module:entity` form.
    ///
    /// Returns `None` unless there are exactly three non-empty segments.
    pub fn parse(qualified: &str) -> Option<Self> {
        let mut parts = qualified.split(':');
        let (package, module, entity) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || package.is_empty() || module.is_empty() || entity.is_empty() {
            return None;
        }
        Some(Self::new(package, module, entity))
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.package_id, self.module_name, self.entity_name
        )
    }
}
