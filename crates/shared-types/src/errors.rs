//! # Error Types
//!
//! Errors raised while assembling shared ledger structures.

use crate::identifiers::NodeId;
use thiserror::Error;

/// Errors raised by [`crate::TransactionBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// The referenced parent was never added.
    #[error("Unknown parent node: {0}")]
    UnknownParent(NodeId),

    /// Only exercise and rollback nodes can hold children.
    #[error("Node {parent} is a {kind} node and cannot have children")]
    LeafParent { parent: NodeId, kind: &'static str },
}
