//! # Shared Types Crate
//!
//! Ledger data that crosses subsystem boundaries: identifiers, values,
//! committed transaction trees and the updates delivered by the
//! synchronization layer.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Every subsystem consuming updates uses these
//!   definitions.
//! - **Closed Sum Types**: `Update` and `Node` are exhaustive enums; adding a
//!   variant is a compile error for every consumer that matches on them.
//! - **Arena Trees**: Transaction nodes are addressed by stable `NodeId`s.

pub mod errors;
pub mod identifiers;
pub mod transaction;
pub mod update;
pub mod value;

pub use errors::*;
pub use identifiers::*;
pub use transaction::*;
pub use update::*;
pub use value::*;
