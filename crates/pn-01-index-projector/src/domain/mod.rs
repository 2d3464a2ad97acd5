//! # Domain Layer
//!
//! Pure domain logic for the Index Projector: the row family, witness value
//! objects, errors, invariants and contract key hashing.
//!
//! ## Hexagonal Architecture
//!
//! This module contains NO I/O dependencies. Value serialization and column
//! compression are reached only through the ports in the `ports` module.

pub mod errors;
pub mod invariants;
pub mod key_hash;
pub mod rows;
pub mod witnesses;

pub use errors::*;
pub use key_hash::hash_contract_key;
pub use rows::*;
pub use witnesses::*;
