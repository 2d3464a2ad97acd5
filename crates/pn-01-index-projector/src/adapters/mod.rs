//! Adapters module for the Index Projector
//!
//! Default production strategies plugged into the outbound ports.

pub mod compression;
pub mod serialization;

pub use compression::{NoCompression, ZstdFieldCompressor};
pub use serialization::BincodeValueSerializer;
