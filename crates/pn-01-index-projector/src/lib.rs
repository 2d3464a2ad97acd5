//! # PN-01: Index Projector Subsystem
//!
//! Turns committed ledger updates into the ordered rows of the participant's
//! local index: event rows, per-party id filter rows, completions and
//! summaries.
//!
//! ## Architecture
//!
//! - **Domain**: Row family, witness sets, invariants, contract key hashing
//! - **Algorithms**: Witness calculation, row mapping, sequential id assignment
//! - **Ports**: Inbound (UpdateProjection) and Outbound (ValueSerializer, FieldCompressor)
//! - **Application**: Projector orchestration and ordered batch projection
//! - **Adapters**: Bincode serializer, zstd and pass-through compressors
//!
//! ## Guarantees
//!
//! - Nothing below a rollback node is ever indexed.
//! - Flat witnesses are always contained in tree witnesses.
//! - Sequential ids are left `Unassigned`; the index writer resolves them
//!   with [`assign_sequential_ids`] in the returned row order.
//! - A failed update yields an error and no rows.

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::{BincodeValueSerializer, NoCompression, ZstdFieldCompressor};
pub use algorithms::sequential_ids::assign_sequential_ids;
pub use algorithms::witness_calculator::{visible_nodes, VisibleNode};
pub use application::batch::{project_batch, PARALLEL_THRESHOLD};
pub use application::service::UpdateProjector;
pub use config::{ColumnCompressionConfig, CompressionAlgorithm, ProjectorConfig};
pub use domain::errors::{
    CompressionError, ConfigError, ProjectionError, SequencingError, SerializationError,
};
pub use domain::rows::*;
pub use domain::witnesses::{WitnessSet, Witnesses};
pub use ports::inbound::UpdateProjection;
pub use ports::outbound::{
    CompressionStrategy, FieldCompressor, SerializedCreate, SerializedExercise, ValueSerializer,
};
