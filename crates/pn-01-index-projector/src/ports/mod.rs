//! Ports module for the Index Projector
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::UpdateProjection;
pub use outbound::{
    CompressionStrategy, FieldCompressor, SerializedCreate, SerializedExercise, ValueSerializer,
};
