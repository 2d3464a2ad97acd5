//! Application layer for the Index Projector
//!
//! - `service` - the `UpdateProjector` orchestrator
//! - `batch` - ordered projection of update runs

pub mod batch;
pub mod service;

pub use batch::{project_batch, PARALLEL_THRESHOLD};
pub use service::UpdateProjector;
