//! Inbound Ports (Driving Ports / API)
//!
//! The only public contract of the subsystem.

use crate::domain::errors::ProjectionError;
use crate::domain::rows::IndexRow;
use shared_types::{Offset, TracedUpdate};

/// Projects committed updates into index rows.
pub trait UpdateProjection: Send + Sync {
    /// Project one update recorded at `offset`.
    ///
    /// Pure: identical inputs yield the identical row sequence. The rows are
    /// returned in the order the index writer must assign sequential ids.
    /// On error nothing is returned.
    fn project(&self, offset: Offset, update: &TracedUpdate)
        -> Result<Vec<IndexRow>, ProjectionError>;
}
