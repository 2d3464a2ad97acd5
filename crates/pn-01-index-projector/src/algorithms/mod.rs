//! Algorithms module for the Index Projector
//!
//! - Witness calculation with rollback exclusion
//! - Row mapping per update kind
//! - Writer-side sequential id assignment

pub mod row_mapper;
pub mod sequential_ids;
pub mod witness_calculator;

pub use row_mapper::{deduplication_columns, encode_trace_context, DeduplicationColumns, RowMapper};
pub use sequential_ids::assign_sequential_ids;
pub use witness_calculator::{reassignment_witnesses, visible_nodes, VisibleNode};
