//! # Ordered Batch Projection
//!
//! Projects a run of updates, in parallel above a size threshold.
//!
//! Output order always equals input order. Rayon's indexed collect keeps the
//! position of every result, and collecting into `Result` stops at the first
//! failure, so a failed batch returns no rows at all.

use crate::domain::errors::ProjectionError;
use crate::domain::rows::IndexRow;
use crate::ports::inbound::UpdateProjection;
use rayon::prelude::*;
use shared_types::{Offset, TracedUpdate};
use std::time::Instant;
use tracing::info;

/// Default parallel threshold - use sequential for small batches.
pub const PARALLEL_THRESHOLD: usize = 4;

/// Project `updates` and concatenate their rows in input order.
pub fn project_batch<P>(
    projector: &P,
    updates: &[(Offset, TracedUpdate)],
    parallel_threshold: usize,
) -> Result<Vec<IndexRow>, ProjectionError>
where
    P: UpdateProjection + ?Sized,
{
    let started = Instant::now();

    let per_update: Vec<Vec<IndexRow>> = if updates.len() < parallel_threshold {
        // Sequential for small batches
        updates
            .iter()
            .map(|(offset, update)| projector.project(*offset, update))
            .collect::<Result<_, _>>()?
    } else {
        // Parallel for large batches
        updates
            .par_iter()
            .map(|(offset, update)| projector.project(*offset, update))
            .collect::<Result<_, _>>()?
    };

    let rows: Vec<IndexRow> = per_update.into_iter().flatten().collect();

    info!(
        updates = updates.len(),
        rows = rows.len(),
        parallel = updates.len() >= parallel_threshold,
        elapsed_us = started.elapsed().as_micros() as u64,
        "[pn-01] Batch projected"
    );

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::service::UpdateProjector;
    use crate::config::ProjectorConfig;
    use shared_types::{
        DomainId, ParticipantId, SequencerIndex, SequencerIndexMoved, Timestamp, Update,
    };

    fn default_projector() -> UpdateProjector {
        UpdateProjector::from_config(ParticipantId::new("p1"), &ProjectorConfig::default())
    }

    fn moved(domain: &str) -> TracedUpdate {
        TracedUpdate::untraced(Update::SequencerIndexMoved(SequencerIndexMoved {
            domain_id: DomainId::new(domain),
            sequencer_index: SequencerIndex {
                counter: 1,
                timestamp: Timestamp(1),
            },
            request_counter: None,
        }))
    }

    fn domains(rows: &[IndexRow]) -> Vec<String> {
        rows.iter()
            .map(|row| match row {
                IndexRow::SequencerIndexMoved(moved) => moved.domain_id.to_string(),
                other => panic!("unexpected row {}", other.kind()),
            })
            .collect()
    }

    #[test]
    fn test_parallel_threshold() {
        assert!(PARALLEL_THRESHOLD >= 2);
        assert_eq!(
            PARALLEL_THRESHOLD,
            ProjectorConfig::default().parallel_threshold
        );
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let projector = default_projector();
        let updates: Vec<(Offset, TracedUpdate)> = (0..32)
            .map(|i| (Offset(i), moved(&format!("d{}", i))))
            .collect();

        let sequential = project_batch(&projector, &updates, usize::MAX).unwrap();
        let parallel = project_batch(&projector, &updates, 1).unwrap();

        assert_eq!(sequential, parallel);
        let expected: Vec<String> = (0..32).map(|i| format!("d{}", i)).collect();
        assert_eq!(domains(&parallel), expected);
    }

    #[test]
    fn test_empty_batch() {
        let projector = default_projector();
        let rows = project_batch(&projector, &[], PARALLEL_THRESHOLD);
        assert!(rows.unwrap().is_empty());
    }
}
