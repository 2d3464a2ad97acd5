//! Update Projector Service
//!
//! Main service implementing `UpdateProjection`.

use crate::adapters::BincodeValueSerializer;
use crate::algorithms::row_mapper::RowMapper;
use crate::algorithms::witness_calculator::visible_nodes;
use crate::config::ProjectorConfig;
use crate::domain::errors::ProjectionError;
use crate::domain::invariants::{
    invariant_at_most_one_completion, invariant_filters_follow_events, invariant_flat_within_tree,
    invariant_sequential_ids_unassigned, invariant_single_trailing_meta,
};
use crate::domain::rows::IndexRow;
use crate::ports::inbound::UpdateProjection;
use crate::ports::outbound::{CompressionStrategy, ValueSerializer};
use shared_types::{Offset, ParticipantId, TracedUpdate, Update};
use std::sync::Arc;

use tracing::{debug, warn};

/// Update Projector
///
/// Stateless: every call depends only on its arguments and the injected
/// strategies, so one instance may serve any number of threads.
///
/// Pipeline per update:
/// 1. Encode the trace context
/// 2. Walk the transaction, if any, for visible nodes and witnesses
/// 3. Map the update and its visible nodes to rows
#[derive(Clone)]
pub struct UpdateProjector {
    participant_id: ParticipantId,
    serializer: Arc<dyn ValueSerializer>,
    compression: CompressionStrategy,
}

impl UpdateProjector {
    pub fn new(
        participant_id: ParticipantId,
        serializer: Arc<dyn ValueSerializer>,
        compression: CompressionStrategy,
    ) -> Self {
        Self {
            participant_id,
            serializer,
            compression,
        }
    }

    /// Bincode serialization, compression per `config`.
    pub fn from_config(participant_id: ParticipantId, config: &ProjectorConfig) -> Self {
        Self::new(
            participant_id,
            Arc::new(BincodeValueSerializer),
            CompressionStrategy::from_config(&config.compression),
        )
    }

    /// Participant whose index is being populated.
    pub fn participant_id(&self) -> &ParticipantId {
        &self.participant_id
    }

    fn project_update(
        &self,
        offset: Offset,
        traced: &TracedUpdate,
    ) -> Result<Vec<IndexRow>, ProjectionError> {
        let mapper = RowMapper::new(
            self.serializer.as_ref(),
            &self.compression,
            &self.participant_id,
            offset,
            &traced.trace_context,
        )?;

        match &traced.update {
            Update::Init { .. } => Ok(Vec::new()),
            Update::PartyAddedToParticipant(update) => Ok(mapper.party_added(update)),
            Update::PartyAllocationRejected(update) => Ok(mapper.party_rejected(update)),
            Update::CommandRejected(update) => mapper.command_rejected(update),
            Update::TransactionAccepted(update) => {
                let visible = visible_nodes(&update.transaction)?;
                debug!(
                    update_id = %update.update_id,
                    nodes = update.transaction.len(),
                    visible = visible.len(),
                    "[pn-01] Transaction walked"
                );
                mapper.transaction_accepted(update, &visible)
            }
            Update::ReassignmentAccepted(update) => mapper.reassignment_accepted(update),
            Update::TopologyTransactionEffective(update) => Ok(mapper.topology_effective(update)),
            Update::SequencerIndexMoved(update) => Ok(mapper.sequencer_index_moved(update)),
        }
    }
}

impl std::fmt::Debug for UpdateProjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateProjector")
            .field("participant_id", &self.participant_id)
            .field("compression", &self.compression)
            .finish_non_exhaustive()
    }
}

fn has_summary_row(update: &Update) -> bool {
    matches!(
        update,
        Update::TransactionAccepted(_)
            | Update::ReassignmentAccepted(_)
            | Update::TopologyTransactionEffective(_)
    )
}

impl UpdateProjection for UpdateProjector {
    fn project(
        &self,
        offset: Offset,
        update: &TracedUpdate,
    ) -> Result<Vec<IndexRow>, ProjectionError> {
        let kind = update.update.kind();

        match self.project_update(offset, update) {
            Ok(rows) => {
                debug_assert!(invariant_flat_within_tree(&rows));
                debug_assert!(invariant_sequential_ids_unassigned(&rows));
                debug_assert!(invariant_filters_follow_events(&rows));
                debug_assert!(invariant_at_most_one_completion(&rows));
                debug_assert!(
                    !has_summary_row(&update.update) || invariant_single_trailing_meta(&rows)
                );

                debug!(
                    offset = %offset,
                    kind,
                    rows = rows.len(),
                    "[pn-01] Update projected"
                );
                Ok(rows)
            }
            Err(error) => {
                warn!(
                    offset = %offset,
                    kind,
                    error = %error,
                    "[pn-01] Update failed projection, halt ingestion for its domain"
                );
                Err(error)
            }
        }
    }
}
