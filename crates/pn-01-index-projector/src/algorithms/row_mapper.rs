//! # Row Mapper
//!
//! Turns one update, plus the visible nodes of its transaction, into the
//! ordered rows of the index.
//!
//! ## Row Order
//!
//! | Update | Rows |
//! |--------|------|
//! | `TransactionAccepted` | per visible node: event, then its id filters; completion; meta |
//! | `ReassignmentAccepted` | event, its id filters; completion; meta |
//! | `TopologyTransactionEffective` | one event per topology event; meta |
//! | `CommandRejected` | completion |
//! | Party updates | party entry |
//! | `SequencerIndexMoved` | position row |
//!
//! Completions are emitted only when the update carries completion info.

use crate::algorithms::witness_calculator::{reassignment_witnesses, VisibleNode};
use crate::domain::errors::{ProjectionError, SerializationError};
use crate::domain::key_hash::hash_contract_key;
use crate::domain::rows::{
    CommandCompletion, CompressionAlgorithmId, EventAssign, EventCreate, EventExercise,
    EventPartyToParticipant, EventSequentialId, EventUnassign, IdFilterAssignStakeholder,
    IdFilterConsumingNonStakeholderInformee, IdFilterConsumingStakeholder,
    IdFilterCreateStakeholder, IdFilterNonConsumingInformee, IdFilterUnassignStakeholder, IndexRow,
    PartyEntry, PartyEntryKind, SequencerIndexMoved as SequencerIndexMovedRow, TransactionMeta,
};
use crate::domain::witnesses::Witnesses;
use crate::ports::outbound::{CompressionStrategy, FieldCompressor, ValueSerializer};
use shared_types::{
    Assign, AuthorizationEvent, AuthorizationLevel, CommandRejected, CompletionInfo, CreateNode,
    DeduplicationPeriod, DomainId, DomainIndex, EventId, ExerciseNode, Node, Offset, ParticipantId,
    PartyAddedToParticipant, PartyAllocationRejected, Reassignment, ReassignmentAccepted,
    SequencerIndexMoved, Timestamp, TopologyEvent, TopologyTransactionEffective, TraceContext,
    TransactionAccepted, Unassign, UpdateId,
};
use std::fmt::Display;
use tracing::trace;

// =============================================================================
// COLUMN ENCODINGS
// =============================================================================

/// Bincode encoding of the trace context stored in every traced row.
pub fn encode_trace_context(trace_context: &TraceContext) -> Result<Vec<u8>, ProjectionError> {
    bincode::serialize(trace_context)
        .map_err(|e| ProjectionError::TraceContext(e.to_string()))
}

/// Deduplication columns of a completion row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeduplicationColumns {
    pub offset: Option<Offset>,
    pub duration_seconds: Option<i64>,
    pub duration_nanos: Option<i32>,
}

/// Exactly one representation is populated; none when the period is absent.
///
/// Durations whose whole seconds exceed `i64::MAX` cannot be stored and fail
/// the update.
pub fn deduplication_columns(
    period: Option<&DeduplicationPeriod>,
) -> Result<DeduplicationColumns, ProjectionError> {
    let columns = match period {
        None => DeduplicationColumns::default(),
        Some(DeduplicationPeriod::Offset(offset)) => DeduplicationColumns {
            offset: Some(*offset),
            ..DeduplicationColumns::default()
        },
        Some(DeduplicationPeriod::Duration(duration)) => {
            let seconds = duration.as_secs();
            let duration_seconds = i64::try_from(seconds)
                .map_err(|_| ProjectionError::DeduplicationOutOfRange { seconds })?;
            DeduplicationColumns {
                offset: None,
                duration_seconds: Some(duration_seconds),
                duration_nanos: Some(duration.subsec_nanos() as i32),
            }
        }
    };
    Ok(columns)
}

/// `(authorization_event, participant_permission)` columns.
pub fn authorization_columns(event: &AuthorizationEvent) -> (i32, Option<i32>) {
    match event {
        AuthorizationEvent::Added(level) => (1, Some(permission_code(*level))),
        AuthorizationEvent::Revoked => (2, None),
        AuthorizationEvent::ChangedTo(level) => (3, Some(permission_code(*level))),
    }
}

fn permission_code(level: AuthorizationLevel) -> i32 {
    match level {
        AuthorizationLevel::Submission => 1,
        AuthorizationLevel::Confirmation => 2,
        AuthorizationLevel::Observation => 3,
    }
}

fn compress(
    compressor: &dyn FieldCompressor,
    column: &'static str,
    bytes: Vec<u8>,
) -> Result<(Vec<u8>, CompressionAlgorithmId), ProjectionError> {
    let algorithm = compressor.algorithm_id();
    let compressed = compressor
        .compress(bytes)
        .map_err(|source| ProjectionError::Compression { column, source })?;
    Ok((compressed, algorithm))
}

/// Absent payloads carry no algorithm tag.
fn compress_optional(
    compressor: &dyn FieldCompressor,
    column: &'static str,
    bytes: Option<Vec<u8>>,
) -> Result<(Option<Vec<u8>>, CompressionAlgorithmId), ProjectionError> {
    match bytes {
        Some(bytes) => {
            let (compressed, algorithm) = compress(compressor, column, bytes)?;
            Ok((Some(compressed), algorithm))
        }
        None => Ok((None, None)),
    }
}

fn serialization_failure(event: impl Display, source: SerializationError) -> ProjectionError {
    ProjectionError::Serialization {
        event: event.to_string(),
        source,
    }
}

// =============================================================================
// ROW MAPPER
// =============================================================================

/// Maps the updates recorded at one offset.
pub struct RowMapper<'a> {
    serializer: &'a dyn ValueSerializer,
    compression: &'a CompressionStrategy,
    participant_id: &'a ParticipantId,
    offset: Offset,
    trace_context: Vec<u8>,
}

impl<'a> RowMapper<'a> {
    pub fn new(
        serializer: &'a dyn ValueSerializer,
        compression: &'a CompressionStrategy,
        participant_id: &'a ParticipantId,
        offset: Offset,
        trace_context: &TraceContext,
    ) -> Result<Self, ProjectionError> {
        Ok(Self {
            serializer,
            compression,
            participant_id,
            offset,
            trace_context: encode_trace_context(trace_context)?,
        })
    }

    // -------------------------------------------------------------------------
    // Party management
    // -------------------------------------------------------------------------

    pub fn party_added(&self, update: &PartyAddedToParticipant) -> Vec<IndexRow> {
        vec![IndexRow::PartyEntry(PartyEntry {
            ledger_offset: self.offset,
            recorded_at: update.record_time,
            submission_id: update.submission_id.clone(),
            party: Some(update.party.clone()),
            display_name: Some(update.display_name.clone()),
            typ: PartyEntryKind::Accept,
            rejection_reason: None,
            is_local: Some(update.participant_id == *self.participant_id),
        })]
    }

    pub fn party_rejected(&self, update: &PartyAllocationRejected) -> Vec<IndexRow> {
        vec![IndexRow::PartyEntry(PartyEntry {
            ledger_offset: self.offset,
            recorded_at: update.record_time,
            submission_id: Some(update.submission_id.clone()),
            party: None,
            display_name: None,
            typ: PartyEntryKind::Reject,
            rejection_reason: Some(update.rejection_reason.clone()),
            is_local: None,
        })]
    }

    // -------------------------------------------------------------------------
    // Completions
    // -------------------------------------------------------------------------

    pub fn command_rejected(
        &self,
        update: &CommandRejected,
    ) -> Result<Vec<IndexRow>, ProjectionError> {
        let details = serde_json::to_vec(&update.reason.metadata)
            .map_err(|e| SerializationError::new("rejection details", e.to_string()))
            .map_err(|source| serialization_failure(&update.completion_info.command_id, source))?;

        let mut completion = self.completion(
            &update.completion_info,
            update.record_time,
            &update.domain_id,
            None,
            update.domain_index.as_ref(),
            true,
        )?;
        completion.rejection_status_code = Some(update.reason.code);
        completion.rejection_status_message = Some(update.reason.message.clone());
        completion.rejection_status_details = Some(details);

        Ok(vec![IndexRow::CommandCompletion(completion)])
    }

    fn completion(
        &self,
        info: &CompletionInfo,
        record_time: Timestamp,
        domain_id: &DomainId,
        update_id: Option<&UpdateId>,
        domain_index: Option<&DomainIndex>,
        is_transaction: bool,
    ) -> Result<CommandCompletion, ProjectionError> {
        let deduplication = deduplication_columns(info.optional_deduplication_period.as_ref())?;
        Ok(CommandCompletion {
            completion_offset: self.offset,
            record_time,
            application_id: info.application_id.clone(),
            submitters: info.act_as.clone(),
            command_id: info.command_id.clone(),
            update_id: update_id.cloned(),
            rejection_status_code: None,
            rejection_status_message: None,
            rejection_status_details: None,
            submission_id: info.submission_id.clone(),
            deduplication_offset: deduplication.offset,
            deduplication_duration_seconds: deduplication.duration_seconds,
            deduplication_duration_nanos: deduplication.duration_nanos,
            domain_id: domain_id.clone(),
            message_uuid: info.message_uuid.map(|uuid| uuid.to_string()),
            request_sequencer_counter: domain_index
                .and_then(DomainIndex::request_sequencer_counter),
            is_transaction,
            trace_context: self.trace_context.clone(),
        })
    }

    fn transaction_meta(&self, update_id: &UpdateId) -> IndexRow {
        IndexRow::TransactionMeta(TransactionMeta {
            update_id: update_id.clone(),
            event_offset: self.offset,
            event_sequential_id_first: EventSequentialId::Unassigned,
            event_sequential_id_last: EventSequentialId::Unassigned,
        })
    }

    // -------------------------------------------------------------------------
    // Transactions
    // -------------------------------------------------------------------------

    /// Rows of an accepted transaction whose visible nodes are `visible`.
    pub fn transaction_accepted(
        &self,
        update: &TransactionAccepted,
        visible: &[VisibleNode<'_>],
    ) -> Result<Vec<IndexRow>, ProjectionError> {
        let mut rows = Vec::with_capacity(visible.len() * 4 + 2);

        for node in visible {
            match node.node {
                Node::Create(create) => {
                    self.push_create(&mut rows, update, node, create)?;
                }
                Node::Exercise(exercise) => {
                    self.push_exercise(&mut rows, update, node, exercise)?;
                }
                Node::Fetch(_) | Node::LookupByKey(_) | Node::Rollback(_) => {}
            }
        }

        if let Some(info) = &update.completion_info {
            let completion = self.completion(
                info,
                update.record_time,
                &update.domain_id,
                Some(&update.update_id),
                update.domain_index.as_ref(),
                true,
            )?;
            rows.push(IndexRow::CommandCompletion(completion));
        }
        rows.push(self.transaction_meta(&update.update_id));

        Ok(rows)
    }

    fn push_create(
        &self,
        rows: &mut Vec<IndexRow>,
        update: &TransactionAccepted,
        node: &VisibleNode<'_>,
        create: &CreateNode,
    ) -> Result<(), ProjectionError> {
        let event_id = EventId::new(update.update_id.clone(), node.node_id);
        let serialized = self
            .serializer
            .serialize_create(create)
            .map_err(|source| serialization_failure(&event_id, source))?;
        let (create_argument, create_argument_compression) = compress(
            self.compression.create_argument.as_ref(),
            "create_argument",
            serialized.argument,
        )?;
        let (create_key_value, create_key_value_compression) = compress_optional(
            self.compression.create_key_value.as_ref(),
            "create_key_value",
            serialized.key,
        )?;

        let template_id = create.template_id.to_string();
        let filters: Vec<IndexRow> = node
            .witnesses
            .flat()
            .iter()
            .map(|party| {
                IndexRow::IdFilterCreateStakeholder(IdFilterCreateStakeholder {
                    event_sequential_id: EventSequentialId::Unassigned,
                    template_id: template_id.clone(),
                    party_id: party.clone(),
                })
            })
            .collect();
        let (flat_event_witnesses, tree_event_witnesses) = node.witnesses.clone().into_parts();

        trace!(
            event_id = %event_id,
            flat = flat_event_witnesses.len(),
            tree = tree_event_witnesses.len(),
            "[pn-01] Create event"
        );

        let info = update.completion_info.as_ref();
        rows.push(IndexRow::EventCreate(EventCreate {
            event_offset: self.offset,
            update_id: update.update_id.clone(),
            ledger_effective_time: update.transaction_meta.ledger_effective_time,
            command_id: info.map(|info| info.command_id.clone()),
            workflow_id: update.transaction_meta.workflow_id.clone(),
            application_id: info.map(|info| info.application_id.clone()),
            submitters: info.map(|info| info.act_as.clone()),
            node_index: node.node_id.index(),
            event_id: event_id.to_string(),
            contract_id: create.contract_id.clone(),
            template_id,
            package_name: create.package_name.clone(),
            flat_event_witnesses,
            tree_event_witnesses,
            create_argument,
            create_signatories: create.signatories.clone(),
            create_observers: create.observers.clone(),
            create_key_value,
            create_key_maintainers: create.key.as_ref().map(|key| key.maintainers.clone()),
            create_key_hash: create.key.as_ref().map(|key| {
                hash_contract_key(&create.template_id, &create.package_name, &key.value.value)
            }),
            create_argument_compression,
            create_key_value_compression,
            event_sequential_id: EventSequentialId::Unassigned,
            driver_metadata: update.contract_metadata.get(&create.contract_id).cloned(),
            domain_id: update.domain_id.clone(),
            trace_context: self.trace_context.clone(),
            record_time: update.record_time,
        }));
        rows.extend(filters);
        Ok(())
    }

    fn push_exercise(
        &self,
        rows: &mut Vec<IndexRow>,
        update: &TransactionAccepted,
        node: &VisibleNode<'_>,
        exercise: &ExerciseNode,
    ) -> Result<(), ProjectionError> {
        let event_id = EventId::new(update.update_id.clone(), node.node_id);
        let serialized = self
            .serializer
            .serialize_exercise(&event_id, exercise)
            .map_err(|source| serialization_failure(&event_id, source))?;
        let (exercise_argument, exercise_argument_compression) = compress(
            self.compression.exercise_argument.as_ref(),
            "exercise_argument",
            serialized.argument,
        )?;
        let (exercise_result, exercise_result_compression) = compress_optional(
            self.compression.exercise_result.as_ref(),
            "exercise_result",
            serialized.result,
        )?;
        let (create_key_value, create_key_value_compression) = compress_optional(
            self.compression.create_key_value.as_ref(),
            "create_key_value",
            serialized.key,
        )?;

        let template_id = exercise.template_id.to_string();
        let filters = exercise_filters(&node.witnesses, exercise.consuming, &template_id);
        let exercise_child_event_ids = node
            .visible_children
            .iter()
            .map(|child| EventId::new(update.update_id.clone(), *child).to_string())
            .collect();
        let (flat_event_witnesses, tree_event_witnesses) = node.witnesses.clone().into_parts();

        trace!(
            event_id = %event_id,
            consuming = exercise.consuming,
            flat = flat_event_witnesses.len(),
            tree = tree_event_witnesses.len(),
            "[pn-01] Exercise event"
        );

        let info = update.completion_info.as_ref();
        rows.push(IndexRow::EventExercise(EventExercise {
            consuming: exercise.consuming,
            event_offset: self.offset,
            update_id: update.update_id.clone(),
            ledger_effective_time: update.transaction_meta.ledger_effective_time,
            command_id: info.map(|info| info.command_id.clone()),
            workflow_id: update.transaction_meta.workflow_id.clone(),
            application_id: info.map(|info| info.application_id.clone()),
            submitters: info.map(|info| info.act_as.clone()),
            node_index: node.node_id.index(),
            event_id: event_id.to_string(),
            contract_id: exercise.target_contract_id.clone(),
            template_id,
            interface_id: exercise.interface_id.as_ref().map(ToString::to_string),
            package_name: exercise.package_name.clone(),
            flat_event_witnesses,
            tree_event_witnesses,
            create_key_value,
            exercise_choice: exercise.choice_id.clone(),
            exercise_argument,
            exercise_result,
            exercise_actors: exercise.acting_parties.clone(),
            exercise_child_event_ids,
            create_key_value_compression,
            exercise_argument_compression,
            exercise_result_compression,
            event_sequential_id: EventSequentialId::Unassigned,
            domain_id: update.domain_id.clone(),
            trace_context: self.trace_context.clone(),
            record_time: update.record_time,
        }));
        rows.extend(filters);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Reassignments
    // -------------------------------------------------------------------------

    pub fn reassignment_accepted(
        &self,
        update: &ReassignmentAccepted,
    ) -> Result<Vec<IndexRow>, ProjectionError> {
        let witnesses = reassignment_witnesses(&update.reassignment);
        let mut rows = Vec::with_capacity(witnesses.flat().len() + 3);

        match &update.reassignment {
            Reassignment::Assign(assign) => {
                self.push_assign(&mut rows, update, assign, witnesses)?;
            }
            Reassignment::Unassign(unassign) => {
                self.push_unassign(&mut rows, update, unassign, witnesses);
            }
        }

        if let Some(info) = &update.completion_info {
            let completion = self.completion(
                info,
                update.record_time,
                update.domain_id(),
                Some(&update.update_id),
                update.domain_index.as_ref(),
                false,
            )?;
            rows.push(IndexRow::CommandCompletion(completion));
        }
        rows.push(self.transaction_meta(&update.update_id));

        Ok(rows)
    }

    fn push_assign(
        &self,
        rows: &mut Vec<IndexRow>,
        update: &ReassignmentAccepted,
        assign: &Assign,
        witnesses: Witnesses,
    ) -> Result<(), ProjectionError> {
        let create = &assign.create_node;
        let serialized = self
            .serializer
            .serialize_create(create)
            .map_err(|source| serialization_failure(&create.contract_id, source))?;
        let (create_argument, create_argument_compression) = compress(
            self.compression.create_argument.as_ref(),
            "create_argument",
            serialized.argument,
        )?;
        let (create_key_value, create_key_value_compression) = compress_optional(
            self.compression.create_key_value.as_ref(),
            "create_key_value",
            serialized.key,
        )?;

        let template_id = create.template_id.to_string();
        let (flat_event_witnesses, _) = witnesses.into_parts();
        let filters: Vec<IndexRow> = flat_event_witnesses
            .iter()
            .map(|party| {
                IndexRow::IdFilterAssignStakeholder(IdFilterAssignStakeholder {
                    event_sequential_id: EventSequentialId::Unassigned,
                    template_id: template_id.clone(),
                    party_id: party.clone(),
                })
            })
            .collect();

        trace!(
            contract_id = %create.contract_id,
            stakeholders = flat_event_witnesses.len(),
            "[pn-01] Assign event"
        );

        let reassignment_info = &update.reassignment_info;
        rows.push(IndexRow::EventAssign(EventAssign {
            event_offset: self.offset,
            update_id: update.update_id.clone(),
            command_id: update
                .completion_info
                .as_ref()
                .map(|info| info.command_id.clone()),
            workflow_id: update.workflow_id.clone(),
            submitter: reassignment_info.submitter.clone(),
            contract_id: create.contract_id.clone(),
            template_id,
            package_name: create.package_name.clone(),
            flat_event_witnesses,
            create_argument,
            create_signatories: create.signatories.clone(),
            create_observers: create.observers.clone(),
            create_key_value,
            create_key_maintainers: create.key.as_ref().map(|key| key.maintainers.clone()),
            create_key_hash: create.key.as_ref().map(|key| {
                hash_contract_key(&create.template_id, &create.package_name, &key.value.value)
            }),
            create_argument_compression,
            create_key_value_compression,
            event_sequential_id: EventSequentialId::Unassigned,
            ledger_effective_time: assign.ledger_effective_time,
            driver_metadata: assign.contract_metadata.clone(),
            source_domain_id: reassignment_info.source_domain.clone(),
            target_domain_id: reassignment_info.target_domain.clone(),
            unassign_id: reassignment_info.unassign_id,
            reassignment_counter: reassignment_info.reassignment_counter,
            trace_context: self.trace_context.clone(),
            record_time: update.record_time,
        }));
        rows.extend(filters);
        Ok(())
    }

    fn push_unassign(
        &self,
        rows: &mut Vec<IndexRow>,
        update: &ReassignmentAccepted,
        unassign: &Unassign,
        witnesses: Witnesses,
    ) {
        let template_id = unassign.template_id.to_string();
        let (flat_event_witnesses, _) = witnesses.into_parts();
        let filters: Vec<IndexRow> = flat_event_witnesses
            .iter()
            .map(|party| {
                IndexRow::IdFilterUnassignStakeholder(IdFilterUnassignStakeholder {
                    event_sequential_id: EventSequentialId::Unassigned,
                    template_id: template_id.clone(),
                    party_id: party.clone(),
                })
            })
            .collect();

        trace!(
            contract_id = %unassign.contract_id,
            stakeholders = flat_event_witnesses.len(),
            "[pn-01] Unassign event"
        );

        let reassignment_info = &update.reassignment_info;
        rows.push(IndexRow::EventUnassign(EventUnassign {
            event_offset: self.offset,
            update_id: update.update_id.clone(),
            command_id: update
                .completion_info
                .as_ref()
                .map(|info| info.command_id.clone()),
            workflow_id: update.workflow_id.clone(),
            submitter: reassignment_info.submitter.clone(),
            contract_id: unassign.contract_id.clone(),
            template_id,
            package_name: unassign.package_name.clone(),
            flat_event_witnesses,
            event_sequential_id: EventSequentialId::Unassigned,
            source_domain_id: reassignment_info.source_domain.clone(),
            target_domain_id: reassignment_info.target_domain.clone(),
            unassign_id: reassignment_info.unassign_id,
            reassignment_counter: reassignment_info.reassignment_counter,
            assignment_exclusivity: unassign.assignment_exclusivity,
            trace_context: self.trace_context.clone(),
            record_time: update.record_time,
        }));
        rows.extend(filters);
    }

    // -------------------------------------------------------------------------
    // Topology and positions
    // -------------------------------------------------------------------------

    pub fn topology_effective(&self, update: &TopologyTransactionEffective) -> Vec<IndexRow> {
        let mut rows: Vec<IndexRow> = update
            .events
            .iter()
            .map(|event| match event {
                TopologyEvent::PartyToParticipantAuthorization {
                    party,
                    participant,
                    authorization_event,
                } => {
                    let (authorization_event, participant_permission) =
                        authorization_columns(authorization_event);
                    IndexRow::EventPartyToParticipant(EventPartyToParticipant {
                        event_sequential_id: EventSequentialId::Unassigned,
                        event_offset: self.offset,
                        update_id: update.update_id.clone(),
                        party_id: party.clone(),
                        participant_id: participant.clone(),
                        authorization_event,
                        participant_permission,
                        domain_id: update.domain_id.clone(),
                        record_time: update.effective_time,
                        trace_context: self.trace_context.clone(),
                    })
                }
            })
            .collect();
        rows.push(self.transaction_meta(&update.update_id));
        rows
    }

    pub fn sequencer_index_moved(&self, update: &SequencerIndexMoved) -> Vec<IndexRow> {
        vec![IndexRow::SequencerIndexMoved(SequencerIndexMovedRow {
            domain_id: update.domain_id.clone(),
        })]
    }
}

/// Id filters of an exercise event.
///
/// Consuming: one stakeholder row per flat witness, one informee row per
/// remaining tree witness. Non-consuming: one informee row per tree witness.
fn exercise_filters(witnesses: &Witnesses, consuming: bool, template_id: &str) -> Vec<IndexRow> {
    if consuming {
        let stakeholders = witnesses.flat().iter().map(|party| {
            IndexRow::IdFilterConsumingStakeholder(IdFilterConsumingStakeholder {
                event_sequential_id: EventSequentialId::Unassigned,
                template_id: template_id.to_string(),
                party_id: party.clone(),
            })
        });
        let divulgees = witnesses.non_stakeholder_informees().map(|party| {
            IndexRow::IdFilterConsumingNonStakeholderInformee(
                IdFilterConsumingNonStakeholderInformee {
                    event_sequential_id: EventSequentialId::Unassigned,
                    party_id: party.clone(),
                },
            )
        });
        stakeholders.chain(divulgees).collect()
    } else {
        witnesses
            .tree()
            .iter()
            .map(|party| {
                IndexRow::IdFilterNonConsumingInformee(IdFilterNonConsumingInformee {
                    event_sequential_id: EventSequentialId::Unassigned,
                    party_id: party.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{BincodeValueSerializer, NoCompression};
    use crate::domain::witnesses::WitnessSet;
    use shared_types::{Party, TransactionBuilder, TransactionMetadata};
    use std::sync::Arc;
    use std::time::Duration;

    fn parties(names: &[&str]) -> WitnessSet {
        names.iter().map(|name| Party::new(*name)).collect()
    }

    fn mapper<'a>(
        serializer: &'a BincodeValueSerializer,
        compression: &'a CompressionStrategy,
        participant: &'a ParticipantId,
    ) -> RowMapper<'a> {
        RowMapper::new(
            serializer,
            compression,
            participant,
            Offset(7),
            &TraceContext::empty(),
        )
        .unwrap()
    }

    #[test]
    fn test_deduplication_columns() {
        assert_eq!(
            deduplication_columns(None).unwrap(),
            DeduplicationColumns::default()
        );

        let period = DeduplicationPeriod::Offset(Offset(12));
        let by_offset = deduplication_columns(Some(&period)).unwrap();
        assert_eq!(by_offset.offset, Some(Offset(12)));
        assert_eq!(by_offset.duration_seconds, None);
        assert_eq!(by_offset.duration_nanos, None);

        let period = DeduplicationPeriod::Duration(Duration::new(30, 500));
        let by_duration = deduplication_columns(Some(&period)).unwrap();
        assert_eq!(by_duration.offset, None);
        assert_eq!(by_duration.duration_seconds, Some(30));
        assert_eq!(by_duration.duration_nanos, Some(500));
    }

    #[test]
    fn test_deduplication_duration_beyond_seconds_column() {
        let max = i64::MAX as u64;
        let period = DeduplicationPeriod::Duration(Duration::from_secs(max));
        let columns = deduplication_columns(Some(&period)).unwrap();
        assert_eq!(columns.duration_seconds, Some(i64::MAX));

        let period = DeduplicationPeriod::Duration(Duration::from_secs(max + 1));
        let err = deduplication_columns(Some(&period)).unwrap_err();
        assert!(matches!(
            err,
            ProjectionError::DeduplicationOutOfRange { seconds } if seconds == max + 1
        ));
    }

    #[test]
    fn test_authorization_columns() {
        assert_eq!(
            authorization_columns(&AuthorizationEvent::Added(AuthorizationLevel::Submission)),
            (1, Some(1))
        );
        assert_eq!(
            authorization_columns(&AuthorizationEvent::Revoked),
            (2, None)
        );
        let changed = AuthorizationEvent::ChangedTo(AuthorizationLevel::Observation);
        assert_eq!(authorization_columns(&changed), (3, Some(3)));
    }

    #[test]
    fn test_consuming_filters_split_stakeholders_and_divulgees() {
        let witnesses = Witnesses::new(parties(&["s", "o"]), parties(&["d"]));
        let filters = exercise_filters(&witnesses, true, "P:M:T");
        let kinds: Vec<&str> = filters.iter().map(IndexRow::kind).collect();
        assert_eq!(
            kinds,
            vec![
                "IdFilterConsumingStakeholder",
                "IdFilterConsumingStakeholder",
                "IdFilterConsumingNonStakeholderInformee",
            ]
        );
    }

    #[test]
    fn test_non_consuming_filters_cover_tree() {
        let witnesses = Witnesses::informees_only(parties(&["a", "b"]));
        let filters = exercise_filters(&witnesses, false, "P:M:T");
        assert_eq!(filters.len(), 2);
        assert!(filters
            .iter()
            .all(|row| matches!(row, IndexRow::IdFilterNonConsumingInformee(_))));
    }

    #[test]
    fn test_party_added_locality() {
        let serializer = BincodeValueSerializer;
        let compression = CompressionStrategy::uniform(Arc::new(NoCompression));
        let participant = ParticipantId::new("p1");
        let mapper = mapper(&serializer, &compression, &participant);

        let mut update = PartyAddedToParticipant {
            party: Party::new("alice"),
            display_name: "Alice".to_string(),
            participant_id: ParticipantId::new("p1"),
            record_time: Timestamp(3),
            submission_id: None,
        };
        let local = mapper.party_added(&update);
        update.participant_id = ParticipantId::new("p2");
        let remote = mapper.party_added(&update);

        match (&local[0], &remote[0]) {
            (IndexRow::PartyEntry(local), IndexRow::PartyEntry(remote)) => {
                assert_eq!(local.is_local, Some(true));
                assert_eq!(remote.is_local, Some(false));
                assert_eq!(local.ledger_offset, Offset(7));
            }
            other => panic!("unexpected rows {:?}", other),
        }
    }

    #[test]
    fn test_empty_transaction_still_has_meta() {
        let serializer = BincodeValueSerializer;
        let compression = CompressionStrategy::none();
        let participant = ParticipantId::new("p1");
        let mapper = mapper(&serializer, &compression, &participant);

        let update = TransactionAccepted {
            completion_info: None,
            transaction_meta: TransactionMetadata {
                ledger_effective_time: Timestamp(1),
                workflow_id: None,
                submission_time: Timestamp(0),
            },
            transaction: TransactionBuilder::new().build(),
            update_id: UpdateId::new("tx"),
            record_time: Timestamp(2),
            domain_id: DomainId::new("d"),
            domain_index: None,
            contract_metadata: Default::default(),
        };
        let rows = mapper.transaction_accepted(&update, &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind(), "TransactionMeta");
    }

    #[test]
    fn test_trace_context_encoding_is_stable() {
        let context = TraceContext::with_traceparent("00-abc-def-01");
        assert_eq!(
            encode_trace_context(&context).unwrap(),
            encode_trace_context(&context.clone()).unwrap()
        );
    }
}
