//! # Index Rows
//!
//! The flat records the projector hands to the index writer. Every variant of
//! [`IndexRow`] maps to one table; every field maps to one column.
//!
//! ## Row Families
//!
//! | Family | Variants |
//! |--------|----------|
//! | Events | `EventCreate`, `EventExercise`, `EventAssign`, `EventUnassign`, `EventPartyToParticipant` |
//! | Id filters | `IdFilterCreateStakeholder`, `IdFilterConsumingStakeholder`, `IdFilterConsumingNonStakeholderInformee`, `IdFilterNonConsumingInformee`, `IdFilterAssignStakeholder`, `IdFilterUnassignStakeholder` |
//! | Summaries | `CommandCompletion`, `TransactionMeta`, `PartyEntry` |
//! | Positions | `SequencerIndexMoved` |

use serde::{Deserialize, Serialize};
use shared_types::{
    ApplicationId, CommandId, ContractId, DomainId, Offset, PackageName, ParticipantId, Party,
    SubmissionId, Timestamp, UpdateId, WorkflowId,
};
use std::collections::BTreeSet;

/// Sequential id column of event and filter rows.
///
/// The projector always emits [`EventSequentialId::Unassigned`]; the index
/// writer resolves it once, in row order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventSequentialId {
    #[default]
    Unassigned,
    Assigned(i64),
}

impl EventSequentialId {
    pub fn is_assigned(self) -> bool {
        matches!(self, EventSequentialId::Assigned(_))
    }

    pub fn value(self) -> Option<i64> {
        match self {
            EventSequentialId::Assigned(value) => Some(value),
            EventSequentialId::Unassigned => None,
        }
    }
}

/// Compression algorithm column. `None` means the bytes are stored as is.
pub type CompressionAlgorithmId = Option<i32>;

// =============================================================================
// EVENT ROWS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCreate {
    pub event_offset: Offset,
    pub update_id: UpdateId,
    pub ledger_effective_time: Timestamp,
    pub command_id: Option<CommandId>,
    pub workflow_id: Option<WorkflowId>,
    pub application_id: Option<ApplicationId>,
    pub submitters: Option<BTreeSet<Party>>,
    pub node_index: u32,
    pub event_id: String,
    pub contract_id: ContractId,
    pub template_id: String,
    pub package_name: PackageName,
    pub flat_event_witnesses: BTreeSet<Party>,
    pub tree_event_witnesses: BTreeSet<Party>,
    pub create_argument: Vec<u8>,
    pub create_signatories: BTreeSet<Party>,
    pub create_observers: BTreeSet<Party>,
    pub create_key_value: Option<Vec<u8>>,
    pub create_key_maintainers: Option<BTreeSet<Party>>,
    pub create_key_hash: Option<String>,
    pub create_argument_compression: CompressionAlgorithmId,
    pub create_key_value_compression: CompressionAlgorithmId,
    pub event_sequential_id: EventSequentialId,
    pub driver_metadata: Option<Vec<u8>>,
    pub domain_id: DomainId,
    pub trace_context: Vec<u8>,
    pub record_time: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventExercise {
    pub consuming: bool,
    pub event_offset: Offset,
    pub update_id: UpdateId,
    pub ledger_effective_time: Timestamp,
    pub command_id: Option<CommandId>,
    pub workflow_id: Option<WorkflowId>,
    pub application_id: Option<ApplicationId>,
    pub submitters: Option<BTreeSet<Party>>,
    pub node_index: u32,
    pub event_id: String,
    pub contract_id: ContractId,
    pub template_id: String,
    pub interface_id: Option<String>,
    pub package_name: PackageName,
    pub flat_event_witnesses: BTreeSet<Party>,
    pub tree_event_witnesses: BTreeSet<Party>,
    pub create_key_value: Option<Vec<u8>>,
    pub exercise_choice: String,
    pub exercise_argument: Vec<u8>,
    pub exercise_result: Option<Vec<u8>>,
    pub exercise_actors: BTreeSet<Party>,
    pub exercise_child_event_ids: Vec<String>,
    pub create_key_value_compression: CompressionAlgorithmId,
    pub exercise_argument_compression: CompressionAlgorithmId,
    pub exercise_result_compression: CompressionAlgorithmId,
    pub event_sequential_id: EventSequentialId,
    pub domain_id: DomainId,
    pub trace_context: Vec<u8>,
    pub record_time: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAssign {
    pub event_offset: Offset,
    pub update_id: UpdateId,
    pub command_id: Option<CommandId>,
    pub workflow_id: Option<WorkflowId>,
    pub submitter: Option<Party>,
    pub contract_id: ContractId,
    pub template_id: String,
    pub package_name: PackageName,
    pub flat_event_witnesses: BTreeSet<Party>,
    pub create_argument: Vec<u8>,
    pub create_signatories: BTreeSet<Party>,
    pub create_observers: BTreeSet<Party>,
    pub create_key_value: Option<Vec<u8>>,
    pub create_key_maintainers: Option<BTreeSet<Party>>,
    pub create_key_hash: Option<String>,
    pub create_argument_compression: CompressionAlgorithmId,
    pub create_key_value_compression: CompressionAlgorithmId,
    pub event_sequential_id: EventSequentialId,
    pub ledger_effective_time: Timestamp,
    pub driver_metadata: Vec<u8>,
    pub source_domain_id: DomainId,
    pub target_domain_id: DomainId,
    pub unassign_id: Timestamp,
    pub reassignment_counter: u64,
    pub trace_context: Vec<u8>,
    pub record_time: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventUnassign {
    pub event_offset: Offset,
    pub update_id: UpdateId,
    pub command_id: Option<CommandId>,
    pub workflow_id: Option<WorkflowId>,
    pub submitter: Option<Party>,
    pub contract_id: ContractId,
    pub template_id: String,
    pub package_name: PackageName,
    pub flat_event_witnesses: BTreeSet<Party>,
    pub event_sequential_id: EventSequentialId,
    pub source_domain_id: DomainId,
    pub target_domain_id: DomainId,
    pub unassign_id: Timestamp,
    pub reassignment_counter: u64,
    pub assignment_exclusivity: Option<Timestamp>,
    pub trace_context: Vec<u8>,
    pub record_time: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPartyToParticipant {
    pub event_sequential_id: EventSequentialId,
    pub event_offset: Offset,
    pub update_id: UpdateId,
    pub party_id: Party,
    pub participant_id: ParticipantId,
    /// `1` added, `2` revoked, `3` changed.
    pub authorization_event: i32,
    /// `1` submission, `2` confirmation, `3` observation; absent on revoke.
    pub participant_permission: Option<i32>,
    pub domain_id: DomainId,
    pub record_time: Timestamp,
    pub trace_context: Vec<u8>,
}

// =============================================================================
// ID FILTER ROWS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdFilterCreateStakeholder {
    pub event_sequential_id: EventSequentialId,
    pub template_id: String,
    pub party_id: Party,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdFilterConsumingStakeholder {
    pub event_sequential_id: EventSequentialId,
    pub template_id: String,
    pub party_id: Party,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdFilterConsumingNonStakeholderInformee {
    pub event_sequential_id: EventSequentialId,
    pub party_id: Party,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdFilterNonConsumingInformee {
    pub event_sequential_id: EventSequentialId,
    pub party_id: Party,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdFilterAssignStakeholder {
    pub event_sequential_id: EventSequentialId,
    pub template_id: String,
    pub party_id: Party,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdFilterUnassignStakeholder {
    pub event_sequential_id: EventSequentialId,
    pub template_id: String,
    pub party_id: Party,
}

// =============================================================================
// SUMMARY AND POSITION ROWS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandCompletion {
    pub completion_offset: Offset,
    pub record_time: Timestamp,
    pub application_id: ApplicationId,
    pub submitters: BTreeSet<Party>,
    pub command_id: CommandId,
    /// Set for accepted transactions and reassignments, absent for rejections.
    pub update_id: Option<UpdateId>,
    pub rejection_status_code: Option<i32>,
    pub rejection_status_message: Option<String>,
    pub rejection_status_details: Option<Vec<u8>>,
    pub submission_id: Option<SubmissionId>,
    pub deduplication_offset: Option<Offset>,
    pub deduplication_duration_seconds: Option<i64>,
    pub deduplication_duration_nanos: Option<i32>,
    pub domain_id: DomainId,
    pub message_uuid: Option<String>,
    pub request_sequencer_counter: Option<u64>,
    pub is_transaction: bool,
    pub trace_context: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMeta {
    pub update_id: UpdateId,
    pub event_offset: Offset,
    pub event_sequential_id_first: EventSequentialId,
    pub event_sequential_id_last: EventSequentialId,
}

/// Outcome recorded by a party entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartyEntryKind {
    Accept,
    Reject,
}

impl PartyEntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PartyEntryKind::Accept => "accept",
            PartyEntryKind::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyEntry {
    pub ledger_offset: Offset,
    pub recorded_at: Timestamp,
    pub submission_id: Option<SubmissionId>,
    pub party: Option<Party>,
    pub display_name: Option<String>,
    pub typ: PartyEntryKind,
    pub rejection_reason: Option<String>,
    pub is_local: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerIndexMoved {
    pub domain_id: DomainId,
}

// =============================================================================
// INDEX ROW
// =============================================================================

/// A single row destined for the index store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexRow {
    EventCreate(EventCreate),
    EventExercise(EventExercise),
    EventAssign(EventAssign),
    EventUnassign(EventUnassign),
    EventPartyToParticipant(EventPartyToParticipant),
    IdFilterCreateStakeholder(IdFilterCreateStakeholder),
    IdFilterConsumingStakeholder(IdFilterConsumingStakeholder),
    IdFilterConsumingNonStakeholderInformee(IdFilterConsumingNonStakeholderInformee),
    IdFilterNonConsumingInformee(IdFilterNonConsumingInformee),
    IdFilterAssignStakeholder(IdFilterAssignStakeholder),
    IdFilterUnassignStakeholder(IdFilterUnassignStakeholder),
    CommandCompletion(CommandCompletion),
    TransactionMeta(TransactionMeta),
    PartyEntry(PartyEntry),
    SequencerIndexMoved(SequencerIndexMoved),
}

impl IndexRow {
    /// Table name of the row.
    pub fn kind(&self) -> &'static str {
        match self {
            IndexRow::EventCreate(_) => "EventCreate",
            IndexRow::EventExercise(_) => "EventExercise",
            IndexRow::EventAssign(_) => "EventAssign",
            IndexRow::EventUnassign(_) => "EventUnassign",
            IndexRow::EventPartyToParticipant(_) => "EventPartyToParticipant",
            IndexRow::IdFilterCreateStakeholder(_) => "IdFilterCreateStakeholder",
            IndexRow::IdFilterConsumingStakeholder(_) => "IdFilterConsumingStakeholder",
            IndexRow::IdFilterConsumingNonStakeholderInformee(_) => {
                "IdFilterConsumingNonStakeholderInformee"
            }
            IndexRow::IdFilterNonConsumingInformee(_) => "IdFilterNonConsumingInformee",
            IndexRow::IdFilterAssignStakeholder(_) => "IdFilterAssignStakeholder",
            IndexRow::IdFilterUnassignStakeholder(_) => "IdFilterUnassignStakeholder",
            IndexRow::CommandCompletion(_) => "CommandCompletion",
            IndexRow::TransactionMeta(_) => "TransactionMeta",
            IndexRow::PartyEntry(_) => "PartyEntry",
            IndexRow::SequencerIndexMoved(_) => "SequencerIndexMoved",
        }
    }

    /// Whether the row is an event row (owns a fresh sequential id).
    pub fn is_event(&self) -> bool {
        matches!(
            self,
            IndexRow::EventCreate(_)
                | IndexRow::EventExercise(_)
                | IndexRow::EventAssign(_)
                | IndexRow::EventUnassign(_)
                | IndexRow::EventPartyToParticipant(_)
        )
    }

    /// Whether the row is an id filter row (shares its event's sequential id).
    pub fn is_id_filter(&self) -> bool {
        matches!(
            self,
            IndexRow::IdFilterCreateStakeholder(_)
                | IndexRow::IdFilterConsumingStakeholder(_)
                | IndexRow::IdFilterConsumingNonStakeholderInformee(_)
                | IndexRow::IdFilterNonConsumingInformee(_)
                | IndexRow::IdFilterAssignStakeholder(_)
                | IndexRow::IdFilterUnassignStakeholder(_)
        )
    }

    /// Sequential id column of event and filter rows.
    pub fn event_sequential_id(&self) -> Option<EventSequentialId> {
        self.sequential_id_slot().copied()
    }

    /// Mutable sequential id column of event and filter rows.
    pub(crate) fn sequential_id_slot_mut(&mut self) -> Option<&mut EventSequentialId> {
        match self {
            IndexRow::EventCreate(row) => Some(&mut row.event_sequential_id),
            IndexRow::EventExercise(row) => Some(&mut row.event_sequential_id),
            IndexRow::EventAssign(row) => Some(&mut row.event_sequential_id),
            IndexRow::EventUnassign(row) => Some(&mut row.event_sequential_id),
            IndexRow::EventPartyToParticipant(row) => Some(&mut row.event_sequential_id),
            IndexRow::IdFilterCreateStakeholder(row) => Some(&mut row.event_sequential_id),
            IndexRow::IdFilterConsumingStakeholder(row) => Some(&mut row.event_sequential_id),
            IndexRow::IdFilterConsumingNonStakeholderInformee(row) => {
                Some(&mut row.event_sequential_id)
            }
            IndexRow::IdFilterNonConsumingInformee(row) => Some(&mut row.event_sequential_id),
            IndexRow::IdFilterAssignStakeholder(row) => Some(&mut row.event_sequential_id),
            IndexRow::IdFilterUnassignStakeholder(row) => Some(&mut row.event_sequential_id),
            IndexRow::CommandCompletion(_)
            | IndexRow::TransactionMeta(_)
            | IndexRow::PartyEntry(_)
            | IndexRow::SequencerIndexMoved(_) => None,
        }
    }

    fn sequential_id_slot(&self) -> Option<&EventSequentialId> {
        match self {
            IndexRow::EventCreate(row) => Some(&row.event_sequential_id),
            IndexRow::EventExercise(row) => Some(&row.event_sequential_id),
            IndexRow::EventAssign(row) => Some(&row.event_sequential_id),
            IndexRow::EventUnassign(row) => Some(&row.event_sequential_id),
            IndexRow::EventPartyToParticipant(row) => Some(&row.event_sequential_id),
            IndexRow::IdFilterCreateStakeholder(row) => Some(&row.event_sequential_id),
            IndexRow::IdFilterConsumingStakeholder(row) => Some(&row.event_sequential_id),
            IndexRow::IdFilterConsumingNonStakeholderInformee(row) => {
                Some(&row.event_sequential_id)
            }
            IndexRow::IdFilterNonConsumingInformee(row) => Some(&row.event_sequential_id),
            IndexRow::IdFilterAssignStakeholder(row) => Some(&row.event_sequential_id),
            IndexRow::IdFilterUnassignStakeholder(row) => Some(&row.event_sequential_id),
            IndexRow::CommandCompletion(_)
            | IndexRow::TransactionMeta(_)
            | IndexRow::PartyEntry(_)
            | IndexRow::SequencerIndexMoved(_) => None,
        }
    }

    /// Flat and tree witnesses of transaction and reassignment events.
    ///
    /// Reassignment events are single-tier: their flat witnesses are their
    /// tree witnesses.
    pub fn witnesses(&self) -> Option<(&BTreeSet<Party>, &BTreeSet<Party>)> {
        match self {
            IndexRow::EventCreate(row) => {
                Some((&row.flat_event_witnesses, &row.tree_event_witnesses))
            }
            IndexRow::EventExercise(row) => {
                Some((&row.flat_event_witnesses, &row.tree_event_witnesses))
            }
            IndexRow::EventAssign(row) => {
                Some((&row.flat_event_witnesses, &row.flat_event_witnesses))
            }
            IndexRow::EventUnassign(row) => {
                Some((&row.flat_event_witnesses, &row.flat_event_witnesses))
            }
            _ => None,
        }
    }
}
