//! # Committed Updates
//!
//! The closed set of updates the synchronization layer delivers to a
//! participant, each wrapped in a [`TracedUpdate`] carrying the W3C trace
//! context of the request that produced it.
//!
//! ## Update Kinds
//!
//! - **Party management**: `PartyAddedToParticipant`, `PartyAllocationRejected`
//! - **Commands**: `TransactionAccepted`, `CommandRejected`
//! - **Reassignments**: `ReassignmentAccepted` (assign or unassign)
//! - **Topology**: `TopologyTransactionEffective`
//! - **Positions**: `Init`, `SequencerIndexMoved`

use crate::identifiers::{
    ApplicationId, CommandId, ContractId, DomainId, Offset, PackageName, ParticipantId, Party,
    SubmissionId, TemplateId, Timestamp, UpdateId, WorkflowId,
};
use crate::transaction::{CreateNode, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use uuid::Uuid;

// =============================================================================
// POSITION MARKERS
// =============================================================================

/// Position of a confirmation request on a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestIndex {
    pub counter: u64,
    pub sequencer_counter: Option<u64>,
    pub timestamp: Timestamp,
}

/// Position in a domain's sequencer stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerIndex {
    pub counter: u64,
    pub timestamp: Timestamp,
}

/// Resumption point on a single domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainIndex {
    pub request_index: Option<RequestIndex>,
    pub sequencer_index: Option<SequencerIndex>,
}

impl DomainIndex {
    pub fn of_request(request_index: RequestIndex) -> Self {
        Self {
            request_index: Some(request_index),
            sequencer_index: None,
        }
    }

    /// Sequencer counter of the underlying request, if it was sequenced.
    pub fn request_sequencer_counter(&self) -> Option<u64> {
        self.request_index.and_then(|index| index.sequencer_counter)
    }
}

// =============================================================================
// COMPLETION INFO
// =============================================================================

/// Window within which a resubmitted command is deduplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeduplicationPeriod {
    /// Deduplicate against everything after this offset.
    Offset(Offset),
    /// Deduplicate against this much wall-clock time.
    Duration(Duration),
}

/// Submission details, present only when this participant hosts the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionInfo {
    pub act_as: BTreeSet<Party>,
    pub application_id: ApplicationId,
    pub command_id: CommandId,
    pub optional_deduplication_period: Option<DeduplicationPeriod>,
    pub submission_id: Option<SubmissionId>,
    /// Correlates the completion with an unsequenced submission.
    pub message_uuid: Option<Uuid>,
}

impl CompletionInfo {
    pub fn new(
        act_as: impl IntoIterator<Item = Party>,
        application_id: impl Into<ApplicationId>,
        command_id: impl Into<CommandId>,
    ) -> Self {
        Self {
            act_as: act_as.into_iter().collect(),
            application_id: application_id.into(),
            command_id: command_id.into(),
            optional_deduplication_period: None,
            submission_id: None,
            message_uuid: None,
        }
    }

    pub fn with_deduplication(mut self, period: DeduplicationPeriod) -> Self {
        self.optional_deduplication_period = Some(period);
        self
    }

    pub fn with_submission_id(mut self, submission_id: impl Into<SubmissionId>) -> Self {
        self.submission_id = Some(submission_id.into());
        self
    }

    pub fn with_message_uuid(mut self, message_uuid: Uuid) -> Self {
        self.message_uuid = Some(message_uuid);
        self
    }
}

// =============================================================================
// UPDATE PAYLOADS
// =============================================================================

/// A party was allocated on, or newly hosted by, a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyAddedToParticipant {
    pub party: Party,
    pub display_name: String,
    /// Participant that reported the allocation.
    pub participant_id: ParticipantId,
    pub record_time: Timestamp,
    pub submission_id: Option<SubmissionId>,
}

/// A party allocation request failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyAllocationRejected {
    pub submission_id: SubmissionId,
    pub participant_id: ParticipantId,
    pub record_time: Timestamp,
    pub rejection_reason: String,
}

/// Status attached to a command rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionReason {
    /// gRPC status code.
    pub code: i32,
    pub message: String,
    /// Structured error metadata.
    pub metadata: BTreeMap<String, String>,
}

impl RejectionReason {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A submitted command was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRejected {
    pub record_time: Timestamp,
    pub completion_info: CompletionInfo,
    pub reason: RejectionReason,
    pub domain_id: DomainId,
    /// Absent for rejections of submissions that were never sequenced.
    pub domain_index: Option<DomainIndex>,
}

/// Transaction-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMetadata {
    pub ledger_effective_time: Timestamp,
    pub workflow_id: Option<WorkflowId>,
    pub submission_time: Timestamp,
}

/// A transaction was committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAccepted {
    pub completion_info: Option<CompletionInfo>,
    pub transaction_meta: TransactionMetadata,
    pub transaction: Transaction,
    pub update_id: UpdateId,
    pub record_time: Timestamp,
    pub domain_id: DomainId,
    pub domain_index: Option<DomainIndex>,
    /// Driver metadata of the contracts created by this transaction.
    pub contract_metadata: BTreeMap<ContractId, Vec<u8>>,
}

/// Domain-level details shared by both halves of a reassignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignmentInfo {
    pub source_domain: DomainId,
    pub target_domain: DomainId,
    pub submitter: Option<Party>,
    pub reassignment_counter: u64,
    /// Record time of the unassignment; identifies the reassignment.
    pub unassign_id: Timestamp,
}

/// Contract arrives on the target domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assign {
    pub ledger_effective_time: Timestamp,
    pub create_node: CreateNode,
    pub contract_metadata: Vec<u8>,
}

/// Contract leaves the source domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unassign {
    pub contract_id: ContractId,
    pub template_id: TemplateId,
    pub package_name: PackageName,
    pub stakeholders: BTreeSet<Party>,
    /// Until this time only the submitter may assign the contract.
    pub assignment_exclusivity: Option<Timestamp>,
}

/// Either half of a reassignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reassignment {
    Assign(Assign),
    Unassign(Unassign),
}

/// A contract moved between domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignmentAccepted {
    pub completion_info: Option<CompletionInfo>,
    pub workflow_id: Option<WorkflowId>,
    pub update_id: UpdateId,
    pub record_time: Timestamp,
    pub reassignment_info: ReassignmentInfo,
    pub reassignment: Reassignment,
    pub domain_index: Option<DomainIndex>,
}

impl ReassignmentAccepted {
    /// Domain the update was recorded on: the target for an assignment, the
    /// source for an unassignment.
    pub fn domain_id(&self) -> &DomainId {
        match self.reassignment {
            Reassignment::Assign(_) => &self.reassignment_info.target_domain,
            Reassignment::Unassign(_) => &self.reassignment_info.source_domain,
        }
    }
}

/// Hosting permission granted to a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizationLevel {
    Submission,
    Confirmation,
    Observation,
}

/// Change of a party-to-participant hosting relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizationEvent {
    Added(AuthorizationLevel),
    ChangedTo(AuthorizationLevel),
    Revoked,
}

/// A single effect of a topology transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopologyEvent {
    PartyToParticipantAuthorization {
        party: Party,
        participant: ParticipantId,
        authorization_event: AuthorizationEvent,
    },
}

/// A topology transaction became effective on a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyTransactionEffective {
    pub update_id: UpdateId,
    pub events: Vec<TopologyEvent>,
    pub domain_id: DomainId,
    pub effective_time: Timestamp,
    pub domain_index: Option<DomainIndex>,
}

/// The sequencer position advanced without any indexable content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerIndexMoved {
    pub domain_id: DomainId,
    pub sequencer_index: SequencerIndex,
    pub request_counter: Option<u64>,
}

// =============================================================================
// UPDATE
// =============================================================================

/// A committed update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Update {
    Init { record_time: Timestamp },
    PartyAddedToParticipant(PartyAddedToParticipant),
    PartyAllocationRejected(PartyAllocationRejected),
    CommandRejected(CommandRejected),
    TransactionAccepted(TransactionAccepted),
    ReassignmentAccepted(ReassignmentAccepted),
    TopologyTransactionEffective(TopologyTransactionEffective),
    SequencerIndexMoved(SequencerIndexMoved),
}

impl Update {
    /// Stable name of the update kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Update::Init { .. } => "Init",
            Update::PartyAddedToParticipant(_) => "PartyAddedToParticipant",
            Update::PartyAllocationRejected(_) => "PartyAllocationRejected",
            Update::CommandRejected(_) => "CommandRejected",
            Update::TransactionAccepted(_) => "TransactionAccepted",
            Update::ReassignmentAccepted(accepted) => match accepted.reassignment {
                Reassignment::Assign(_) => "ReassignmentAccepted(Assign)",
                Reassignment::Unassign(_) => "ReassignmentAccepted(Unassign)",
            },
            Update::TopologyTransactionEffective(_) => "TopologyTransactionEffective",
            Update::SequencerIndexMoved(_) => "SequencerIndexMoved",
        }
    }

    pub fn record_time(&self) -> Timestamp {
        match self {
            Update::Init { record_time } => *record_time,
            Update::PartyAddedToParticipant(update) => update.record_time,
            Update::PartyAllocationRejected(update) => update.record_time,
            Update::CommandRejected(update) => update.record_time,
            Update::TransactionAccepted(update) => update.record_time,
            Update::ReassignmentAccepted(update) => update.record_time,
            Update::TopologyTransactionEffective(update) => update.effective_time,
            Update::SequencerIndexMoved(update) => update.sequencer_index.timestamp,
        }
    }

    /// Domain the update was recorded on, if it belongs to one.
    pub fn domain_id(&self) -> Option<&DomainId> {
        match self {
            Update::Init { .. }
            | Update::PartyAddedToParticipant(_)
            | Update::PartyAllocationRejected(_) => None,
            Update::CommandRejected(update) => Some(&update.domain_id),
            Update::TransactionAccepted(update) => Some(&update.domain_id),
            Update::ReassignmentAccepted(update) => Some(update.domain_id()),
            Update::TopologyTransactionEffective(update) => Some(&update.domain_id),
            Update::SequencerIndexMoved(update) => Some(&update.domain_id),
        }
    }
}

/// W3C trace context propagated with an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    pub traceparent: Option<String>,
    pub tracestate: Option<String>,
}

impl TraceContext {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_traceparent(traceparent: impl Into<String>) -> Self {
        Self {
            traceparent: Some(traceparent.into()),
            tracestate: None,
        }
    }
}

/// An update together with its trace context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracedUpdate {
    pub update: Update,
    pub trace_context: TraceContext,
}

impl TracedUpdate {
    pub fn new(update: Update, trace_context: TraceContext) -> Self {
        Self {
            update,
            trace_context,
        }
    }

    /// Wrap an update with an empty trace context.
    pub fn untraced(update: Update) -> Self {
        Self::new(update, TraceContext::empty())
    }
}
