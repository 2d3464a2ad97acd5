//! Shared builders for the projector integration tests.

#![allow(dead_code)]

use pn_01_index_projector::{
    BincodeValueSerializer, CompressionStrategy, IndexRow, ProjectorConfig, UpdateProjector,
};
use shared_types::{
    CompletionInfo, ContractId, CreateNode, DomainId, ExerciseNode, KeyWithMaintainers,
    ParticipantId, Party, TemplateId, Timestamp, TracedUpdate, Transaction, TransactionAccepted,
    TransactionMetadata, Update, UpdateId, Value, VersionedValue,
};
use std::collections::BTreeSet;
use std::sync::Arc;

pub const PARTICIPANT: &str = "participant-1";
pub const DOMAIN: &str = "domain-1";
pub const UPDATE_ID: &str = "tx-1";

pub fn party(name: &str) -> Party {
    Party::new(name)
}

pub fn parties(names: &[&str]) -> BTreeSet<Party> {
    names.iter().map(|name| Party::new(*name)).collect()
}

pub fn template() -> TemplateId {
    TemplateId::new("P", "M", "T")
}

pub fn value(text: &str) -> VersionedValue {
    VersionedValue::latest(Value::record([("field", Value::text(text))]))
}

pub fn create(cid: &str, signatories: &[&str], observers: &[&str]) -> CreateNode {
    CreateNode::new(ContractId::new(cid), template(), value("argument"))
        .with_signatories(parties(signatories))
        .with_observers(parties(observers))
}

pub fn create_with_key(
    cid: &str,
    signatories: &[&str],
    observers: &[&str],
    maintainers: &[&str],
) -> CreateNode {
    create(cid, signatories, observers)
        .with_key(KeyWithMaintainers::new(value("key"), parties(maintainers)))
}

pub fn exercise(cid: &str, consuming: bool) -> ExerciseNode {
    ExerciseNode::new(
        ContractId::new(cid),
        template(),
        "Choice",
        consuming,
        value("choice-argument"),
    )
    .with_result(value("result"))
}

pub fn completion_info() -> CompletionInfo {
    CompletionInfo::new([party("submitter")], "application", "command-1")
}

pub fn accepted(
    transaction: Transaction,
    completion: Option<CompletionInfo>,
) -> TransactionAccepted {
    TransactionAccepted {
        completion_info: completion,
        transaction_meta: TransactionMetadata {
            ledger_effective_time: Timestamp(1_000),
            workflow_id: Some("workflow".to_string()),
            submission_time: Timestamp(900),
        },
        transaction,
        update_id: UpdateId::new(UPDATE_ID),
        record_time: Timestamp(1_100),
        domain_id: DomainId::new(DOMAIN),
        domain_index: None,
        contract_metadata: Default::default(),
    }
}

pub fn traced(update: TransactionAccepted) -> TracedUpdate {
    TracedUpdate::untraced(Update::TransactionAccepted(update))
}

pub fn projector() -> UpdateProjector {
    UpdateProjector::from_config(ParticipantId::new(PARTICIPANT), &ProjectorConfig::default())
}

pub fn projector_with(compression: CompressionStrategy) -> UpdateProjector {
    UpdateProjector::new(
        ParticipantId::new(PARTICIPANT),
        Arc::new(BincodeValueSerializer),
        compression,
    )
}

pub fn kinds(rows: &[IndexRow]) -> Vec<&'static str> {
    rows.iter().map(IndexRow::kind).collect()
}

/// Parties of the id filter rows, as a set.
pub fn filter_parties(rows: &[IndexRow], kind: &str) -> BTreeSet<Party> {
    rows.iter()
        .filter(|row| row.kind() == kind)
        .map(|row| match row {
            IndexRow::IdFilterCreateStakeholder(row) => row.party_id.clone(),
            IndexRow::IdFilterConsumingStakeholder(row) => row.party_id.clone(),
            IndexRow::IdFilterConsumingNonStakeholderInformee(row) => row.party_id.clone(),
            IndexRow::IdFilterNonConsumingInformee(row) => row.party_id.clone(),
            IndexRow::IdFilterAssignStakeholder(row) => row.party_id.clone(),
            IndexRow::IdFilterUnassignStakeholder(row) => row.party_id.clone(),
            other => panic!("{} is not an id filter row", other.kind()),
        })
        .collect()
}
