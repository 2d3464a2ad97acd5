//! # Update Kind Coverage
//!
//! Completions, party management, topology, positions, strategy failures and
//! the writer-side sequencing of projected batches.

mod common;

use common::*;
use pn_01_index_projector::{
    assign_sequential_ids, project_batch, CompressionError, CompressionStrategy, EventSequentialId,
    FieldCompressor, IndexRow, ProjectionError, SerializationError, UpdateProjection,
    UpdateProjector, ValueSerializer, ZstdFieldCompressor,
};
use shared_types::{
    AuthorizationEvent, AuthorizationLevel, CommandRejected, ContractId, DeduplicationPeriod,
    DomainId, DomainIndex, Offset, ParticipantId, PartyAddedToParticipant, RejectionReason,
    RequestIndex, SequencerIndex, SequencerIndexMoved, TemplateId, Timestamp, TopologyEvent,
    TopologyTransactionEffective, TraceContext, TracedUpdate, TransactionBuilder, Update, UpdateId,
    VersionedValue,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

// =============================================================================
// TEST DOUBLES
// =============================================================================

struct FailingSerializer;

impl ValueSerializer for FailingSerializer {
    fn serialize_value(
        &self,
        contract_id: &ContractId,
        _value: &VersionedValue,
    ) -> Result<Vec<u8>, SerializationError> {
        Err(SerializationError::new(contract_id.to_string(), "unsupported value"))
    }
}

struct FailingCompressor;

impl FieldCompressor for FailingCompressor {
    fn algorithm_id(&self) -> Option<i32> {
        Some(99)
    }

    fn compress(&self, _bytes: Vec<u8>) -> Result<Vec<u8>, CompressionError> {
        Err(CompressionError::Rejected("payload too large".to_string()))
    }
}

fn rejection(period: Option<DeduplicationPeriod>) -> TracedUpdate {
    let mut info = completion_info()
        .with_submission_id("submission-1")
        .with_message_uuid(Uuid::nil());
    if let Some(period) = period {
        info = info.with_deduplication(period);
    }
    TracedUpdate::untraced(Update::CommandRejected(CommandRejected {
        record_time: Timestamp(50),
        completion_info: info,
        reason: RejectionReason::new(6, "contract not active").with_metadata("cid", "#c1"),
        domain_id: DomainId::new(DOMAIN),
        domain_index: Some(DomainIndex::of_request(RequestIndex {
            counter: 4,
            sequencer_counter: Some(42),
            timestamp: Timestamp(49),
        })),
    }))
}

fn single_completion(rows: &[IndexRow]) -> &pn_01_index_projector::CommandCompletion {
    match rows {
        [IndexRow::CommandCompletion(completion)] => completion,
        other => panic!("expected a single completion, got {:?}", kinds(other)),
    }
}

// =============================================================================
// COMPLETIONS
// =============================================================================

#[test]
fn test_command_rejected_completion() {
    let rows = projector().project(Offset(3), &rejection(None)).unwrap();
    let completion = single_completion(&rows);

    assert_eq!(completion.completion_offset, Offset(3));
    assert_eq!(completion.update_id, None);
    assert_eq!(completion.rejection_status_code, Some(6));
    assert_eq!(
        completion.rejection_status_message.as_deref(),
        Some("contract not active")
    );
    let details: BTreeMap<String, String> =
        serde_json::from_slice(completion.rejection_status_details.as_ref().unwrap()).unwrap();
    assert_eq!(details.get("cid").map(String::as_str), Some("#c1"));
    assert_eq!(completion.submission_id.as_deref(), Some("submission-1"));
    assert_eq!(completion.message_uuid, Some(Uuid::nil().to_string()));
    assert_eq!(completion.request_sequencer_counter, Some(42));
    assert!(completion.is_transaction);
}

#[test]
fn test_deduplication_absent() {
    let rows = projector().project(Offset(3), &rejection(None)).unwrap();
    let completion = single_completion(&rows);
    assert_eq!(completion.deduplication_offset, None);
    assert_eq!(completion.deduplication_duration_seconds, None);
    assert_eq!(completion.deduplication_duration_nanos, None);
}

#[test]
fn test_deduplication_by_offset() {
    let update = rejection(Some(DeduplicationPeriod::Offset(Offset(17))));
    let rows = projector().project(Offset(3), &update).unwrap();
    let completion = single_completion(&rows);
    assert_eq!(completion.deduplication_offset, Some(Offset(17)));
    assert_eq!(completion.deduplication_duration_seconds, None);
    assert_eq!(completion.deduplication_duration_nanos, None);
}

#[test]
fn test_deduplication_by_duration() {
    let period = DeduplicationPeriod::Duration(Duration::new(120, 250_000));
    let update = rejection(Some(period));
    let rows = projector().project(Offset(3), &update).unwrap();
    let completion = single_completion(&rows);
    assert_eq!(completion.deduplication_offset, None);
    assert_eq!(completion.deduplication_duration_seconds, Some(120));
    assert_eq!(completion.deduplication_duration_nanos, Some(250_000));
}

#[test]
fn test_deduplication_duration_out_of_range_fails_update() {
    let period = DeduplicationPeriod::Duration(Duration::from_secs(u64::MAX));
    let update = rejection(Some(period));
    let err = projector().project(Offset(3), &update).unwrap_err();
    assert!(matches!(
        err,
        ProjectionError::DeduplicationOutOfRange { seconds: u64::MAX }
    ));
}

#[test]
fn test_transaction_completion_carries_update_id() {
    let mut builder = TransactionBuilder::new();
    builder.add(create("#c1", &["s"], &[]));
    let mut update = accepted(builder.build(), Some(completion_info()));
    update.domain_index = Some(DomainIndex::of_request(RequestIndex {
        counter: 1,
        sequencer_counter: None,
        timestamp: Timestamp(1),
    }));

    let rows = projector().project(Offset(8), &traced(update)).unwrap();

    match &rows[2] {
        IndexRow::CommandCompletion(completion) => {
            assert_eq!(completion.update_id, Some(UpdateId::new(UPDATE_ID)));
            assert_eq!(completion.request_sequencer_counter, None);
            assert_eq!(completion.rejection_status_code, None);
            assert!(completion.is_transaction);
        }
        other => panic!("expected completion, got {}", other.kind()),
    }
}

#[test]
fn test_transaction_without_completion_info() {
    let mut builder = TransactionBuilder::new();
    builder.add(create("#c1", &["s"], &[]));
    let rows = projector()
        .project(Offset(8), &traced(accepted(builder.build(), None)))
        .unwrap();

    assert_eq!(
        kinds(&rows),
        vec![
            "EventCreate",
            "IdFilterCreateStakeholder",
            "TransactionMeta",
        ]
    );
    match &rows[0] {
        IndexRow::EventCreate(event) => {
            assert_eq!(event.command_id, None);
            assert_eq!(event.submitters, None);
            assert_eq!(event.workflow_id.as_deref(), Some("workflow"));
        }
        other => panic!("expected create event, got {}", other.kind()),
    }
}

// =============================================================================
// PARTY MANAGEMENT, TOPOLOGY AND POSITIONS
// =============================================================================

#[test]
fn test_party_added_on_other_participant_is_remote() {
    let update = TracedUpdate::untraced(Update::PartyAddedToParticipant(PartyAddedToParticipant {
        party: party("alice"),
        display_name: "Alice".to_string(),
        participant_id: ParticipantId::new("participant-2"),
        record_time: Timestamp(10),
        submission_id: Some("sub".to_string()),
    }));

    let rows = projector().project(Offset(2), &update).unwrap();

    match rows.as_slice() {
        [IndexRow::PartyEntry(entry)] => {
            assert_eq!(entry.party, Some(party("alice")));
            assert_eq!(entry.display_name.as_deref(), Some("Alice"));
            assert_eq!(entry.typ.as_str(), "accept");
            assert_eq!(entry.is_local, Some(false));
            assert_eq!(entry.recorded_at, Timestamp(10));
        }
        other => panic!("unexpected rows {:?}", kinds(other)),
    }
}

#[test]
fn test_topology_transaction() {
    let update = TracedUpdate::untraced(Update::TopologyTransactionEffective(
        TopologyTransactionEffective {
            update_id: UpdateId::new("topology-1"),
            events: vec![
                TopologyEvent::PartyToParticipantAuthorization {
                    party: party("alice"),
                    participant: ParticipantId::new(PARTICIPANT),
                    authorization_event: AuthorizationEvent::Added(
                        AuthorizationLevel::Confirmation,
                    ),
                },
                TopologyEvent::PartyToParticipantAuthorization {
                    party: party("bob"),
                    participant: ParticipantId::new(PARTICIPANT),
                    authorization_event: AuthorizationEvent::Revoked,
                },
            ],
            domain_id: DomainId::new(DOMAIN),
            effective_time: Timestamp(70),
            domain_index: None,
        },
    ));

    let rows = projector().project(Offset(4), &update).unwrap();

    assert_eq!(
        kinds(&rows),
        vec![
            "EventPartyToParticipant",
            "EventPartyToParticipant",
            "TransactionMeta",
        ]
    );
    match (&rows[0], &rows[1]) {
        (IndexRow::EventPartyToParticipant(added), IndexRow::EventPartyToParticipant(revoked)) => {
            assert_eq!(added.authorization_event, 1);
            assert_eq!(added.participant_permission, Some(2));
            assert_eq!(revoked.authorization_event, 2);
            assert_eq!(revoked.participant_permission, None);
            assert_eq!(added.record_time, Timestamp(70));
        }
        other => panic!("unexpected rows {:?}", other),
    }
}

#[test]
fn test_sequencer_index_moved_and_init() {
    let moved = TracedUpdate::untraced(Update::SequencerIndexMoved(SequencerIndexMoved {
        domain_id: DomainId::new(DOMAIN),
        sequencer_index: SequencerIndex {
            counter: 12,
            timestamp: Timestamp(5),
        },
        request_counter: Some(3),
    }));
    let rows = projector().project(Offset(9), &moved).unwrap();
    match rows.as_slice() {
        [IndexRow::SequencerIndexMoved(row)] => assert_eq!(row.domain_id.as_str(), DOMAIN),
        other => panic!("unexpected rows {:?}", kinds(other)),
    }

    let init = TracedUpdate::untraced(Update::Init {
        record_time: Timestamp(0),
    });
    assert!(projector().project(Offset(0), &init).unwrap().is_empty());
}

#[test]
fn test_trace_context_and_driver_metadata_pass_through() {
    let mut builder = TransactionBuilder::new();
    builder.add(create("#c1", &["s"], &[]));
    let mut update = accepted(builder.build(), None);
    update
        .contract_metadata
        .insert(ContractId::new("#c1"), vec![1, 2, 3]);
    let traced_update = TracedUpdate::new(
        Update::TransactionAccepted(update),
        TraceContext::with_traceparent("00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01"),
    );

    let rows = projector().project(Offset(1), &traced_update).unwrap();

    match &rows[0] {
        IndexRow::EventCreate(event) => {
            assert_eq!(event.driver_metadata, Some(vec![1, 2, 3]));
            let context: TraceContext = bincode::deserialize(&event.trace_context).unwrap();
            assert_eq!(context, traced_update.trace_context);
        }
        other => panic!("expected create event, got {}", other.kind()),
    }
}

// =============================================================================
// STRATEGIES AND FAILURES
// =============================================================================

#[test]
fn test_zstd_columns_are_tagged_and_decodable() {
    let projector = projector_with(CompressionStrategy::all_zstd(3));
    let mut builder = TransactionBuilder::new();
    builder.add(create_with_key("#c1", &["s"], &[], &["s"]));
    let rows = projector
        .project(Offset(1), &traced(accepted(builder.build(), None)))
        .unwrap();

    match &rows[0] {
        IndexRow::EventCreate(event) => {
            assert_eq!(event.create_argument_compression, Some(1));
            assert_eq!(event.create_key_value_compression, Some(1));
            let argument = zstd::decode_all(event.create_argument.as_slice()).unwrap();
            let decoded: VersionedValue = bincode::deserialize(&argument).unwrap();
            assert_eq!(decoded, value("argument"));
        }
        other => panic!("expected create event, got {}", other.kind()),
    }
}

#[test]
fn test_uncompressed_columns_have_no_tag() {
    let mut builder = TransactionBuilder::new();
    builder.add(exercise("#c1", true).with_signatories(parties(&["s"])));
    let rows = projector()
        .project(Offset(1), &traced(accepted(builder.build(), None)))
        .unwrap();

    match &rows[0] {
        IndexRow::EventExercise(event) => {
            assert_eq!(event.exercise_argument_compression, None);
            assert_eq!(event.exercise_result_compression, None);
            assert!(event.exercise_result.is_some());
            assert!(event.create_key_value.is_none());
            assert_eq!(event.interface_id, None);
        }
        other => panic!("expected exercise event, got {}", other.kind()),
    }
}

#[test]
fn test_exercise_through_interface_records_interface_id() {
    let mut builder = TransactionBuilder::new();
    let node = exercise("#c1", false)
        .with_acting_parties(parties(&["s"]))
        .with_interface(TemplateId::new("P", "M", "Iface"));
    builder.add(node);
    let update = traced(accepted(builder.build(), None));

    let rows = projector().project(Offset(1), &update).unwrap();

    match &rows[0] {
        IndexRow::EventExercise(event) => {
            assert_eq!(event.interface_id.as_deref(), Some("P:M:Iface"));
            assert_eq!(event.template_id, "P:M:T");
        }
        other => panic!("expected exercise event, got {}", other.kind()),
    }
}

#[test]
fn test_serialization_failure_fails_whole_update() {
    let projector = UpdateProjector::new(
        ParticipantId::new(PARTICIPANT),
        Arc::new(FailingSerializer),
        CompressionStrategy::none(),
    );
    let mut builder = TransactionBuilder::new();
    builder.add(create("#c1", &["s"], &[]));
    builder.add(create("#c2", &["s"], &[]));

    let update = traced(accepted(builder.build(), Some(completion_info())));
    let err = projector.project(Offset(1), &update).unwrap_err();

    assert!(matches!(err, ProjectionError::Serialization { ref event, .. } if event == "#tx-1:0"));
    assert!(err.is_strategy_failure());
}

#[test]
fn test_compression_failure_fails_whole_update() {
    let compression = CompressionStrategy::new(
        Arc::new(ZstdFieldCompressor::default()),
        Arc::new(ZstdFieldCompressor::default()),
        Arc::new(ZstdFieldCompressor::default()),
        Arc::new(FailingCompressor),
    );
    let projector = projector_with(compression);
    let mut builder = TransactionBuilder::new();
    builder.add(create("#c1", &["s"], &[]));
    builder.add(exercise("#c1", true).with_signatories(parties(&["s"])));

    let err = projector
        .project(Offset(1), &traced(accepted(builder.build(), None)))
        .unwrap_err();

    assert!(matches!(
        err,
        ProjectionError::Compression {
            column: "exercise_result",
            ..
        }
    ));
}

#[test]
fn test_failed_update_fails_whole_batch() {
    let projector = UpdateProjector::new(
        ParticipantId::new(PARTICIPANT),
        Arc::new(FailingSerializer),
        CompressionStrategy::none(),
    );
    let mut builder = TransactionBuilder::new();
    builder.add(create("#c1", &["s"], &[]));
    let init = TracedUpdate::untraced(Update::Init {
        record_time: Timestamp(0),
    });
    let updates = vec![
        (Offset(1), init),
        (Offset(2), traced(accepted(builder.build(), None))),
    ];

    assert!(project_batch(&projector, &updates, 1).is_err());
    assert!(project_batch(&projector, &updates, usize::MAX).is_err());
}

// =============================================================================
// WRITER-SIDE SEQUENCING
// =============================================================================

#[test]
fn test_batch_rows_sequence_in_emission_order() {
    let mut first = TransactionBuilder::new();
    let root = first.add(exercise("#c0", true).with_signatories(parties(&["s"])));
    first
        .add_child(root, create("#c1", &["s", "o"], &[]))
        .unwrap();

    let mut rejected_update = rejection(None);
    if let Update::CommandRejected(rejected) = &mut rejected_update.update {
        rejected.domain_index = None;
    }

    let first_update = traced(accepted(first.build(), Some(completion_info())));
    let empty_update = traced(accepted(TransactionBuilder::new().build(), None));
    let updates = vec![
        (Offset(1), first_update),
        (Offset(2), rejected_update),
        (Offset(3), empty_update),
    ];

    let mut rows = project_batch(&projector(), &updates, 2).unwrap();
    let last = assign_sequential_ids(&mut rows, 100).unwrap();

    assert_eq!(last, 102);
    let ids: Vec<(&str, Option<i64>)> = rows
        .iter()
        .map(|row| {
            let id = row.event_sequential_id().and_then(EventSequentialId::value);
            (row.kind(), id)
        })
        .collect();
    assert_eq!(
        ids,
        vec![
            ("EventExercise", Some(101)),
            ("IdFilterConsumingStakeholder", Some(101)),
            ("EventCreate", Some(102)),
            ("IdFilterCreateStakeholder", Some(102)),
            ("IdFilterCreateStakeholder", Some(102)),
            ("CommandCompletion", None),
            ("TransactionMeta", None),
            ("CommandCompletion", None),
            ("TransactionMeta", None),
        ]
    );
    let ranges: Vec<(Option<i64>, Option<i64>)> = rows
        .iter()
        .filter_map(|row| match row {
            IndexRow::TransactionMeta(meta) => Some((
                meta.event_sequential_id_first.value(),
                meta.event_sequential_id_last.value(),
            )),
            _ => None,
        })
        .collect();
    assert_eq!(
        ranges,
        vec![(Some(101), Some(102)), (Some(103), Some(102))]
    );
}
