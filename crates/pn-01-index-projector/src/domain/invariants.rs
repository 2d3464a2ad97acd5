//! Domain invariants for projected rows
//!
//! Checked by the projector in debug builds and by the test suites.

use super::rows::IndexRow;

/// INVARIANT-1: Witness Tiers
/// Every event's flat witnesses are contained in its tree witnesses.
pub fn invariant_flat_within_tree(rows: &[IndexRow]) -> bool {
    rows.iter()
        .filter_map(IndexRow::witnesses)
        .all(|(flat, tree)| flat.is_subset(tree))
}

/// INVARIANT-2: Deferred Sequencing
/// The projector never invents sequential ids.
pub fn invariant_sequential_ids_unassigned(rows: &[IndexRow]) -> bool {
    rows.iter()
        .filter_map(IndexRow::event_sequential_id)
        .all(|id| !id.is_assigned())
}

/// INVARIANT-3: Single Summary
/// Exactly one `TransactionMeta` row, and it is the last row.
pub fn invariant_single_trailing_meta(rows: &[IndexRow]) -> bool {
    let meta_rows = rows
        .iter()
        .filter(|row| matches!(row, IndexRow::TransactionMeta(_)))
        .count();
    meta_rows == 1 && matches!(rows.last(), Some(IndexRow::TransactionMeta(_)))
}

/// INVARIANT-4: Filter Placement
/// Id filter rows only appear after an event row of the same update.
pub fn invariant_filters_follow_events(rows: &[IndexRow]) -> bool {
    let mut seen_event = false;
    for row in rows {
        if row.is_event() {
            seen_event = true;
        } else if row.is_id_filter() && !seen_event {
            return false;
        }
    }
    true
}

/// INVARIANT-5: Single Completion
/// At most one completion row per update.
pub fn invariant_at_most_one_completion(rows: &[IndexRow]) -> bool {
    rows.iter()
        .filter(|row| matches!(row, IndexRow::CommandCompletion(_)))
        .count()
        <= 1
}
