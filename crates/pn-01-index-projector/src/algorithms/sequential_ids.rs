//! # Sequential Id Assignment
//!
//! Resolves the `Unassigned` placeholders of projected rows, in row order.
//! This is the index writer's step: the projector never calls it.
//!
//! - Event rows receive consecutive ids starting at `last_assigned + 1`.
//! - Id filter rows share the id of the closest preceding event row.
//! - `TransactionMeta` rows receive the range of ids assigned since the
//!   previous meta row; the range is empty (`first = last + 1`) when no event
//!   was assigned.
//!
//! Assignment is all-or-nothing: on error the rows are left untouched.

use crate::domain::errors::SequencingError;
use crate::domain::rows::{EventSequentialId, IndexRow};

enum Assignment {
    Single(i64),
    Range { first: i64, last: i64 },
    Skip,
}

/// Assign sequential ids to `rows`, returning the new last assigned id.
pub fn assign_sequential_ids(
    rows: &mut [IndexRow],
    last_assigned: i64,
) -> Result<i64, SequencingError> {
    let (plan, last) = plan_assignments(rows, last_assigned)?;

    for (row, assignment) in rows.iter_mut().zip(plan) {
        match assignment {
            Assignment::Single(id) => {
                if let Some(slot) = row.sequential_id_slot_mut() {
                    *slot = EventSequentialId::Assigned(id);
                }
            }
            Assignment::Range { first, last } => {
                if let IndexRow::TransactionMeta(meta) = row {
                    meta.event_sequential_id_first = EventSequentialId::Assigned(first);
                    meta.event_sequential_id_last = EventSequentialId::Assigned(last);
                }
            }
            Assignment::Skip => {}
        }
    }

    Ok(last)
}

fn plan_assignments(
    rows: &[IndexRow],
    last_assigned: i64,
) -> Result<(Vec<Assignment>, i64), SequencingError> {
    let mut plan = Vec::with_capacity(rows.len());
    let mut last = last_assigned;
    let mut current_event: Option<i64> = None;
    let mut range_first: Option<i64> = None;

    for (index, row) in rows.iter().enumerate() {
        if let IndexRow::TransactionMeta(meta) = row {
            if meta.event_sequential_id_first.is_assigned()
                || meta.event_sequential_id_last.is_assigned()
            {
                return Err(SequencingError::AlreadyAssigned { index });
            }
            let first = match range_first.take() {
                Some(first) => first,
                None => last.checked_add(1).ok_or(SequencingError::Overflow)?,
            };
            plan.push(Assignment::Range { first, last });
            current_event = None;
            continue;
        }

        let Some(slot) = row.event_sequential_id() else {
            plan.push(Assignment::Skip);
            continue;
        };
        if slot.is_assigned() {
            return Err(SequencingError::AlreadyAssigned { index });
        }

        if row.is_event() {
            last = last.checked_add(1).ok_or(SequencingError::Overflow)?;
            current_event = Some(last);
            range_first.get_or_insert(last);
            plan.push(Assignment::Single(last));
        } else {
            let id = current_event.ok_or(SequencingError::OrphanFilterRow { index })?;
            plan.push(Assignment::Single(id));
        }
    }

    Ok((plan, last))
}
