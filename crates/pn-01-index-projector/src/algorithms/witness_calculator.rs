//! # Witness Calculator
//!
//! Pre-order walk over a transaction arena computing, per visible node, its
//! flat and tree witnesses.
//!
//! ## Algorithm
//!
//! An explicit stack drives the walk. Entering a rollback node pushes an exit
//! marker and increments the rollback depth; popping the marker decrements it.
//! Only nodes reached at depth zero are visible. The subtree below a rollback
//! is still walked so malformed references are detected anywhere in the tree.
//!
//! ## Witness Rules
//!
//! | Node | Flat | Tree |
//! |------|------|------|
//! | Create | signatories ∪ observers | signatories ∪ observers |
//! | Consuming exercise | signatories ∪ observers | flat ∪ choice observers |
//! | Non-consuming exercise | ∅ | acting parties ∪ choice observers |
//! | Fetch, LookupByKey | ∅ | ∅ |

use crate::domain::errors::ProjectionError;
use crate::domain::witnesses::{WitnessSet, Witnesses};
use shared_types::{CreateNode, ExerciseNode, Node, NodeId, Reassignment, Transaction};
use std::collections::BTreeSet;

/// A node outside every rollback, with its witnesses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleNode<'a> {
    pub node_id: NodeId,
    pub node: &'a Node,
    pub witnesses: Witnesses,
    /// Visible children in construction order; empty for leaves.
    pub visible_children: Vec<NodeId>,
}

enum Step {
    Enter(NodeId),
    LeaveRollback,
}

/// Visible nodes of `transaction` in pre-order.
///
/// Order follows the tree from the roots. Node ids are never used to order
/// the walk, so out-of-order construction still emits parents first.
pub fn visible_nodes(transaction: &Transaction) -> Result<Vec<VisibleNode<'_>>, ProjectionError> {
    let mut visible = Vec::with_capacity(transaction.len());
    let mut seen = BTreeSet::new();
    let mut rollback_depth: usize = 0;
    let mut stack: Vec<Step> = transaction
        .roots()
        .iter()
        .rev()
        .map(|id| Step::Enter(*id))
        .collect();

    while let Some(step) = stack.pop() {
        let node_id = match step {
            Step::Enter(node_id) => node_id,
            Step::LeaveRollback => {
                rollback_depth -= 1;
                continue;
            }
        };

        if !seen.insert(node_id) {
            return Err(ProjectionError::RepeatedNode(node_id));
        }
        let node = transaction
            .node(node_id)
            .ok_or(ProjectionError::DanglingNode(node_id))?;

        if let Node::Rollback(_) = node {
            rollback_depth += 1;
            stack.push(Step::LeaveRollback);
        } else if rollback_depth == 0 {
            let visible_children = visible_children_of(transaction, node)?;
            visible.push(VisibleNode {
                node_id,
                node,
                witnesses: node_witnesses(node),
                visible_children,
            });
        }

        stack.extend(node.children().iter().rev().map(|id| Step::Enter(*id)));
    }

    Ok(visible)
}

fn visible_children_of(
    transaction: &Transaction,
    node: &Node,
) -> Result<Vec<NodeId>, ProjectionError> {
    let mut children = Vec::with_capacity(node.children().len());
    for child_id in node.children() {
        let child = transaction
            .node(*child_id)
            .ok_or(ProjectionError::DanglingNode(*child_id))?;
        if !matches!(child, Node::Rollback(_)) {
            children.push(*child_id);
        }
    }
    Ok(children)
}

/// Witnesses of a single node, ignoring its position in the tree.
pub fn node_witnesses(node: &Node) -> Witnesses {
    match node {
        Node::Create(create) => create_witnesses(create),
        Node::Exercise(exercise) => exercise_witnesses(exercise),
        Node::Fetch(_) | Node::LookupByKey(_) | Node::Rollback(_) => Witnesses::empty(),
    }
}

pub fn create_witnesses(create: &CreateNode) -> Witnesses {
    Witnesses::stakeholders_only(create.stakeholders())
}

pub fn exercise_witnesses(exercise: &ExerciseNode) -> Witnesses {
    if exercise.consuming {
        Witnesses::new(exercise.stakeholders(), exercise.choice_observers.clone())
    } else {
        let informees: WitnessSet = exercise
            .acting_parties
            .union(&exercise.choice_observers)
            .cloned()
            .collect();
        Witnesses::informees_only(informees)
    }
}

/// Single-tier witnesses of a reassignment: the contract stakeholders.
pub fn reassignment_witnesses(reassignment: &Reassignment) -> Witnesses {
    match reassignment {
        Reassignment::Assign(assign) => create_witnesses(&assign.create_node),
        Reassignment::Unassign(unassign) => {
            Witnesses::stakeholders_only(unassign.stakeholders.clone())
        }
    }
}
