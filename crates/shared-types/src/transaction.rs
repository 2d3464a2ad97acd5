//! # Committed Transaction Trees
//!
//! A transaction is an arena of [`Node`]s keyed by [`NodeId`] plus an ordered
//! list of root ids. Exercise and rollback nodes reference their children by
//! id, so the tree has no pointer cycles and any node is reachable in O(log n).
//!
//! Ids are handed out by [`TransactionBuilder`] in construction order; a
//! depth-first construction therefore yields pre-order ids. Consumers walk
//! the tree from the roots and never rely on id order.

use crate::errors::TransactionError;
use crate::identifiers::{ContractId, NodeId, PackageName, Party, TemplateId};
use crate::value::VersionedValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Contract key together with the parties maintaining it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyWithMaintainers {
    pub value: VersionedValue,
    pub maintainers: BTreeSet<Party>,
}

impl KeyWithMaintainers {
    pub fn new(value: VersionedValue, maintainers: impl IntoIterator<Item = Party>) -> Self {
        Self {
            value,
            maintainers: maintainers.into_iter().collect(),
        }
    }
}

/// Contract creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNode {
    pub contract_id: ContractId,
    pub template_id: TemplateId,
    pub package_name: PackageName,
    pub argument: VersionedValue,
    pub signatories: BTreeSet<Party>,
    pub observers: BTreeSet<Party>,
    pub key: Option<KeyWithMaintainers>,
}

impl CreateNode {
    pub fn new(contract_id: ContractId, template_id: TemplateId, argument: VersionedValue) -> Self {
        Self {
            contract_id,
            template_id,
            package_name: PackageName::new("default"),
            argument,
            signatories: BTreeSet::new(),
            observers: BTreeSet::new(),
            key: None,
        }
    }

    pub fn with_package_name(mut self, package_name: PackageName) -> Self {
        self.package_name = package_name;
        self
    }

    pub fn with_signatories(mut self, parties: impl IntoIterator<Item = Party>) -> Self {
        self.signatories = parties.into_iter().collect();
        self
    }

    pub fn with_observers(mut self, parties: impl IntoIterator<Item = Party>) -> Self {
        self.observers = parties.into_iter().collect();
        self
    }

    pub fn with_key(mut self, key: KeyWithMaintainers) -> Self {
        self.key = Some(key);
        self
    }

    /// Signatories and observers.
    pub fn stakeholders(&self) -> BTreeSet<Party> {
        self.signatories.union(&self.observers).cloned().collect()
    }
}

/// Choice exercise on an existing contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseNode {
    pub target_contract_id: ContractId,
    pub template_id: TemplateId,
    pub interface_id: Option<TemplateId>,
    pub package_name: PackageName,
    pub choice_id: String,
    pub consuming: bool,
    pub acting_parties: BTreeSet<Party>,
    pub choice_observers: BTreeSet<Party>,
    /// Signatories of the target contract.
    pub signatories: BTreeSet<Party>,
    /// Observers of the target contract.
    pub observers: BTreeSet<Party>,
    pub chosen_value: VersionedValue,
    pub exercise_result: Option<VersionedValue>,
    pub key: Option<KeyWithMaintainers>,
    pub children: Vec<NodeId>,
}

impl ExerciseNode {
    pub fn new(
        target_contract_id: ContractId,
        template_id: TemplateId,
        choice_id: impl Into<String>,
        consuming: bool,
        chosen_value: VersionedValue,
    ) -> Self {
        Self {
            target_contract_id,
            template_id,
            interface_id: None,
            package_name: PackageName::new("default"),
            choice_id: choice_id.into(),
            consuming,
            acting_parties: BTreeSet::new(),
            choice_observers: BTreeSet::new(),
            signatories: BTreeSet::new(),
            observers: BTreeSet::new(),
            chosen_value,
            exercise_result: None,
            key: None,
            children: Vec::new(),
        }
    }

    pub fn with_acting_parties(mut self, parties: impl IntoIterator<Item = Party>) -> Self {
        self.acting_parties = parties.into_iter().collect();
        self
    }

    pub fn with_choice_observers(mut self, parties: impl IntoIterator<Item = Party>) -> Self {
        self.choice_observers = parties.into_iter().collect();
        self
    }

    pub fn with_signatories(mut self, parties: impl IntoIterator<Item = Party>) -> Self {
        self.signatories = parties.into_iter().collect();
        self
    }

    pub fn with_observers(mut self, parties: impl IntoIterator<Item = Party>) -> Self {
        self.observers = parties.into_iter().collect();
        self
    }

    pub fn with_result(mut self, result: VersionedValue) -> Self {
        self.exercise_result = Some(result);
        self
    }

    pub fn with_key(mut self, key: KeyWithMaintainers) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_package_name(mut self, package_name: PackageName) -> Self {
        self.package_name = package_name;
        self
    }

    pub fn with_interface(mut self, interface_id: TemplateId) -> Self {
        self.interface_id = Some(interface_id);
        self
    }

    /// Signatories and observers of the target contract.
    pub fn stakeholders(&self) -> BTreeSet<Party> {
        self.signatories.union(&self.observers).cloned().collect()
    }
}

/// Contract fetch. Never indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchNode {
    pub contract_id: ContractId,
    pub template_id: TemplateId,
    pub acting_parties: BTreeSet<Party>,
    pub signatories: BTreeSet<Party>,
    pub observers: BTreeSet<Party>,
}

/// Key lookup. Never indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupByKeyNode {
    pub template_id: TemplateId,
    pub key: KeyWithMaintainers,
    pub result: Option<ContractId>,
}

/// Grouping of actions that were rolled back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackNode {
    pub children: Vec<NodeId>,
}

/// A transaction node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Create(CreateNode),
    Exercise(ExerciseNode),
    Fetch(FetchNode),
    LookupByKey(LookupByKeyNode),
    Rollback(RollbackNode),
}

impl Node {
    /// Child ids, empty for leaf nodes.
    pub fn children(&self) -> &[NodeId] {
        match self {
            Node::Exercise(exercise) => &exercise.children,
            Node::Rollback(rollback) => &rollback.children,
            Node::Create(_) | Node::Fetch(_) | Node::LookupByKey(_) => &[],
        }
    }

    /// Short name used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Create(_) => "create",
            Node::Exercise(_) => "exercise",
            Node::Fetch(_) => "fetch",
            Node::LookupByKey(_) => "lookup-by-key",
            Node::Rollback(_) => "rollback",
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            Node::Exercise(exercise) => Some(&mut exercise.children),
            Node::Rollback(rollback) => Some(&mut rollback.children),
            Node::Create(_) | Node::Fetch(_) | Node::LookupByKey(_) => None,
        }
    }
}

impl From<CreateNode> for Node {
    fn from(node: CreateNode) -> Self {
        Node::Create(node)
    }
}

impl From<ExerciseNode> for Node {
    fn from(node: ExerciseNode) -> Self {
        Node::Exercise(node)
    }
}

impl From<FetchNode> for Node {
    fn from(node: FetchNode) -> Self {
        Node::Fetch(node)
    }
}

impl From<LookupByKeyNode> for Node {
    fn from(node: LookupByKeyNode) -> Self {
        Node::LookupByKey(node)
    }
}

impl From<RollbackNode> for Node {
    fn from(node: RollbackNode) -> Self {
        Node::Rollback(node)
    }
}

/// An immutable committed transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    nodes: BTreeMap<NodeId, Node>,
    roots: Vec<NodeId>,
}

impl Transaction {
    /// Assemble a transaction from an existing arena.
    ///
    /// No structural validation is performed; consumers must treat dangling
    /// ids as malformed input. Prefer [`TransactionBuilder`].
    pub fn from_parts(nodes: BTreeMap<NodeId, Node>, roots: Vec<NodeId>) -> Self {
        Self { nodes, roots }
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Builds a [`Transaction`], assigning node ids in insertion order.
///
/// Ids come out in pre-order only when the tree is built depth-first: all
/// descendants of a node are added before its next sibling. Adding a child to
/// an earlier parent later on is allowed and gives that child a larger id
/// than nodes that follow it in the tree.
///
/// Children lists are owned by the builder: any children already present on
/// an inserted node are discarded.
#[derive(Debug, Default)]
pub struct TransactionBuilder {
    nodes: BTreeMap<NodeId, Node>,
    roots: Vec<NodeId>,
    next_id: u32,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a root node.
    pub fn add(&mut self, node: impl Into<Node>) -> NodeId {
        let node_id = self.insert(node.into());
        self.roots.push(node_id);
        node_id
    }

    /// Append `node` as the last child of `parent`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        node: impl Into<Node>,
    ) -> Result<NodeId, TransactionError> {
        let parent_node = self
            .nodes
            .get(&parent)
            .ok_or(TransactionError::UnknownParent(parent))?;
        if !matches!(parent_node, Node::Exercise(_) | Node::Rollback(_)) {
            return Err(TransactionError::LeafParent {
                parent,
                kind: parent_node.kind(),
            });
        }

        let node_id = self.insert(node.into());
        if let Some(children) = self.nodes.get_mut(&parent).and_then(Node::children_mut) {
            children.push(node_id);
        }
        Ok(node_id)
    }

    pub fn build(self) -> Transaction {
        Transaction {
            nodes: self.nodes,
            roots: self.roots,
        }
    }

    fn insert(&mut self, mut node: Node) -> NodeId {
        if let Some(children) = node.children_mut() {
            children.clear();
        }
        let node_id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(node_id, node);
        node_id
    }
}
