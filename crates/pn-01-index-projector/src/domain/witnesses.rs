//! # Witness Sets
//!
//! The two visibility tiers of an indexed event.
//!
//! - **Flat witnesses**: contract stakeholders, used by flat transaction
//!   streams and active-contract queries.
//! - **Tree witnesses**: every informee of the action, used for full
//!   transaction tree reconstruction.

use shared_types::Party;
use std::collections::BTreeSet;

/// Immutable, value-comparable set of parties.
pub type WitnessSet = BTreeSet<Party>;

/// Flat and tree witnesses of one event.
///
/// Tree witnesses always contain the flat witnesses: the constructor folds
/// the flat tier into the tree tier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Witnesses {
    flat: WitnessSet,
    tree: WitnessSet,
}

impl Witnesses {
    pub fn new(flat: WitnessSet, tree: WitnessSet) -> Self {
        let tree = tree.union(&flat).cloned().collect();
        Self { flat, tree }
    }

    /// Single-tier visibility: flat and tree witnesses coincide.
    pub fn stakeholders_only(stakeholders: WitnessSet) -> Self {
        Self {
            tree: stakeholders.clone(),
            flat: stakeholders,
        }
    }

    /// Visible only at the tree tier.
    pub fn informees_only(tree: WitnessSet) -> Self {
        Self {
            flat: WitnessSet::new(),
            tree,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn flat(&self) -> &WitnessSet {
        &self.flat
    }

    pub fn tree(&self) -> &WitnessSet {
        &self.tree
    }

    /// Informees that are not stakeholders (divulgees).
    pub fn non_stakeholder_informees(&self) -> impl Iterator<Item = &Party> {
        self.tree.difference(&self.flat)
    }

    pub fn into_parts(self) -> (WitnessSet, WitnessSet) {
        (self.flat, self.tree)
    }
}
