//! What a merge did, decision by decision.

use rtm_dom::NodeId;
use serde::{Deserialize, Serialize};

use crate::placement::Placement;

/// Why an identity-matched, non-equivalent element was left alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtectReason {
    /// No stored fingerprint: the element was never written by the tool, or
    /// the user removed the fingerprint.
    Unfingerprinted,
    /// The stored fingerprint no longer matches the element's content.
    UserModified,
}

/// A single merge decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeChange {
    /// A proposed element had no counterpart and was inserted.
    Inserted {
        key: String,
        node: NodeId,
        placement: Placement,
    },
    /// A certified, unmodified original element was replaced.
    Replaced {
        key: String,
        old: NodeId,
        new: NodeId,
    },
    /// A differing original element was kept as is.
    Protected {
        key: String,
        node: NodeId,
        reason: ProtectReason,
    },
    /// An attribute of the proposed root was copied to the original root.
    RootAttributeAdded { name: String, value: String },
}

impl MergeChange {
    /// Returns `true` if this decision mutated the original tree.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, MergeChange::Protected { .. })
    }
}

/// The result of one merge call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Decisions in the order they were taken.
    pub changes: Vec<MergeChange>,
    /// Identity-matched elements found equivalent.
    pub unchanged: usize,
}

impl MergeReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the original tree was mutated and should be
    /// persisted.
    pub fn changed(&self) -> bool {
        self.changes.iter().any(MergeChange::is_mutation)
    }

    pub fn inserted(&self) -> usize {
        self.count(|c| matches!(c, MergeChange::Inserted { .. }))
    }

    pub fn replaced(&self) -> usize {
        self.count(|c| matches!(c, MergeChange::Replaced { .. }))
    }

    pub fn protected(&self) -> usize {
        self.count(|c| matches!(c, MergeChange::Protected { .. }))
    }

    fn count(&self, pred: impl Fn(&MergeChange) -> bool) -> usize {
        self.changes.iter().filter(|c| pred(c)).count()
    }

    pub(crate) fn push(&mut self, change: MergeChange) {
        self.changes.push(change);
    }
}
