//! Mutation Journal
//!
//! Every structural or character-data change made through the public
//! `Document` mutation methods is appended here, the way a browser queues
//! mutation records for observers. The change monitor drains the journal.
//! Writes made inside `Document::untracked` are not recorded.

use super::node::NodeId;

/// What kind of change a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Children were added to or removed from `target`
    ChildList,
    /// The character data of `target` changed
    CharacterData,
}

/// One recorded change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub kind: MutationKind,
    /// Parent for child-list records, the text node for character data
    pub target: NodeId,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

impl Mutation {
    pub fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Mutation {
            kind: MutationKind::ChildList,
            target,
            added,
            removed,
        }
    }

    pub fn character_data(target: NodeId) -> Self {
        Mutation {
            kind: MutationKind::CharacterData,
            target,
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}

/// Queue of pending mutation records
#[derive(Debug, Default)]
pub struct MutationJournal {
    records: Vec<Mutation>,
    /// Nesting depth of `untracked` sections
    suspended: u32,
}

impl MutationJournal {
    /// Append a record unless recording is suspended
    pub fn record(&mut self, mutation: Mutation) {
        if self.suspended == 0 {
            self.records.push(mutation);
        }
    }

    pub fn suspend(&mut self) {
        self.suspended += 1;
    }

    pub fn resume(&mut self) {
        self.suspended = self.suspended.saturating_sub(1);
    }

    /// Drain all pending records
    pub fn take(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.records)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.records.len()
    }
}
