use crate::NodeId;

/// One entry of the document's mutation journal.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub kind: MutationKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationKind {
    /// Children of `target` were added or removed.
    ChildList {
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    /// An attribute (or inline style property) of `target` changed value.
    Attribute { name: String },
}

impl MutationRecord {
    pub fn is_child_list(&self) -> bool {
        matches!(self.kind, MutationKind::ChildList { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Journal {
    pub(crate) observing: bool,
    pub(crate) records: Vec<MutationRecord>,
}

impl Journal {
    pub(crate) fn push(&mut self, record: MutationRecord) {
        if self.observing {
            self.records.push(record);
        }
    }
}
