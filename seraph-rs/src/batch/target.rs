//! Identifier arguments accepted by the verbs.
//!
//! Every verb that addresses an existing entity takes a concrete identifier,
//! an entity carrying one, or a placeholder from the same batch.

use crate::edges::Relationship;
use crate::nodes::Node;

use super::placeholder::{Pending, Ref};

/// An entity reference before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Id(u64),
    Pending(Pending),
    /// An entity object that has not been saved yet.
    Unidentified,
}

impl From<Option<u64>> for Target {
    fn from(id: Option<u64>) -> Self {
        id.map_or(Target::Unidentified, Target::Id)
    }
}

/// Reference to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTarget(pub(crate) Target);

impl From<u64> for NodeTarget {
    fn from(id: u64) -> Self {
        NodeTarget(Target::Id(id))
    }
}

impl From<&Node> for NodeTarget {
    fn from(node: &Node) -> Self {
        NodeTarget(node.id.into())
    }
}

impl From<&Ref<Node>> for NodeTarget {
    fn from(reference: &Ref<Node>) -> Self {
        NodeTarget(Target::Pending(reference.pending()))
    }
}

/// A bulk placeholder is accepted here and rejected as ambiguous when resolved.
impl From<&Ref<Vec<Node>>> for NodeTarget {
    fn from(reference: &Ref<Vec<Node>>) -> Self {
        NodeTarget(Target::Pending(reference.pending()))
    }
}

/// Reference to a relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelTarget(pub(crate) Target);

impl From<u64> for RelTarget {
    fn from(id: u64) -> Self {
        RelTarget(Target::Id(id))
    }
}

impl From<&Relationship> for RelTarget {
    fn from(rel: &Relationship) -> Self {
        RelTarget(rel.id.into())
    }
}

impl From<&Ref<Relationship>> for RelTarget {
    fn from(reference: &Ref<Relationship>) -> Self {
        RelTarget(Target::Pending(reference.pending()))
    }
}

/// Which legacy index family an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    Node,
    Relationship,
}

impl IndexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Node => "node",
            IndexKind::Relationship => "relationship",
        }
    }
}

/// A node or relationship reference, for index operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityTarget {
    pub(crate) kind: IndexKind,
    pub(crate) target: Target,
}

impl EntityTarget {
    pub fn node(id: u64) -> Self {
        NodeTarget::from(id).into()
    }

    pub fn relationship(id: u64) -> Self {
        RelTarget::from(id).into()
    }

    pub fn kind(&self) -> IndexKind {
        self.kind
    }
}

impl From<NodeTarget> for EntityTarget {
    fn from(node: NodeTarget) -> Self {
        EntityTarget {
            kind: IndexKind::Node,
            target: node.0,
        }
    }
}

impl From<RelTarget> for EntityTarget {
    fn from(rel: RelTarget) -> Self {
        EntityTarget {
            kind: IndexKind::Relationship,
            target: rel.0,
        }
    }
}

impl From<&Node> for EntityTarget {
    fn from(node: &Node) -> Self {
        NodeTarget::from(node).into()
    }
}

impl From<&Ref<Node>> for EntityTarget {
    fn from(reference: &Ref<Node>) -> Self {
        NodeTarget::from(reference).into()
    }
}

impl From<&Relationship> for EntityTarget {
    fn from(rel: &Relationship) -> Self {
        RelTarget::from(rel).into()
    }
}

impl From<&Ref<Relationship>> for EntityTarget {
    fn from(reference: &Ref<Relationship>) -> Self {
        RelTarget::from(reference).into()
    }
}
