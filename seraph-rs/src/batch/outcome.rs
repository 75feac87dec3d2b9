//! Decoding raw results into the values each verb promises.
//!
//! Shared by the direct call path and the batch demultiplexer, so a verb
//! yields the same shape whether it ran alone or inside a batch.

use serde_json::Value;

use crate::edges::Relationship;
use crate::errors::{Result, SeraphError};
use crate::nodes::Node;

use super::placeholder::Targets;

/// How the result body of one operation is decoded.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Shape {
    Node,
    /// Update: the service answers without a body, the caller's node is the result.
    EchoNode(Node),
    Relationship,
    EchoRelationship(Relationship),
    Nodes,
    Relationships,
    Labels,
    Unit,
}

/// Decoded result of a verb call.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Node(Node),
    Relationship(Relationship),
    Nodes(Vec<Node>),
    Relationships(Vec<Relationship>),
    Labels(Vec<String>),
    Unit,
}

impl Resolved {
    fn kind(&self) -> &'static str {
        match self {
            Resolved::Node(_) => "node",
            Resolved::Relationship(_) => "relationship",
            Resolved::Nodes(_) => "node list",
            Resolved::Relationships(_) => "relationship list",
            Resolved::Labels(_) => "label list",
            Resolved::Unit => "empty result",
        }
    }
}

impl Shape {
    pub(crate) fn decode(&self, body: Option<&Value>) -> Result<Resolved> {
        match self {
            Shape::Node => Node::from_representation(required(body)?).map(Resolved::Node),
            Shape::EchoNode(node) => Ok(Resolved::Node(node.clone())),
            Shape::Relationship => {
                Relationship::from_representation(required(body)?).map(Resolved::Relationship)
            }
            Shape::EchoRelationship(rel) => Ok(Resolved::Relationship(rel.clone())),
            Shape::Nodes => list(body)?
                .iter()
                .map(Node::from_representation)
                .collect::<Result<Vec<_>>>()
                .map(Resolved::Nodes),
            Shape::Relationships => list(body)?
                .iter()
                .map(Relationship::from_representation)
                .collect::<Result<Vec<_>>>()
                .map(Resolved::Relationships),
            Shape::Labels => list(body)?
                .iter()
                .map(|label| {
                    label.as_str().map(ToOwned::to_owned).ok_or_else(|| {
                        SeraphError::ProtocolViolation(format!("label is not a string: {label}"))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(Resolved::Labels),
            Shape::Unit => Ok(Resolved::Unit),
        }
    }
}

fn required(body: Option<&Value>) -> Result<&Value> {
    body.ok_or_else(|| SeraphError::ProtocolViolation("expected a response body".to_string()))
}

fn list(body: Option<&Value>) -> Result<&Vec<Value>> {
    match body {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(SeraphError::ProtocolViolation(format!(
            "expected an array, got {other}"
        ))),
        None => Err(SeraphError::ProtocolViolation(
            "expected an array, got no body".to_string(),
        )),
    }
}

/// Assemble the value a placeholder denotes from per-sequence results.
///
/// A single target yields that operation's value; a bulk target yields the
/// ordered list of its nodes.
pub(crate) fn gather(values: &[Resolved], targets: &Targets) -> Result<Resolved> {
    let lookup = |seq: usize| {
        values.get(seq).ok_or_else(|| {
            SeraphError::InvalidReference(format!("no result for operation {seq}"))
        })
    };

    match targets {
        Targets::One(seq) => lookup(*seq).cloned(),
        Targets::Many(seqs) => seqs
            .iter()
            .map(|seq| match lookup(*seq)? {
                Resolved::Node(node) => Ok(node.clone()),
                other => Err(SeraphError::ProtocolViolation(format!(
                    "bulk member {seq} resolved to a {}",
                    other.kind()
                ))),
            })
            .collect::<Result<Vec<_>>>()
            .map(Resolved::Nodes),
    }
}

/// Conversion from a [`Resolved`] value into the type a verb promised.
pub trait FromResolved: Sized {
    fn from_resolved(resolved: Resolved) -> Result<Self>;
}

fn mismatch<T>(expected: &str, got: &Resolved) -> Result<T> {
    Err(SeraphError::ProtocolViolation(format!(
        "expected {expected}, got {}",
        got.kind()
    )))
}

impl FromResolved for Node {
    fn from_resolved(resolved: Resolved) -> Result<Self> {
        match resolved {
            Resolved::Node(node) => Ok(node),
            other => mismatch("node", &other),
        }
    }
}

impl FromResolved for Relationship {
    fn from_resolved(resolved: Resolved) -> Result<Self> {
        match resolved {
            Resolved::Relationship(rel) => Ok(rel),
            other => mismatch("relationship", &other),
        }
    }
}

impl FromResolved for Vec<Node> {
    fn from_resolved(resolved: Resolved) -> Result<Self> {
        match resolved {
            Resolved::Nodes(nodes) => Ok(nodes),
            other => mismatch("node list", &other),
        }
    }
}

impl FromResolved for Vec<Relationship> {
    fn from_resolved(resolved: Resolved) -> Result<Self> {
        match resolved {
            Resolved::Relationships(rels) => Ok(rels),
            other => mismatch("relationship list", &other),
        }
    }
}

impl FromResolved for Vec<String> {
    fn from_resolved(resolved: Resolved) -> Result<Self> {
        match resolved {
            Resolved::Labels(labels) => Ok(labels),
            other => mismatch("label list", &other),
        }
    }
}

impl FromResolved for () {
    fn from_resolved(resolved: Resolved) -> Result<Self> {
        match resolved {
            Resolved::Unit => Ok(()),
            other => mismatch("empty result", &other),
        }
    }
}

impl FromResolved for Resolved {
    fn from_resolved(resolved: Resolved) -> Result<Self> {
        Ok(resolved)
    }
}
