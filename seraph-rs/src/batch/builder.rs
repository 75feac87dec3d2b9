//! Operation builder: translates verb invocations into operations.
//!
//! Pure: building never touches batch state. A call either yields its
//! complete [`Plan`] or an error, so a malformed call cannot leave half of
//! its operations appended.

use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::edges::Relationship;
use crate::errors::{Result, SeraphError};
use crate::nodes::Node;
use crate::transport::{Method, Request};
use crate::utils::uri::{encode_segment, value_segment};

use super::operation::{back_reference, Operation};
use super::outcome::Shape;
use super::target::{EntityTarget, IndexKind, NodeTarget, RelTarget, Target};

/// One operation before it is given a sequence number.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Step {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) body: Option<Value>,
    pub(crate) shape: Shape,
}

impl Step {
    fn new(method: Method, path: String, body: Option<Value>, shape: Shape) -> Self {
        Self {
            method,
            path,
            body,
            shape,
        }
    }

    pub(crate) fn into_operation(self, sequence: usize) -> (Operation, Shape) {
        let operation = Operation {
            method: self.method,
            path: self.path,
            body: self.body,
            sequence,
        };
        (operation, self.shape)
    }

    pub(crate) fn request(&self) -> Request {
        Request {
            method: self.method,
            path: self.path.clone(),
            body: self.body.clone(),
        }
    }
}

/// Whether a call yields one result or an ordered group of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Multiplicity {
    Single,
    Bulk,
}

/// Everything one verb call contributes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Plan {
    pub(crate) steps: Vec<Step>,
    pub(crate) multiplicity: Multiplicity,
}

impl Plan {
    fn single(step: Step) -> Self {
        Self {
            steps: vec![step],
            multiplicity: Multiplicity::Single,
        }
    }
}

/// Where an entity reference points once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Located {
    Id(u64),
    Back(usize),
}

/// Builds [`Plan`]s against a resolution scope.
///
/// A direct scope accepts no placeholders at all. A batch scope accepts
/// placeholders of its own batch whose targets are already appended.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OperationBuilder<'a> {
    base_url: &'a str,
    batch: Option<Uuid>,
    appended: usize,
}

impl<'a> OperationBuilder<'a> {
    pub(crate) fn direct(base_url: &'a str) -> Self {
        Self {
            base_url,
            batch: None,
            appended: 0,
        }
    }

    pub(crate) fn batched(base_url: &'a str, batch: Uuid, appended: usize) -> Self {
        Self {
            base_url,
            batch: Some(batch),
            appended,
        }
    }

    // ── Reference resolution ──────────────────────────────────────────────────

    fn locate(&self, target: &Target) -> Result<Located> {
        match target {
            Target::Id(id) => Ok(Located::Id(*id)),
            Target::Unidentified => Err(SeraphError::InvalidReference(
                "entity has no identifier; save it first".to_string(),
            )),
            Target::Pending(pending) => {
                let batch = self.batch.ok_or_else(|| {
                    SeraphError::InvalidReference(
                        "placeholder used outside of the batch that issued it".to_string(),
                    )
                })?;
                if pending.batch != batch {
                    return Err(SeraphError::InvalidReference(format!(
                        "placeholder belongs to batch {}, not {}",
                        pending.batch, batch
                    )));
                }
                let seq = pending.targets.single()?;
                if seq >= self.appended {
                    return Err(SeraphError::InvalidReference(format!(
                        "operation {seq} has not been appended to this batch"
                    )));
                }
                Ok(Located::Back(seq))
            }
        }
    }

    /// Request path of an entity: `/node/7`, or `{3}` for a back-reference.
    fn entity_path(&self, kind: IndexKind, target: &Target) -> Result<String> {
        Ok(match self.locate(target)? {
            Located::Id(id) => format!("/{}/{id}", kind.as_str()),
            Located::Back(seq) => back_reference(seq),
        })
    }

    /// Absolute entity URI for use inside a body.
    fn entity_uri(&self, kind: IndexKind, target: &Target) -> Result<String> {
        Ok(match self.locate(target)? {
            Located::Id(id) => format!("{}/{}/{id}", self.base_url, kind.as_str()),
            Located::Back(seq) => back_reference(seq),
        })
    }

    /// Bare identifier, for positions a back-reference cannot fill.
    fn concrete_id(&self, target: &Target, position: &str) -> Result<u64> {
        match self.locate(target)? {
            Located::Id(id) => Ok(id),
            Located::Back(seq) => Err(SeraphError::InvalidReference(format!(
                "{position} requires a concrete identifier, got a placeholder for operation {seq}"
            ))),
        }
    }

    // ── Nodes ─────────────────────────────────────────────────────────────────

    /// Create a node, or replace the properties of one that already has an id.
    pub(crate) fn save(&self, node: &Node) -> Result<Plan> {
        Ok(Plan::single(save_step(node)))
    }

    /// One operation per node, in input order.
    pub(crate) fn save_many(&self, nodes: &[Node]) -> Result<Plan> {
        Ok(Plan {
            steps: nodes.iter().map(save_step).collect(),
            multiplicity: Multiplicity::Bulk,
        })
    }

    pub(crate) fn read(&self, node: &NodeTarget) -> Result<Plan> {
        let path = self.entity_path(IndexKind::Node, &node.0)?;
        Ok(Plan::single(Step::new(Method::Get, path, None, Shape::Node)))
    }

    pub(crate) fn delete(&self, node: &NodeTarget) -> Result<Plan> {
        let path = self.entity_path(IndexKind::Node, &node.0)?;
        Ok(Plan::single(Step::new(Method::Delete, path, None, Shape::Unit)))
    }

    // ── Relationships ─────────────────────────────────────────────────────────

    pub(crate) fn relate(
        &self,
        start: &NodeTarget,
        rel_type: &str,
        end: &NodeTarget,
        properties: Option<&Map<String, Value>>,
    ) -> Result<Plan> {
        if rel_type.is_empty() {
            return Err(SeraphError::Validation(
                "relationship type must not be empty".to_string(),
            ));
        }

        let start_path = self.entity_path(IndexKind::Node, &start.0)?;
        let end_uri = self.entity_uri(IndexKind::Node, &end.0)?;

        let mut body = json!({ "to": end_uri, "type": rel_type });
        if let Some(props) = properties {
            body["data"] = Value::Object(props.clone());
        }

        Ok(Plan::single(Step::new(
            Method::Post,
            format!("{start_path}/relationships"),
            Some(body),
            Shape::Relationship,
        )))
    }

    pub(crate) fn read_relationship(&self, rel: &RelTarget) -> Result<Plan> {
        let path = self.entity_path(IndexKind::Relationship, &rel.0)?;
        Ok(Plan::single(Step::new(Method::Get, path, None, Shape::Relationship)))
    }

    pub(crate) fn update_relationship(&self, rel: &Relationship) -> Result<Plan> {
        let id = rel.id.ok_or_else(|| {
            SeraphError::InvalidReference("relationship has no identifier; create it first".to_string())
        })?;
        Ok(Plan::single(Step::new(
            Method::Put,
            format!("/relationship/{id}/properties"),
            Some(Value::Object(rel.properties.clone())),
            Shape::EchoRelationship(rel.clone()),
        )))
    }

    pub(crate) fn delete_relationship(&self, rel: &RelTarget) -> Result<Plan> {
        let path = self.entity_path(IndexKind::Relationship, &rel.0)?;
        Ok(Plan::single(Step::new(Method::Delete, path, None, Shape::Unit)))
    }

    // ── Legacy indexes ────────────────────────────────────────────────────────

    pub(crate) fn index_add(
        &self,
        entity: &EntityTarget,
        index: &str,
        key: &str,
        value: &Value,
    ) -> Result<Plan> {
        validate_index_args(index, Some(key))?;
        let uri = self.entity_uri(entity.kind, &entity.target)?;
        Ok(Plan::single(Step::new(
            Method::Post,
            format!("/index/{}/{}", entity.kind.as_str(), encode_segment(index)),
            Some(json!({ "uri": uri, "key": key, "value": value })),
            Shape::Unit,
        )))
    }

    pub(crate) fn index_read(
        &self,
        kind: IndexKind,
        index: &str,
        key: &str,
        value: &Value,
    ) -> Result<Plan> {
        validate_index_args(index, Some(key))?;
        let shape = match kind {
            IndexKind::Node => Shape::Nodes,
            IndexKind::Relationship => Shape::Relationships,
        };
        Ok(Plan::single(Step::new(
            Method::Get,
            format!(
                "/index/{}/{}/{}/{}",
                kind.as_str(),
                encode_segment(index),
                encode_segment(key),
                value_segment(value)
            ),
            None,
            shape,
        )))
    }

    /// Remove an entity from an index, optionally only under `key`/`value`.
    pub(crate) fn index_remove(
        &self,
        entity: &EntityTarget,
        index: &str,
        entry: Option<(&str, &Value)>,
    ) -> Result<Plan> {
        validate_index_args(index, entry.map(|(key, _)| key))?;
        let id = self.concrete_id(&entity.target, "index removal")?;
        let mut path = format!("/index/{}/{}", entity.kind.as_str(), encode_segment(index));
        if let Some((key, value)) = entry {
            path.push_str(&format!("/{}/{}", encode_segment(key), value_segment(value)));
        }
        path.push_str(&format!("/{id}"));
        Ok(Plan::single(Step::new(Method::Delete, path, None, Shape::Unit)))
    }

    // ── Labels ────────────────────────────────────────────────────────────────

    pub(crate) fn add_labels(&self, node: &NodeTarget, labels: &[&str]) -> Result<Plan> {
        if labels.is_empty() || labels.iter().any(|l| l.is_empty()) {
            return Err(SeraphError::Validation(
                "at least one non-empty label is required".to_string(),
            ));
        }
        let path = self.entity_path(IndexKind::Node, &node.0)?;
        Ok(Plan::single(Step::new(
            Method::Post,
            format!("{path}/labels"),
            Some(Value::Array(labels.iter().map(|l| Value::from(*l)).collect())),
            Shape::Unit,
        )))
    }

    pub(crate) fn remove_label(&self, node: &NodeTarget, label: &str) -> Result<Plan> {
        if label.is_empty() {
            return Err(SeraphError::Validation("label must not be empty".to_string()));
        }
        let path = self.entity_path(IndexKind::Node, &node.0)?;
        Ok(Plan::single(Step::new(
            Method::Delete,
            format!("{path}/labels/{}", encode_segment(label)),
            None,
            Shape::Unit,
        )))
    }

    pub(crate) fn read_labels(&self, node: &NodeTarget) -> Result<Plan> {
        let path = self.entity_path(IndexKind::Node, &node.0)?;
        Ok(Plan::single(Step::new(
            Method::Get,
            format!("{path}/labels"),
            None,
            Shape::Labels,
        )))
    }
}

fn save_step(node: &Node) -> Step {
    let body = Some(Value::Object(node.properties.clone()));
    match node.id {
        Some(id) => Step::new(
            Method::Put,
            format!("/node/{id}/properties"),
            body,
            Shape::EchoNode(node.clone()),
        ),
        None => Step::new(Method::Post, "/node".to_string(), body, Shape::Node),
    }
}

fn validate_index_args(index: &str, key: Option<&str>) -> Result<()> {
    if index.is_empty() {
        return Err(SeraphError::Validation("index name must not be empty".to_string()));
    }
    if key == Some("") {
        return Err(SeraphError::Validation("index key must not be empty".to_string()));
    }
    Ok(())
}
