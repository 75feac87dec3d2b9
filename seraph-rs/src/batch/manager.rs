//! Batch transaction manager.
//!
//! Accumulates operations synchronously and submits them in one round trip.
//! Exposes the verb surface of [`Client`] minus `batch()`: a batch cannot
//! start another batch.

use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::client::Client;
use crate::edges::Relationship;
use crate::errors::{Result, SeraphError};
use crate::nodes::Node;
use crate::transport::{Method, Request, Transport};

use super::builder::{Multiplicity, OperationBuilder, Plan};
use super::commit::{demultiplex, CommitResults};
use super::operation::Operation;
use super::outcome::{FromResolved, Resolved, Shape};
use super::placeholder::{Ref, Targets, Token};
use super::target::{EntityTarget, IndexKind, NodeTarget, RelTarget};

type Deliver = Box<dyn FnOnce(Result<Resolved>) + Send + 'static>;

/// A callback waiting for the commit, with the operations it covers.
struct PendingCallback {
    token: Token,
    targets: Targets,
    deliver: Deliver,
}

/// An open batch of operations against one client.
///
/// Every verb returns a [`Ref`] immediately. Callbacks registered through
/// [`Batch::on_result`] fire after [`Batch::commit`], in registration order.
pub struct Batch<T: Transport> {
    client: Client<T>,
    id: Uuid,
    operations: Vec<Operation>,
    shapes: Vec<Shape>,
    /// Targets of each placeholder, indexed by the call that minted it.
    references: Vec<Targets>,
    callbacks: Vec<PendingCallback>,
    committed: bool,
}

impl<T: Transport> Batch<T> {
    pub(crate) fn new(client: Client<T>) -> Self {
        Self {
            client,
            id: Uuid::new_v4(),
            operations: Vec::new(),
            shapes: Vec::new(),
            references: Vec::new(),
            callbacks: Vec::new(),
            committed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Operations appended so far, in sequence order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.committed {
            Err(SeraphError::BatchAlreadyCommitted)
        } else {
            Ok(())
        }
    }

    fn builder(&self) -> Result<OperationBuilder<'_>> {
        self.ensure_open()?;
        Ok(OperationBuilder::batched(
            self.client.base_url(),
            self.id,
            self.operations.len(),
        ))
    }

    /// Append a built plan and mint its placeholder. Infallible: all
    /// validation happened while building.
    pub(crate) fn append<R>(&mut self, plan: Plan) -> Ref<R> {
        let mut sequences = Vec::with_capacity(plan.steps.len());
        for step in plan.steps {
            let sequence = self.operations.len();
            let (operation, shape) = step.into_operation(sequence);
            debug!(
                batch = %self.id,
                sequence,
                method = %operation.method,
                path = %operation.path,
                "operation appended"
            );
            self.operations.push(operation);
            self.shapes.push(shape);
            sequences.push(sequence);
        }

        let targets = match plan.multiplicity {
            Multiplicity::Single => Targets::One(sequences[0]),
            Multiplicity::Bulk => Targets::Many(sequences),
        };

        let call = self.references.len();
        self.references.push(targets.clone());

        Ref::new(
            Token {
                batch: self.id,
                call,
                member: None,
            },
            targets,
        )
    }

    /// Register `callback` to receive the result of `reference` after commit.
    ///
    /// Callbacks fire in registration order, each exactly once, with either
    /// the value or the commit failure.
    pub fn on_result<R, F>(&mut self, reference: &Ref<R>, callback: F) -> Result<()>
    where
        R: FromResolved,
        F: FnOnce(Result<R>) + Send + 'static,
    {
        self.ensure_open()?;
        if reference.batch_id() != self.id {
            return Err(SeraphError::InvalidReference(format!(
                "placeholder belongs to batch {}, not {}",
                reference.batch_id(),
                self.id
            )));
        }

        self.callbacks.push(PendingCallback {
            token: reference.token(),
            targets: reference.targets().clone(),
            deliver: Box::new(move |outcome| callback(outcome.and_then(R::from_resolved))),
        });
        Ok(())
    }

    // ── Nodes ─────────────────────────────────────────────────────────────────

    pub fn save(&mut self, node: &Node) -> Result<Ref<Node>> {
        let plan = self.builder()?.save(node)?;
        Ok(self.append(plan))
    }

    /// Save several nodes; the placeholder resolves to them in input order.
    pub fn save_many(&mut self, nodes: &[Node]) -> Result<Ref<Vec<Node>>> {
        let plan = self.builder()?.save_many(nodes)?;
        Ok(self.append(plan))
    }

    pub fn read(&mut self, node: impl Into<NodeTarget>) -> Result<Ref<Node>> {
        let plan = self.builder()?.read(&node.into())?;
        Ok(self.append(plan))
    }

    pub fn delete(&mut self, node: impl Into<NodeTarget>) -> Result<Ref<()>> {
        let plan = self.builder()?.delete(&node.into())?;
        Ok(self.append(plan))
    }

    // ── Relationships ─────────────────────────────────────────────────────────

    pub fn relate(
        &mut self,
        start: impl Into<NodeTarget>,
        rel_type: &str,
        end: impl Into<NodeTarget>,
        properties: Option<&Map<String, Value>>,
    ) -> Result<Ref<Relationship>> {
        let plan = self
            .builder()?
            .relate(&start.into(), rel_type, &end.into(), properties)?;
        Ok(self.append(plan))
    }

    pub fn read_relationship(&mut self, rel: impl Into<RelTarget>) -> Result<Ref<Relationship>> {
        let plan = self.builder()?.read_relationship(&rel.into())?;
        Ok(self.append(plan))
    }

    pub fn update_relationship(&mut self, rel: &Relationship) -> Result<Ref<Relationship>> {
        let plan = self.builder()?.update_relationship(rel)?;
        Ok(self.append(plan))
    }

    pub fn delete_relationship(&mut self, rel: impl Into<RelTarget>) -> Result<Ref<()>> {
        let plan = self.builder()?.delete_relationship(&rel.into())?;
        Ok(self.append(plan))
    }

    // ── Legacy indexes ────────────────────────────────────────────────────────

    pub fn index_add(
        &mut self,
        entity: impl Into<EntityTarget>,
        index: &str,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<Ref<()>> {
        let plan = self
            .builder()?
            .index_add(&entity.into(), index, key, &value.into())?;
        Ok(self.append(plan))
    }

    pub fn read_node_index(
        &mut self,
        index: &str,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<Ref<Vec<Node>>> {
        let plan = self
            .builder()?
            .index_read(IndexKind::Node, index, key, &value.into())?;
        Ok(self.append(plan))
    }

    pub fn read_relationship_index(
        &mut self,
        index: &str,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<Ref<Vec<Relationship>>> {
        let plan = self
            .builder()?
            .index_read(IndexKind::Relationship, index, key, &value.into())?;
        Ok(self.append(plan))
    }

    pub fn index_remove(
        &mut self,
        entity: impl Into<EntityTarget>,
        index: &str,
        entry: Option<(&str, Value)>,
    ) -> Result<Ref<()>> {
        let plan = self.builder()?.index_remove(
            &entity.into(),
            index,
            entry.as_ref().map(|(key, value)| (*key, value)),
        )?;
        Ok(self.append(plan))
    }

    // ── Labels ────────────────────────────────────────────────────────────────

    pub fn add_labels(&mut self, node: impl Into<NodeTarget>, labels: &[&str]) -> Result<Ref<()>> {
        let plan = self.builder()?.add_labels(&node.into(), labels)?;
        Ok(self.append(plan))
    }

    pub fn remove_label(&mut self, node: impl Into<NodeTarget>, label: &str) -> Result<Ref<()>> {
        let plan = self.builder()?.remove_label(&node.into(), label)?;
        Ok(self.append(plan))
    }

    pub fn read_labels(&mut self, node: impl Into<NodeTarget>) -> Result<Ref<Vec<String>>> {
        let plan = self.builder()?.read_labels(&node.into())?;
        Ok(self.append(plan))
    }

    // ── Commit ────────────────────────────────────────────────────────────────

    /// Submit every operation in one request and deliver the results.
    ///
    /// The batch is terminal from the moment this is called, whatever the
    /// outcome. On failure every pending callback receives the same error
    /// and nothing resolves.
    pub async fn commit(&mut self) -> Result<CommitResults> {
        self.ensure_open()?;
        self.committed = true;

        let callbacks = std::mem::take(&mut self.callbacks);
        debug!(
            batch = %self.id,
            operations = self.operations.len(),
            callbacks = callbacks.len(),
            "committing batch"
        );

        let outcome = self.submit().await;

        match &outcome {
            Ok(results) => {
                info!(batch = %self.id, operations = results.len(), "batch committed");
                for pending in callbacks {
                    (pending.deliver)(results.resolve(pending.token, &pending.targets));
                }
            }
            Err(err) => {
                warn!(batch = %self.id, error = %err, "batch failed");
                for pending in callbacks {
                    (pending.deliver)(Err(err.clone()));
                }
            }
        }

        outcome
    }

    /// [`Batch::commit`], then hand the outcome to `callback` after every
    /// per-operation callback has fired.
    pub async fn commit_with<F>(&mut self, callback: F) -> Result<CommitResults>
    where
        F: FnOnce(&Result<CommitResults>),
    {
        let outcome = self.commit().await;
        callback(&outcome);
        outcome
    }

    async fn submit(&self) -> Result<CommitResults> {
        let request = Request {
            method: Method::Post,
            path: "/batch".to_string(),
            body: Some(serde_json::to_value(&self.operations)?),
        };

        let response = self
            .client
            .transport()
            .execute(&request)
            .await?
            .into_success()?;

        demultiplex(self.id, &self.shapes, &self.references, response)
    }
}
