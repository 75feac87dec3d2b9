//! Direct (non-batched) client.
//!
//! Each verb builds its operations with the same builder the batch uses,
//! executes them immediately and decodes the result with the same decoder,
//! so a verb returns the same shape on either path.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::batch::{
    Batch, CommitResults, EntityTarget, FromResolved, IndexKind, Multiplicity, NodeTarget,
    OperationBuilder, Plan, Ref, RelTarget, Resolved,
};
use crate::edges::Relationship;
use crate::errors::{Result, SeraphError};
use crate::nodes::Node;
use crate::transport::{HttpTransport, Transport};
use crate::types::ClientConfig;

/// Entry point: executes verbs directly and opens batches.
pub struct Client<T: Transport> {
    transport: Arc<T>,
    base_url: Arc<str>,
}

impl<T: Transport> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            base_url: Arc::clone(&self.base_url),
        }
    }
}

impl Client<HttpTransport> {
    /// Client over HTTP, configured from [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(transport, config.base_url()))
    }
}

impl<T: Transport> Client<T> {
    /// `base_url` is used to build absolute entity URIs in request bodies.
    pub fn new(transport: T, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            transport: Arc::new(transport),
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Open a new batch. The batch itself offers no way to open another.
    pub fn batch(&self) -> Batch<T> {
        Batch::new(self.clone())
    }

    /// Build a batch with `build`, then commit it.
    ///
    /// If `build` fails nothing is sent. Returns whatever `build` returned
    /// (typically placeholders) alongside the commit results.
    pub async fn batch_with<F, R>(&self, build: F) -> Result<(R, CommitResults)>
    where
        F: FnOnce(&mut Batch<T>) -> Result<R>,
    {
        let mut batch = self.batch();
        let built = build(&mut batch)?;
        let results = batch.commit().await?;
        Ok((built, results))
    }

    fn builder(&self) -> OperationBuilder<'_> {
        OperationBuilder::direct(&self.base_url)
    }

    /// Execute a plan and decode it as the batch would.
    ///
    /// A single operation goes out as one request. A bulk plan is submitted
    /// as a one-off batch so that it applies entirely or not at all.
    async fn run(&self, plan: Plan) -> Result<Resolved> {
        match plan.multiplicity {
            Multiplicity::Single => {
                let step = plan.steps.into_iter().next().ok_or_else(|| {
                    SeraphError::ProtocolViolation("operation produced no result".to_string())
                })?;
                let request = step.request();
                debug!(method = %request.method, path = %request.path, "executing");
                let response = self.transport.execute(&request).await?.into_success()?;
                step.shape.decode(response.body.as_ref())
            }
            Multiplicity::Bulk => {
                let mut batch = self.batch();
                let group: Ref<Vec<Node>> = batch.append(plan);
                debug!(batch = %batch.id(), operations = batch.len(), "executing bulk call as batch");
                let results = batch.commit().await?;
                results.get(&group).map(Resolved::Nodes)
            }
        }
    }

    async fn run_as<R: FromResolved>(&self, plan: Result<Plan>) -> Result<R> {
        R::from_resolved(self.run(plan?).await?)
    }

    // ── Nodes ─────────────────────────────────────────────────────────────────

    /// Create `node`, or replace its properties if it already has an id.
    pub async fn save(&self, node: &Node) -> Result<Node> {
        self.run_as(self.builder().save(node)).await
    }

    /// Save several nodes in one atomic round trip; results follow input order.
    pub async fn save_many(&self, nodes: &[Node]) -> Result<Vec<Node>> {
        self.run_as(self.builder().save_many(nodes)).await
    }

    pub async fn read(&self, node: impl Into<NodeTarget>) -> Result<Node> {
        self.run_as(self.builder().read(&node.into())).await
    }

    pub async fn delete(&self, node: impl Into<NodeTarget>) -> Result<()> {
        self.run_as(self.builder().delete(&node.into())).await
    }

    // ── Relationships ─────────────────────────────────────────────────────────

    pub async fn relate(
        &self,
        start: impl Into<NodeTarget>,
        rel_type: &str,
        end: impl Into<NodeTarget>,
        properties: Option<&Map<String, Value>>,
    ) -> Result<Relationship> {
        let plan = self
            .builder()
            .relate(&start.into(), rel_type, &end.into(), properties);
        self.run_as(plan).await
    }

    pub async fn read_relationship(&self, rel: impl Into<RelTarget>) -> Result<Relationship> {
        self.run_as(self.builder().read_relationship(&rel.into())).await
    }

    pub async fn update_relationship(&self, rel: &Relationship) -> Result<Relationship> {
        self.run_as(self.builder().update_relationship(rel)).await
    }

    pub async fn delete_relationship(&self, rel: impl Into<RelTarget>) -> Result<()> {
        self.run_as(self.builder().delete_relationship(&rel.into())).await
    }

    // ── Legacy indexes ────────────────────────────────────────────────────────

    pub async fn index_add(
        &self,
        entity: impl Into<EntityTarget>,
        index: &str,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        let plan = self
            .builder()
            .index_add(&entity.into(), index, key, &value.into());
        self.run_as(plan).await
    }

    pub async fn read_node_index(
        &self,
        index: &str,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<Node>> {
        let plan = self
            .builder()
            .index_read(IndexKind::Node, index, key, &value.into());
        self.run_as(plan).await
    }

    pub async fn read_relationship_index(
        &self,
        index: &str,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<Relationship>> {
        let plan = self
            .builder()
            .index_read(IndexKind::Relationship, index, key, &value.into());
        self.run_as(plan).await
    }

    pub async fn index_remove(
        &self,
        entity: impl Into<EntityTarget>,
        index: &str,
        entry: Option<(&str, Value)>,
    ) -> Result<()> {
        let plan = self.builder().index_remove(
            &entity.into(),
            index,
            entry.as_ref().map(|(key, value)| (*key, value)),
        );
        self.run_as(plan).await
    }

    // ── Labels ────────────────────────────────────────────────────────────────

    pub async fn add_labels(&self, node: impl Into<NodeTarget>, labels: &[&str]) -> Result<()> {
        self.run_as(self.builder().add_labels(&node.into(), labels)).await
    }

    pub async fn remove_label(&self, node: impl Into<NodeTarget>, label: &str) -> Result<()> {
        self.run_as(self.builder().remove_label(&node.into(), label)).await
    }

    pub async fn read_labels(&self, node: impl Into<NodeTarget>) -> Result<Vec<String>> {
        self.run_as(self.builder().read_labels(&node.into())).await
    }
}
