//! # seraph-rs
//!
//! Client for a graph database REST service, built around batched operations.
//!
//! ## Architecture
//!
//! - **Direct calls**: [`Client`] executes each verb immediately
//! - **Batches**: [`Batch`] accumulates verbs synchronously, returns [`Ref`]
//!   placeholders, and commits everything as one atomic request
//! - **Back-references**: placeholders passed to later verbs of the same batch
//!   become `{N}` references resolved by the service
//! - **Transport**: all I/O goes through the [`Transport`] trait; [`HttpTransport`]
//!   is the `reqwest` implementation
//!
//! ```no_run
//! # async fn demo() -> seraph_rs::Result<()> {
//! use seraph_rs::{Client, ClientConfig, Node};
//!
//! let client = Client::from_config(&ClientConfig::from_env()?)?;
//! let mut txn = client.batch();
//! let alice = txn.save(&Node::new().with("name", "Alice"))?;
//! let bob = txn.save(&Node::new().with("name", "Bob"))?;
//! let knows = txn.relate(&alice, "knows", &bob, None)?;
//! txn.on_result(&knows, |rel| println!("related: {rel:?}"))?;
//!
//! let results = txn.commit().await?;
//! let alice = results.get(&alice)?;
//! # let _ = alice;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod client;
pub mod edges;
pub mod errors;
pub mod nodes;
pub mod transport;
pub mod types;
pub mod utils;

pub use batch::{Batch, CommitResults, EntityTarget, IndexKind, NodeTarget, Ref, RelTarget};
pub use client::Client;
pub use edges::Relationship;
pub use errors::{Result, SeraphError, StatusClass};
pub use nodes::Node;
pub use transport::{HttpTransport, Method, RawResponse, Request, Transport};
pub use types::ClientConfig;
