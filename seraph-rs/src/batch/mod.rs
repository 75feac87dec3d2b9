//! Batched operations.
//!
//! A [`Batch`] records verb calls as [`Operation`]s, hands back [`Ref`]
//! placeholders, and commits everything in a single request. Later calls may
//! use earlier placeholders; they are rewritten into `{N}` back-references
//! that the service resolves at execution time.
//!
//! Results can be consumed two ways from the same batch:
//! - per call, through callbacks registered with [`Batch::on_result`]
//! - in bulk, by looking placeholders up in the returned [`CommitResults`]

mod builder;
pub mod commit;
pub mod manager;
pub mod operation;
pub mod outcome;
pub mod placeholder;
pub mod target;

pub(crate) use builder::{Multiplicity, OperationBuilder, Plan};
pub use commit::{BatchEntry, CommitResults};
pub use manager::Batch;
pub use operation::{back_reference, Operation};
pub use outcome::{FromResolved, Resolved};
pub use placeholder::{Pending, Ref, Targets};
pub use target::{EntityTarget, IndexKind, NodeTarget, RelTarget, Target};
