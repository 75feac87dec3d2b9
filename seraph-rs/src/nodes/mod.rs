//! Node type for the graph.
//!
//! - [`Node`]: a property map plus the server-assigned identifier

pub mod node;

pub use node::Node;
