//! Relationship type for the graph.
//!
//! - [`Relationship`]: typed, directed edge between two nodes

pub mod relationship;

pub use relationship::Relationship;
