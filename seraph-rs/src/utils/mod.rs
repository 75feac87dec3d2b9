//! Shared utilities.
//!
//! Includes:
//! - URI helpers (identifier extraction from entity URIs, path segment encoding)

pub mod uri;

pub use uri::{encode_segment, entity_id, trailing_id};
