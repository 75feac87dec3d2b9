//! Relationship: directed, typed edge between two nodes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, SeraphError};
use crate::utils::{entity_id, trailing_id};

/// A relationship between two nodes.
///
/// Serializes as `{"start": 1, "end": 2, "type": "knows", "id": 1}`; the
/// property map is omitted when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Identifier of the start node.
    pub start: u64,
    /// Identifier of the end node.
    pub end: u64,
    /// Relationship type (e.g. "knows").
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl Relationship {
    /// Decode a REST relationship representation.
    ///
    /// `start` and `end` may be node URIs (server form) or bare identifiers.
    pub fn from_representation(repr: &Value) -> Result<Self> {
        let object = repr.as_object().ok_or_else(|| {
            SeraphError::ProtocolViolation(format!(
                "relationship representation is not an object: {repr}"
            ))
        })?;

        let id = entity_id(repr).ok_or_else(|| {
            SeraphError::ProtocolViolation(
                "relationship representation carries no identifier".to_string(),
            )
        })?;

        let start = endpoint_id(object.get("start"), "start")?;
        let end = endpoint_id(object.get("end"), "end")?;

        let rel_type = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                SeraphError::ProtocolViolation("relationship representation has no type".to_string())
            })?
            .to_string();

        let properties = match object.get("data").or_else(|| object.get("properties")) {
            Some(Value::Object(data)) => data.clone(),
            _ => Map::new(),
        };

        Ok(Self {
            id: Some(id),
            start,
            end,
            rel_type,
            properties,
        })
    }
}

fn endpoint_id(value: Option<&Value>, field: &str) -> Result<u64> {
    match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(uri)) => trailing_id(uri),
        _ => None,
    }
    .ok_or_else(|| {
        SeraphError::ProtocolViolation(format!("relationship {field} is not a node reference"))
    })
}
