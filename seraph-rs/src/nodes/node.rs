//! Node: a property map that gains its identifier once saved.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, SeraphError};
use crate::utils::entity_id;

/// A graph node.
///
/// Serializes flat: `{"id": 1, "name": "A"}`. `id` is `None` until the node
/// has been created on the server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_properties(properties: Map<String, Value>) -> Self {
        Self {
            id: None,
            properties,
        }
    }

    /// Builder-style property setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Decode a REST node representation.
    ///
    /// Accepts the server form (a string `self` URI or a `metadata` object,
    /// properties under `data`) as well as an already-shaped flat object
    /// carrying a numeric `id`.
    pub fn from_representation(repr: &Value) -> Result<Self> {
        let object = repr.as_object().ok_or_else(|| {
            SeraphError::ProtocolViolation(format!("node representation is not an object: {repr}"))
        })?;

        let server_form = object.get("self").is_some_and(Value::is_string)
            || object.get("metadata").is_some_and(Value::is_object);

        let id = if server_form {
            entity_id(repr)
        } else {
            object.get("id").and_then(Value::as_u64)
        }
        .ok_or_else(|| {
            SeraphError::ProtocolViolation("node representation carries no identifier".to_string())
        })?;

        let properties = if server_form {
            match object.get("data") {
                Some(Value::Object(data)) => data.clone(),
                None | Some(Value::Null) => Map::new(),
                Some(other) => {
                    return Err(SeraphError::ProtocolViolation(format!(
                        "node data is not an object: {other}"
                    )))
                }
            }
        } else {
            let mut flat = object.clone();
            flat.remove("id");
            flat
        };

        Ok(Self {
            id: Some(id),
            properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_serializes_flat() {
        let node = Node {
            id: Some(1),
            ..Node::new().with("name", "A")
        };
        assert_eq!(serde_json::to_value(&node).unwrap(), json!({ "id": 1, "name": "A" }));

        let unsaved = Node::new().with("name", "B");
        assert_eq!(serde_json::to_value(&unsaved).unwrap(), json!({ "name": "B" }));
    }

    #[test]
    fn test_node_deserializes_flat() {
        let node: Node = serde_json::from_value(json!({ "id": 4, "age": 30 })).unwrap();
        assert_eq!(node.id, Some(4));
        assert_eq!(node.get("age"), Some(&json!(30)));
        assert!(node.get("id").is_none());
    }

    #[test]
    fn test_from_server_representation() {
        let repr = json!({
            "self": "http://localhost:7474/db/data/node/12",
            "data": { "name": "Alice" },
            "labels": "http://localhost:7474/db/data/node/12/labels",
            "metadata": { "id": 12, "labels": [] }
        });
        let node = Node::from_representation(&repr).unwrap();
        assert_eq!(node.id, Some(12));
        assert_eq!(node.properties.len(), 1);
        assert_eq!(node.get("name"), Some(&json!("Alice")));
    }

    #[test]
    fn test_from_flat_representation() {
        let node = Node::from_representation(&json!({ "id": 1, "name": "A" })).unwrap();
        assert_eq!(serde_json::to_value(&node).unwrap(), json!({ "id": 1, "name": "A" }));
    }

    #[test]
    fn test_flat_representation_keeps_data_and_self_properties() {
        let node = Node::from_representation(&json!({ "id": 1, "data": "x" })).unwrap();
        assert_eq!(node.id, Some(1));
        assert_eq!(node.get("data"), Some(&json!("x")));

        let node = Node::from_representation(&json!({ "id": 2, "self": 7 })).unwrap();
        assert_eq!(node.id, Some(2));
        assert_eq!(node.get("self"), Some(&json!(7)));
    }

    #[test]
    fn test_server_form_detected_by_metadata() {
        let node = Node::from_representation(&json!({
            "metadata": { "id": 4, "labels": [] },
            "data": { "name": "D" }
        }))
        .unwrap();
        assert_eq!(node, Node { id: Some(4), ..Node::new().with("name", "D") });
    }

    #[test]
    fn test_representation_without_id_is_protocol_violation() {
        let err = Node::from_representation(&json!({ "data": { "name": "A" } })).unwrap_err();
        assert!(matches!(err, SeraphError::ProtocolViolation(_)));

        let err = Node::from_representation(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, SeraphError::ProtocolViolation(_)));
    }
}
