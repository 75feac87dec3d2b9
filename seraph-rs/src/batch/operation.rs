//! Operation descriptor: one entry of a batch.

use serde::Serialize;
use serde_json::Value;

use crate::transport::{Method, Request};

/// One operation of a batch, in the service's wire shape:
/// `{"method": "POST", "to": "/node", "body": {...}, "id": 0}`.
///
/// Immutable once appended; `sequence` is its 0-based position in the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    pub method: Method,
    #[serde(rename = "to")]
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(rename = "id")]
    pub sequence: usize,
}

impl Operation {
    /// The operation as a standalone request (direct execution).
    pub fn to_request(&self) -> Request {
        Request {
            method: self.method,
            path: self.path.clone(),
            body: self.body.clone(),
        }
    }
}

/// Back-reference expression for the result of operation `sequence`.
///
/// The service substitutes it with that operation's location URI.
pub fn back_reference(sequence: usize) -> String {
    format!("{{{sequence}}}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn operation_serializes_to_wire_shape() {
        let op = Operation {
            method: Method::Post,
            path: "{0}/relationships".to_string(),
            body: Some(json!({ "to": "{1}", "type": "knows" })),
            sequence: 2,
        };
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({
                "method": "POST",
                "to": "{0}/relationships",
                "body": { "to": "{1}", "type": "knows" },
                "id": 2
            })
        );
    }

    #[test]
    fn bodiless_operation_omits_body() {
        let op = Operation {
            method: Method::Delete,
            path: "/node/3".to_string(),
            body: None,
            sequence: 0,
        };
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({ "method": "DELETE", "to": "/node/3", "id": 0 })
        );
    }

    #[test]
    fn back_reference_syntax() {
        assert_eq!(back_reference(0), "{0}");
        assert_eq!(back_reference(12), "{12}");
    }
}
