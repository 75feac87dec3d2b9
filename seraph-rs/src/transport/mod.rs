//! Transport abstraction.
//!
//! Defines the [`Transport`] trait through which every request leaves the
//! client, plus the reqwest-backed [`http::HttpTransport`]. The core never
//! opens sockets itself.

pub mod http;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Result, SeraphError};

pub use http::HttpTransport;

/// HTTP verb of a request or batched operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether repeating the request cannot change the outcome.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, Method::Post)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request: method, path relative to the endpoint, optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Status, parsed body and `Location` header of a response.
///
/// A non-2xx status is still a `RawResponse`; classification into
/// [`SeraphError::Service`] happens in the client via [`RawResponse::into_success`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawResponse {
    pub status: u16,
    pub body: Option<Value>,
    pub location: Option<String>,
}

impl RawResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self {
            status,
            body,
            location: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Pass 2xx responses through, turn anything else into a service error.
    pub fn into_success(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SeraphError::service(self.status, self.body.as_ref()))
        }
    }
}

/// The single capability the client needs from its surroundings.
///
/// Implementations return `Err` only for transport-level failures
/// (connection refused, timeout, unreadable body).
#[allow(async_fn_in_trait)]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &Request) -> Result<RawResponse>;
}
