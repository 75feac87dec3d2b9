#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use seraph_rs::{Client, RawResponse, Request, Result, SeraphError, Transport};

pub const BASE: &str = "http://localhost:7474/db/data";

/// In-memory transport answering from a queue of scripted responses and
/// recording every request it receives.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse>>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: Option<Value>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(RawResponse::new(status, body)));
        self
    }

    pub fn fail(self, err: SeraphError) -> Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    /// A `200` batch response whose entries carry the given bodies, ids 0..n.
    pub fn batch_ok(self, bodies: Vec<Value>) -> Self {
        let entries: Vec<Value> = bodies
            .into_iter()
            .enumerate()
            .map(|(id, body)| json!({ "id": id, "body": body, "status": 200 }))
            .collect();
        self.respond(200, Some(Value::Array(entries)))
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn execute(&self, request: &Request) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SeraphError::Transport("no scripted response left".to_string())))
    }
}

pub fn client(transport: ScriptedTransport) -> Client<ScriptedTransport> {
    Client::new(transport, BASE)
}

/// Collects callback deliveries in firing order.
#[derive(Clone, Default)]
pub struct Recorder<T> {
    seen: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn sink<F, A>(&self, map: F) -> impl FnOnce(A) + Send + 'static
    where
        F: FnOnce(A) -> T + Send + 'static,
        A: 'static,
    {
        let seen = Arc::clone(&self.seen);
        move |arg| seen.lock().unwrap().push(map(arg))
    }

    pub fn push(&self, value: T) {
        self.seen.lock().unwrap().push(value);
    }

    pub fn seen(&self) -> Vec<T> {
        self.seen.lock().unwrap().clone()
    }
}

/// Server-form node representation.
pub fn node_repr(id: u64, data: Value) -> Value {
    json!({
        "self": format!("{BASE}/node/{id}"),
        "data": data,
        "metadata": { "id": id, "labels": [] }
    })
}

/// Server-form relationship representation.
pub fn rel_repr(id: u64, start: u64, end: u64, rel_type: &str) -> Value {
    json!({
        "self": format!("{BASE}/relationship/{id}"),
        "start": format!("{BASE}/node/{start}"),
        "end": format!("{BASE}/node/{end}"),
        "type": rel_type,
        "data": {},
        "metadata": { "id": id, "type": rel_type }
    })
}
