//! Commit/demultiplex engine.
//!
//! Validates the ordered result array of a batch submission and decodes it
//! into per-sequence values plus the placeholder table.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::{Result, SeraphError};
use crate::transport::RawResponse;

use super::outcome::{gather, FromResolved, Resolved, Shape};
use super::placeholder::{Ref, Targets, Token};

/// One element of the service's batch response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchEntry {
    /// Echo of the operation's sequence number.
    #[serde(default)]
    pub id: Option<usize>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub body: Option<Value>,
    /// Per-operation status, when the service reports one.
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub from: Option<String>,
}

/// Outcome of a successful commit.
///
/// Built once and immutable afterwards. Placeholders from the committed batch
/// resolve against it through [`CommitResults::get`].
#[derive(Debug, Clone)]
pub struct CommitResults {
    batch: Uuid,
    entries: Vec<BatchEntry>,
    values: Vec<Resolved>,
    by_ref: HashMap<Token, Resolved>,
}

impl CommitResults {
    pub fn batch_id(&self) -> Uuid {
        self.batch
    }

    /// Raw response entries, in submission order.
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    /// Decoded value of the operation at `sequence`.
    pub fn value(&self, sequence: usize) -> Option<&Resolved> {
        self.values.get(sequence)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value a placeholder of this batch denotes.
    pub fn get<T: FromResolved>(&self, reference: &Ref<T>) -> Result<T> {
        self.resolve(reference.token(), reference.targets())
            .and_then(T::from_resolved)
    }

    pub(crate) fn resolve(&self, token: Token, targets: &Targets) -> Result<Resolved> {
        if token.batch != self.batch {
            return Err(SeraphError::InvalidReference(format!(
                "placeholder belongs to batch {}, results are for {}",
                token.batch, self.batch
            )));
        }
        match self.by_ref.get(&token) {
            Some(value) => Ok(value.clone()),
            None if token.member.is_some() => gather(&self.values, targets),
            None => Err(SeraphError::InvalidReference(format!(
                "placeholder {} was not issued by this batch",
                token.call
            ))),
        }
    }
}

/// Split a batch response into per-operation results.
///
/// All-or-nothing: any count/order mismatch, failed entry or undecodable
/// body fails the whole batch and nothing is resolved.
pub(crate) fn demultiplex(
    batch: Uuid,
    shapes: &[Shape],
    references: &[Targets],
    response: RawResponse,
) -> Result<CommitResults> {
    let body = response.body.ok_or_else(|| {
        SeraphError::ProtocolViolation("batch response has no body".to_string())
    })?;

    let entries: Vec<BatchEntry> = serde_json::from_value(body).map_err(|e| {
        SeraphError::ProtocolViolation(format!("batch response is not a result array: {e}"))
    })?;

    if entries.len() != shapes.len() {
        return Err(SeraphError::ProtocolViolation(format!(
            "submitted {} operations, received {} results",
            shapes.len(),
            entries.len()
        )));
    }

    for (sequence, entry) in entries.iter().enumerate() {
        if let Some(id) = entry.id {
            if id != sequence {
                return Err(SeraphError::ProtocolViolation(format!(
                    "result at position {sequence} belongs to operation {id}"
                )));
            }
        }
        if let Some(status) = entry.status {
            if !(200..300).contains(&status) {
                return Err(SeraphError::service(status, entry.body.as_ref()));
            }
        }
    }

    let values = entries
        .iter()
        .zip(shapes)
        .map(|(entry, shape)| shape.decode(entry.body.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let by_ref = references
        .iter()
        .enumerate()
        .map(|(call, targets)| {
            let token = Token {
                batch,
                call,
                member: None,
            };
            gather(&values, targets).map(|value| (token, value))
        })
        .collect::<Result<HashMap<_, _>>>()?;

    Ok(CommitResults {
        batch,
        entries,
        values,
        by_ref,
    })
}
