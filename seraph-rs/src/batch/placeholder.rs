//! Reference placeholders handed out by batched calls.
//!
//! A [`Ref`] is an immutable handle. It never turns into a value itself;
//! after commit it is a key into [`super::CommitResults`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use uuid::Uuid;

use crate::errors::{Result, SeraphError};
use crate::nodes::Node;

/// Sequence number(s) a placeholder stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Targets {
    /// Result of a single operation.
    One(usize),
    /// Ordered results of a bulk call, one operation per input element.
    Many(Vec<usize>),
}

impl Targets {
    pub fn as_slice(&self) -> &[usize] {
        match self {
            Targets::One(seq) => std::slice::from_ref(seq),
            Targets::Many(seqs) => seqs,
        }
    }

    /// The single sequence number, or `AmbiguousReference` for a bulk placeholder.
    pub fn single(&self) -> Result<usize> {
        match self {
            Targets::One(seq) => Ok(*seq),
            Targets::Many(seqs) => Err(SeraphError::AmbiguousReference { count: seqs.len() }),
        }
    }
}

/// Identity of a placeholder: owning batch, the call that minted it, and
/// for bulk members the position within that call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Token {
    pub(crate) batch: Uuid,
    pub(crate) call: usize,
    pub(crate) member: Option<usize>,
}

/// Placeholder for the future result of a batched call, resolving to `T`.
///
/// Equality and hashing are by identity: two placeholders are equal only if
/// one is a clone of the other.
pub struct Ref<T> {
    token: Token,
    targets: Targets,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Ref<T> {
    pub(crate) fn new(token: Token, targets: Targets) -> Self {
        Self {
            token,
            targets,
            _marker: PhantomData,
        }
    }

    pub(crate) fn token(&self) -> Token {
        self.token
    }

    /// Identifier of the batch that issued this placeholder.
    pub fn batch_id(&self) -> Uuid {
        self.token.batch
    }

    pub fn targets(&self) -> &Targets {
        &self.targets
    }

    /// Type-erased form used as a verb argument.
    pub(crate) fn pending(&self) -> Pending {
        Pending {
            batch: self.token.batch,
            targets: self.targets.clone(),
        }
    }
}

impl Ref<Vec<Node>> {
    /// Placeholder for the `index`-th node of a bulk save.
    pub fn member(&self, index: usize) -> Option<Ref<Node>> {
        let seq = *self.targets.as_slice().get(index)?;
        Some(Ref::new(
            Token {
                member: Some(index),
                ..self.token
            },
            Targets::One(seq),
        ))
    }

    pub fn len(&self) -> usize {
        self.targets.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self::new(self.token, self.targets.clone())
    }
}

impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl<T> Eq for Ref<T> {}

impl<T> Hash for Ref<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token.hash(state);
    }
}

impl<T> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("batch", &self.token.batch)
            .field("call", &self.token.call)
            .field("targets", &self.targets)
            .finish()
    }
}

/// A placeholder stripped of its result type, as carried by verb arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending {
    pub(crate) batch: Uuid,
    pub(crate) targets: Targets,
}
