//! The marketer-supplied fact list.

use serde::Serialize;

use crate::error::{AgentError, Result};

/// An ordered, non-empty list of facts the assistant may answer from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KnowledgeBase {
    facts: Vec<String>,
}

impl KnowledgeBase {
    /// Validate a supplied fact list.
    ///
    /// `None` (not configured) and an empty list are both rejected with
    /// [`AgentError::MissingKnowledge`].
    pub fn new(facts: Option<Vec<String>>) -> Result<Self> {
        match facts {
            Some(facts) if !facts.is_empty() => Ok(Self { facts }),
            _ => Err(AgentError::MissingKnowledge),
        }
    }

    /// The facts, in the order they were supplied.
    pub fn facts(&self) -> &[String] {
        &self.facts
    }

    /// Number of facts.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl TryFrom<Vec<String>> for KnowledgeBase {
    type Error = AgentError;

    fn try_from(facts: Vec<String>) -> Result<Self> {
        Self::new(Some(facts))
    }
}
