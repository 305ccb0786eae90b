use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Embedding;
use crate::domain::errors::{DomainError, Result};

/// Opaque document identifier assigned by the store at insertion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for DocumentId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DocumentId {
    type Err = DomainError;

    /// Strings that cannot name a stored document are reported as `NotFound`.
    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| DomainError::not_found(format!("document {s}")))
    }
}

/// A validated document awaiting insertion. Text and vector are both required.
#[derive(Debug, Clone)]
pub struct NewDocument {
    text: String,
    embedding: Embedding,
}

impl NewDocument {
    pub fn new(text: impl Into<String>, embedding: impl Into<Embedding>) -> Result<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(DomainError::invalid_input("document text must not be empty"));
        }
        Ok(Self {
            text,
            embedding: embedding.into(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn embedding(&self) -> &Embedding {
        &self.embedding
    }

    /// Binds the document to its store-assigned id.
    pub fn into_stored(self, id: DocumentId) -> StoredDocument {
        StoredDocument {
            id,
            text: self.text,
            embedding: self.embedding,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub text: String,
    pub embedding: Embedding,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: DocumentId,
    pub text: String,
    pub score: f32,
}
