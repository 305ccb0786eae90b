use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::{errors::DomainError, DocumentId, NewDocument, StoredDocument};

/// Lazy, finite pass over every stored document. Call `scan` again to restart.
pub type DocumentScan<'a> = BoxStream<'a, Result<StoredDocument, DomainError>>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Vector length every stored document must have.
    fn dimension(&self) -> usize;
    async fn insert(&self, document: NewDocument) -> Result<DocumentId, DomainError>;
    async fn get(&self, id: &DocumentId) -> Result<String, DomainError>;
    async fn scan(&self) -> Result<DocumentScan<'_>, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
}
