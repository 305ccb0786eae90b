use crate::domain::{errors::DomainError, Embedding};
use async_trait::async_trait;

/// Maps text to a fixed-length vector. Identical input must yield identical output.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;
    /// One vector per input, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError>;
    fn dimension(&self) -> usize;
}
