use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::{
    ports::{DocumentStore, Embedder},
    DocumentId, DomainError, Embedding, NewDocument,
};

/// Ingestion and retrieval: embeds text on the way in, returns text on the way out.
pub struct DocumentService {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DocumentStore>,
}

impl DocumentService {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn DocumentStore>) -> Self {
        Self { embedder, store }
    }

    /// Zero vectors cannot be scored against anything.
    fn ensure_rankable(embedding: &Embedding) -> Result<(), DomainError> {
        if embedding.norm() == 0.0 {
            return Err(DomainError::DegenerateVector);
        }
        Ok(())
    }

    #[instrument(skip(self, text), fields(len = text.len()))]
    pub async fn add(&self, text: &str) -> Result<DocumentId, DomainError> {
        if text.is_empty() {
            return Err(DomainError::invalid_input("document text must not be empty"));
        }

        let embedding = self.embedder.embed(text).await?;
        Self::ensure_rankable(&embedding)?;
        let id = self.store.insert(NewDocument::new(text, embedding)?).await?;

        info!(id = %id, "document added");
        Ok(id)
    }

    /// Embeds all texts in one batch, then inserts them in order.
    ///
    /// Not transactional: documents inserted before a failure stay stored.
    #[instrument(skip(self, texts), fields(count = texts.len()))]
    pub async fn add_many(&self, texts: &[&str]) -> Result<Vec<DocumentId>, DomainError> {
        if texts.iter().any(|t| t.is_empty()) {
            return Err(DomainError::invalid_input("document text must not be empty"));
        }
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self.embedder.embed_batch(texts).await?;
        if embeddings.len() != texts.len() {
            return Err(DomainError::external(format!(
                "embedder returned {} vectors for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }

        for embedding in &embeddings {
            Self::ensure_rankable(embedding)?;
        }

        let mut ids = Vec::with_capacity(texts.len());
        for (text, embedding) in texts.iter().zip(embeddings) {
            ids.push(self.store.insert(NewDocument::new(*text, embedding)?).await?);
        }

        info!(count = ids.len(), "documents added");
        Ok(ids)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &DocumentId) -> Result<String, DomainError> {
        self.store.get(id).await
    }

    /// Looks up a document by its string form; unparseable ids are `NotFound`.
    pub async fn get_by_str(&self, id: &str) -> Result<String, DomainError> {
        let id: DocumentId = id.parse()?;
        self.get(&id).await
    }

    pub async fn count(&self) -> Result<usize, DomainError> {
        self.store.count().await
    }
}
