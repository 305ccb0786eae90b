use async_trait::async_trait;
use rig::client::EmbeddingsClient;
use rig::embeddings::EmbeddingsBuilder;
use rig::providers::openai;

use crate::domain::{ports::Embedder, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Remote embedder backed by an OpenAI embedding model.
pub struct TextEmbedding {
    client: openai::Client,
    model: String,
    dimension: usize,
}

impl TextEmbedding {
    /// Builds the client from `OPENAI_API_KEY`.
    pub fn new(model: impl Into<String>, dimension: usize) -> Result<Self, DomainError> {
        Self::with_api_key(model, dimension, std::env::var(API_KEY_VAR).ok())
    }

    pub fn with_api_key(
        model: impl Into<String>,
        dimension: usize,
        api_key: Option<String>,
    ) -> Result<Self, DomainError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| DomainError::external(format!("{API_KEY_VAR} is not set")))?;
        let client = openai::Client::new(api_key.as_str())
            .map_err(|e| DomainError::external(format!("OpenAI client: {e}")))?;

        Ok(Self {
            client,
            model: model.into(),
            dimension,
        })
    }

    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, DomainError> {
        Self::new(config.model.clone(), config.dimension)
    }

    fn to_embedding(&self, vec: Vec<f64>) -> Result<Embedding, DomainError> {
        let embedding = Embedding::new(vec.into_iter().map(|x| x as f32).collect());
        embedding.ensure_dimension(self.dimension)?;
        Ok(embedding)
    }
}

#[async_trait]
impl Embedder for TextEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        let model = self
            .client
            .embedding_model_with_ndims(&self.model, self.dimension);

        let embeddings = EmbeddingsBuilder::new(model)
            .document(text)
            .map_err(|e| DomainError::external(e.to_string()))?
            .build()
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        let (_doc, emb) = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::external("No embedding returned"))?;

        self.to_embedding(emb.first().vec)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self
            .client
            .embedding_model_with_ndims(&self.model, self.dimension);

        let mut builder = EmbeddingsBuilder::new(model);
        for text in texts {
            builder = builder
                .document(*text)
                .map_err(|e| DomainError::external(e.to_string()))?;
        }

        let embeddings = builder
            .build()
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        if embeddings.len() != texts.len() {
            return Err(DomainError::external(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        embeddings
            .into_iter()
            .map(|(_doc, emb)| self.to_embedding(emb.first().vec))
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
