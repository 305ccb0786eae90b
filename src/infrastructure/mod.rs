pub mod config;
pub mod document_store;
pub mod embedding;

pub use config::{AppConfig, ConfigError, EmbeddingProvider, StoreBackend};
pub use document_store::{InMemoryDocumentStore, QdrantDocumentStore};
pub use embedding::{HashedEmbedding, TextEmbedding};
