mod document_store;
mod embedding;
mod index;

pub use document_store::{DocumentScan, DocumentStore};
pub use embedding::Embedder;
pub use index::{CreateOutcome, IndexLifecycle};
