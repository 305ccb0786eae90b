//! Semantic document repository: insert free text, fetch it back by id, and
//! rank stored documents against a query by cosine similarity of their
//! embeddings.
//!
//! - `domain`: documents, embeddings, vector math, errors and ports.
//! - `application`: ingestion, exact similarity search and index lifecycle.
//! - `infrastructure`: in-memory and Qdrant stores, embedders, configuration.
//! - `api`: axum HTTP surface.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
