mod document;
mod embedding;

pub use document::{DocumentId, NewDocument, SearchResult, StoredDocument};
pub use embedding::{cosine_similarity, ranking_score, Embedding, RANKING_SCORE_OFFSET};
