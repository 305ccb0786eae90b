mod hashed;
mod text;

pub use hashed::HashedEmbedding;
pub use text::TextEmbedding;
