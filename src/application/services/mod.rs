mod document;
mod index;
mod search;

pub use document::DocumentService;
pub use index::IndexService;
pub use search::SearchService;
