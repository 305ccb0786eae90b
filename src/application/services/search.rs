use futures::TryStreamExt;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::{
    ports::{DocumentStore, Embedder},
    DomainError, Embedding, SearchResult,
};

/// Exact nearest-neighbour search over a `DocumentStore`.
///
/// Every query scans and scores all N stored documents, so a query costs
/// O(N·D). There is no approximate index; callers that need sub-linear
/// latency have to put one in front of this service.
pub struct SearchService {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DocumentStore>,
    default_top_k: usize,
}

impl SearchService {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn DocumentStore>,
        default_top_k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            default_top_k,
        }
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    /// Ranks every stored document against `query` and returns the best `top_k`.
    ///
    /// Scores are `cosine_similarity + 1.0`, sorted descending. The sort is
    /// stable, so equal scores keep scan order.
    #[instrument(skip(self, query), fields(dimension = query.dimension()))]
    pub async fn query(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        query.ensure_dimension(self.store.dimension())?;
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let mut scan = self.store.scan().await?;
        let mut results = Vec::new();

        while let Some(doc) = scan.try_next().await? {
            let score = doc.embedding.ranking_score(query)?;
            results.push(SearchResult {
                id: doc.id,
                text: doc.text,
                score,
            });
        }

        let scanned = results.len();
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(top_k);

        debug!(scanned, returned = results.len(), "query ranked");
        Ok(results)
    }

    #[instrument(skip(self, text))]
    pub async fn search_text(
        &self,
        text: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        if text.trim().is_empty() {
            return Err(DomainError::invalid_input("query text must not be empty"));
        }

        let embedding = self.embedder.embed(text).await?;
        self.query(&embedding, top_k).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        cosine_similarity,
        ports::{DocumentStore, IndexLifecycle},
        DocumentId, NewDocument,
    };
    use crate::infrastructure::{HashedEmbedding, InMemoryDocumentStore};

    async fn service_with(
        dimension: usize,
        docs: &[(&str, Vec<f32>)],
    ) -> (SearchService, Vec<DocumentId>) {
        let store = Arc::new(InMemoryDocumentStore::new("test", dimension));
        store.create().await.unwrap();

        let mut ids = Vec::new();
        for (text, vector) in docs {
            let doc = NewDocument::new(*text, vector.clone()).unwrap();
            ids.push(store.insert(doc).await.unwrap());
        }

        let service = SearchService::new(Arc::new(HashedEmbedding::new(dimension)), store, 10);
        (service, ids)
    }

    #[tokio::test]
    async fn test_exact_match_ranks_first() {
        let (service, ids) = service_with(
            3,
            &[("cat", vec![1.0, 0.0, 0.0]), ("dog", vec![0.0, 1.0, 0.0])],
        )
        .await;

        let results = service
            .query(&Embedding::new(vec![1.0, 0.0, 0.0]), 1)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, ids[0]);
        assert_eq!(results[0].text, "cat");
        assert!((results[0].score - 2.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_equal_scores_are_deterministic() {
        let (service, ids) = service_with(
            3,
            &[("cat", vec![1.0, 0.0, 0.0]), ("dog", vec![0.0, 1.0, 0.0])],
        )
        .await;
        let query = Embedding::new(vec![0.7, 0.7, 0.0]);

        let first = service.query(&query, 2).await.unwrap();
        assert_eq!(first.len(), 2);
        assert!((first[0].score - first[1].score).abs() < 1e-6);
        assert!((first[0].score - 1.707_106_8).abs() < 1e-4);

        // Ties keep scan order.
        assert_eq!(first[0].id, ids[0]);
        assert_eq!(first[1].id, ids[1]);

        for _ in 0..5 {
            assert_eq!(service.query(&query, 2).await.unwrap(), first);
        }
    }

    #[tokio::test]
    async fn test_results_sorted_by_cosine() {
        let vectors = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.5, 0.5, 0.0],
            vec![-1.0, 0.2, 0.0],
            vec![0.9, 0.1, 0.3],
            vec![0.0, 0.0, 1.0],
        ];
        let docs: Vec<(&str, Vec<f32>)> = vectors.iter().map(|v| ("doc", v.clone())).collect();
        let (service, ids) = service_with(3, &docs).await;
        let query = vec![0.8, 0.3, 0.1];

        let results = service
            .query(&Embedding::new(query.clone()), 10)
            .await
            .unwrap();

        let mut expected: Vec<(DocumentId, f32)> = ids
            .iter()
            .zip(&vectors)
            .map(|(id, v)| (*id, cosine_similarity(v, &query).unwrap() + 1.0))
            .collect();
        expected.sort_by(|a, b| b.1.total_cmp(&a.1));

        assert_eq!(results.len(), expected.len());
        for (result, (id, score)) in results.iter().zip(&expected) {
            assert_eq!(result.id, *id);
            assert!((result.score - score).abs() < 1e-6);
        }
    }

    #[tokio::test]
    async fn test_top_k_bounds() {
        let (service, _) = service_with(
            2,
            &[
                ("a", vec![1.0, 0.0]),
                ("b", vec![0.0, 1.0]),
                ("c", vec![1.0, 1.0]),
            ],
        )
        .await;
        let query = Embedding::new(vec![1.0, 0.0]);

        assert!(service.query(&query, 0).await.unwrap().is_empty());
        assert_eq!(service.query(&query, 2).await.unwrap().len(), 2);
        assert_eq!(service.query(&query, 100).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty() {
        let (service, _) = service_with(2, &[]).await;
        let results = service
            .query(&Embedding::new(vec![1.0, 0.0]), 5)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_query_dimension_mismatch() {
        let (service, _) = service_with(3, &[("cat", vec![1.0, 0.0, 0.0])]).await;
        let err = service
            .query(&Embedding::new(vec![1.0, 0.0]), 1)
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::dimension_mismatch(3, 2));
    }

    #[tokio::test]
    async fn test_degenerate_vectors_propagate() {
        let (service, _) = service_with(2, &[("zero", vec![0.0, 0.0])]).await;

        let err = service
            .query(&Embedding::new(vec![1.0, 0.0]), 1)
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::DegenerateVector);

        let (service, _) = service_with(2, &[("a", vec![1.0, 0.0])]).await;
        let err = service
            .query(&Embedding::zeros(2), 1)
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::DegenerateVector);
    }

    #[tokio::test]
    async fn test_search_text_rejects_empty_query() {
        let (service, _) = service_with(8, &[]).await;
        let err = service.search_text("   ", 3).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }
}
