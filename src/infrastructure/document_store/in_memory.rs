use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::{
    ports::{CreateOutcome, DocumentScan, DocumentStore, IndexLifecycle},
    DocumentId, DomainError, NewDocument, StoredDocument,
};

/// Documents in insertion order plus an id index into that order.
#[derive(Default)]
struct Collection {
    documents: Vec<Arc<StoredDocument>>,
    positions: HashMap<DocumentId, usize>,
}

/// Single-node store keeping every document in process memory.
///
/// `None` means the collection has not been created (or was destroyed).
pub struct InMemoryDocumentStore {
    name: String,
    dimension: usize,
    collection: RwLock<Option<Collection>>,
}

impl InMemoryDocumentStore {
    pub fn new(name: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            dimension,
            collection: RwLock::new(None),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Option<Collection>>, DomainError> {
        self.collection
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Option<Collection>>, DomainError> {
        self.collection
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))
    }

    fn not_ready(&self) -> DomainError {
        DomainError::not_ready(format!("collection {} has not been created", self.name))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn insert(&self, document: NewDocument) -> Result<DocumentId, DomainError> {
        document.embedding().ensure_dimension(self.dimension)?;

        let mut guard = self.write()?;
        let collection = guard.as_mut().ok_or_else(|| self.not_ready())?;

        let mut id = DocumentId::generate();
        while collection.positions.contains_key(&id) {
            id = DocumentId::generate();
        }

        collection
            .positions
            .insert(id, collection.documents.len());
        collection
            .documents
            .push(Arc::new(document.into_stored(id)));

        Ok(id)
    }

    async fn get(&self, id: &DocumentId) -> Result<String, DomainError> {
        let guard = self.read()?;
        let collection = guard.as_ref().ok_or_else(|| self.not_ready())?;

        collection
            .positions
            .get(id)
            .map(|&pos| collection.documents[pos].text.clone())
            .ok_or_else(|| DomainError::not_found(format!("document {id}")))
    }

    async fn scan(&self) -> Result<DocumentScan<'_>, DomainError> {
        // Snapshot handles under the read lock; copies are made lazily as the
        // stream is polled.
        let snapshot: Vec<Arc<StoredDocument>> = {
            let guard = self.read()?;
            let collection = guard.as_ref().ok_or_else(|| self.not_ready())?;
            collection.documents.clone()
        };

        Ok(stream::iter(snapshot)
            .map(|doc| Ok(StoredDocument::clone(&doc)))
            .boxed())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let guard = self.read()?;
        let collection = guard.as_ref().ok_or_else(|| self.not_ready())?;
        Ok(collection.documents.len())
    }
}

#[async_trait]
impl IndexLifecycle for InMemoryDocumentStore {
    async fn create(&self) -> Result<CreateOutcome, DomainError> {
        let mut guard = self.write()?;
        if guard.is_some() {
            return Ok(CreateOutcome::AlreadyExists);
        }
        *guard = Some(Collection::default());
        Ok(CreateOutcome::Created)
    }

    async fn destroy(&self) -> Result<(), DomainError> {
        let mut guard = self.write()?;
        match guard.take() {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found(format!("collection {}", self.name))),
        }
    }

    async fn exists(&self) -> Result<bool, DomainError> {
        Ok(self.read()?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use std::collections::HashSet;

    async fn ready_store(dimension: usize) -> InMemoryDocumentStore {
        let store = InMemoryDocumentStore::new("test", dimension);
        store.create().await.unwrap();
        store
    }

    fn doc(text: &str, vector: Vec<f32>) -> NewDocument {
        NewDocument::new(text, vector).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = ready_store(3).await;

        let id = store.insert(doc("cat", vec![1.0, 0.0, 0.0])).await.unwrap();

        assert_eq!(store.get(&id).await.unwrap(), "cat");
        assert_eq!(store.get(&id).await.unwrap(), "cat");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = ready_store(3).await;
        let err = store.get(&DocumentId::generate()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_insert_rejects_wrong_dimension() {
        let store = ready_store(3).await;

        let err = store.insert(doc("cat", vec![1.0, 0.0])).await.unwrap_err();
        assert_eq!(err, DomainError::dimension_mismatch(3, 2));

        let scanned: Vec<_> = store.scan().await.unwrap().try_collect().await.unwrap();
        assert!(scanned.is_empty());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = ready_store(2).await;
        let mut ids = HashSet::new();
        for i in 0..100 {
            let id = store
                .insert(doc(&format!("doc {i}"), vec![1.0, i as f32]))
                .await
                .unwrap();
            assert!(ids.insert(id));
        }
    }

    #[tokio::test]
    async fn test_scan_is_restartable_and_ordered() {
        let store = ready_store(2).await;
        let a = store.insert(doc("a", vec![1.0, 0.0])).await.unwrap();
        let b = store.insert(doc("b", vec![0.0, 1.0])).await.unwrap();

        for _ in 0..2 {
            let scanned: Vec<StoredDocument> =
                store.scan().await.unwrap().try_collect().await.unwrap();
            let ids: Vec<_> = scanned.iter().map(|d| d.id).collect();
            assert_eq!(ids, vec![a, b]);
        }
    }

    #[tokio::test]
    async fn test_operations_before_create_are_not_ready() {
        let store = InMemoryDocumentStore::new("test", 2);

        let err = store.insert(doc("a", vec![1.0, 0.0])).await.unwrap_err();
        assert!(matches!(err, DomainError::NotReady(_)));
        assert!(matches!(store.scan().await, Err(DomainError::NotReady(_))));
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let store = ready_store(2).await;
        let id = store.insert(doc("a", vec![1.0, 0.0])).await.unwrap();

        assert_eq!(store.create().await.unwrap(), CreateOutcome::AlreadyExists);
        assert_eq!(store.get(&id).await.unwrap(), "a");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_destroy_lifecycle() {
        let store = ready_store(2).await;
        store.insert(doc("a", vec![1.0, 0.0])).await.unwrap();

        store.destroy().await.unwrap();
        assert!(!store.exists().await.unwrap());

        let err = store.destroy().await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        assert_eq!(store.create().await.unwrap(), CreateOutcome::Created);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_inserts() {
        let store = Arc::new(ready_store(2).await);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert(doc(&format!("doc {i}"), vec![1.0, i as f32]))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }

        assert_eq!(ids.len(), 16);
        assert_eq!(store.count().await.unwrap(), 16);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_scans_during_inserts_see_whole_documents() {
        const WRITERS: usize = 8;
        const PER_WRITER: usize = 25;
        let store = Arc::new(ready_store(3).await);

        let writers: Vec<_> = (0..WRITERS)
            .map(|w| {
                let store = store.clone();
                tokio::spawn(async move {
                    for i in 0..PER_WRITER {
                        let vector = vec![w as f32 + 1.0, i as f32, 1.0];
                        store.insert(doc(&format!("w{w}-{i}"), vector)).await.unwrap();
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        let scanners: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    let mut seen = Vec::new();
                    let mut previous = 0;
                    for _ in 0..20 {
                        let docs: Vec<StoredDocument> =
                            store.scan().await.unwrap().try_collect().await.unwrap();
                        assert!(docs.len() >= previous);
                        previous = docs.len();

                        for d in docs {
                            let (w, i) = d
                                .text
                                .strip_prefix('w')
                                .and_then(|rest| rest.split_once('-'))
                                .unwrap();
                            let expected: Vec<f32> =
                                vec![w.parse::<f32>().unwrap() + 1.0, i.parse().unwrap(), 1.0];
                            assert_eq!(d.embedding.as_slice(), expected.as_slice());
                            seen.push((d.id, d.text));
                        }
                        tokio::task::yield_now().await;
                    }
                    seen
                })
            })
            .collect();

        for writer in writers {
            writer.await.unwrap();
        }
        for scanner in scanners {
            for (id, text) in scanner.await.unwrap() {
                assert_eq!(store.get(&id).await.unwrap(), text);
            }
        }

        let all: Vec<StoredDocument> = store.scan().await.unwrap().try_collect().await.unwrap();
        assert_eq!(all.len(), WRITERS * PER_WRITER);
        assert_eq!(store.count().await.unwrap(), WRITERS * PER_WRITER);
        let ids: HashSet<_> = all.iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), WRITERS * PER_WRITER);
    }
}
