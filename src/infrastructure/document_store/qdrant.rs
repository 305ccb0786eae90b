use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use qdrant_client::qdrant::{
    vectors_config, vectors_output::VectorsOptions, CountPointsBuilder, CreateCollectionBuilder,
    Distance, GetPointsBuilder, PointId, PointStruct, RetrievedPoint, ScrollPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant, QdrantError};
use tracing::{debug, warn};

use crate::domain::{
    ports::{CreateOutcome, DocumentScan, DocumentStore, IndexLifecycle},
    DocumentId, DomainError, Embedding, NewDocument, StoredDocument,
};

const SCROLL_PAGE_SIZE: u32 = 256;

/// Document store backed by a Qdrant collection using cosine distance.
///
/// Ranking is not delegated to the server: `scan` pages through every point
/// and scoring happens in the search service like any other backend.
pub struct QdrantDocumentStore {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantDocumentStore {
    pub fn new(url: &str, collection: &str, dimension: usize) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(Self {
            client,
            collection: collection.to_string(),
            dimension,
        })
    }

    async fn collection_exists(&self) -> Result<bool, DomainError> {
        self.client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| DomainError::external(e.to_string()))
    }

    async fn collection_dimension(&self) -> Result<Option<u64>, DomainError> {
        let info = self
            .client
            .collection_info(&self.collection)
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(info
            .result
            .and_then(|i| i.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|v| v.config)
            .and_then(|c| match c {
                vectors_config::Config::Params(params) => Some(params.size),
                vectors_config::Config::ParamsMap(_) => None,
            }))
    }

    /// Turns a failed request into `NotReady` when the collection is gone.
    async fn request_error(&self, error: QdrantError) -> DomainError {
        match self.collection_exists().await {
            Ok(false) => DomainError::not_ready(format!(
                "collection {} has not been created",
                self.collection
            )),
            _ => DomainError::external(error.to_string()),
        }
    }

    fn point_to_document(point: RetrievedPoint) -> Result<StoredDocument, DomainError> {
        let payload = &point.payload;

        let id: DocumentId = payload
            .get("id")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| DomainError::internal("point payload is missing a valid id"))?;
        let text = payload
            .get("text")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| DomainError::internal(format!("point {id} has no text")))?;
        let created_at = parse_created_at(
            payload
                .get("created_at")
                .and_then(|v| v.as_str())
                .map(String::as_str),
        )?;

        let embedding = match point.vectors.and_then(|v| v.vectors_options) {
            #[allow(deprecated)]
            Some(VectorsOptions::Vector(vector)) => Embedding::new(vector.data),
            _ => {
                return Err(DomainError::internal(format!(
                    "point {id} was returned without its vector"
                )))
            }
        };

        Ok(StoredDocument {
            id,
            text,
            embedding,
            created_at,
        })
    }

    async fn scroll_page(
        &self,
        offset: Option<PointId>,
    ) -> Result<(Vec<RetrievedPoint>, Option<PointId>), DomainError> {
        let mut request = ScrollPointsBuilder::new(&self.collection)
            .limit(SCROLL_PAGE_SIZE)
            .with_payload(true)
            .with_vectors(true);
        if let Some(offset) = offset {
            request = request.offset(offset);
        }

        match self.client.scroll(request).await {
            Ok(response) => Ok((response.result, response.next_page_offset)),
            Err(e) => Err(self.request_error(e).await),
        }
    }
}

/// Paging state of a scan: the next offset to fetch, or `Done`.
enum Cursor {
    Start,
    At(PointId),
    Done,
}

#[async_trait]
impl DocumentStore for QdrantDocumentStore {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn insert(&self, document: NewDocument) -> Result<DocumentId, DomainError> {
        document.embedding().ensure_dimension(self.dimension)?;

        let id = DocumentId::generate();
        let stored = document.into_stored(id);

        let payload: Payload = serde_json::json!({
            "id": id.to_string(),
            "text": stored.text,
            "created_at": stored.created_at.to_rfc3339(),
        })
        .try_into()
        .map_err(|_| DomainError::internal("Failed to create payload"))?;

        let point = PointStruct::new(id.to_string(), stored.embedding.into_inner(), payload);

        if let Err(e) = self
            .client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]).wait(true))
            .await
        {
            return Err(self.request_error(e).await);
        }

        debug!(id = %id, collection = %self.collection, "point upserted");
        Ok(id)
    }

    async fn get(&self, id: &DocumentId) -> Result<String, DomainError> {
        let response = match self
            .client
            .get_points(
                GetPointsBuilder::new(&self.collection, vec![PointId::from(id.to_string())])
                    .with_payload(true),
            )
            .await
        {
            Ok(response) => response,
            Err(e) => return Err(self.request_error(e).await),
        };

        let point = response
            .result
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::not_found(format!("document {id}")))?;

        point
            .payload
            .get("text")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| DomainError::internal(format!("point {id} has no text")))
    }

    async fn scan(&self) -> Result<DocumentScan<'_>, DomainError> {
        if !self.collection_exists().await? {
            return Err(DomainError::not_ready(format!(
                "collection {} has not been created",
                self.collection
            )));
        }

        let pages = stream::try_unfold(Cursor::Start, move |cursor| async move {
            let offset = match cursor {
                Cursor::Start => None,
                Cursor::At(offset) => Some(offset),
                Cursor::Done => return Ok(None),
            };

            let (points, next) = self.scroll_page(offset).await?;
            let next = next.map(Cursor::At).unwrap_or(Cursor::Done);
            Ok::<_, DomainError>(Some((points, next)))
        });

        Ok(pages
            .map(|page| {
                let documents: Vec<Result<StoredDocument, DomainError>> = match page {
                    Ok(points) => points.into_iter().map(Self::point_to_document).collect(),
                    Err(e) => vec![Err(e)],
                };
                stream::iter(documents)
            })
            .flatten()
            .boxed())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        match self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
        {
            Ok(response) => Ok(response.result.map(|r| r.count as usize).unwrap_or(0)),
            Err(e) => Err(self.request_error(e).await),
        }
    }
}

#[async_trait]
impl IndexLifecycle for QdrantDocumentStore {
    async fn create(&self) -> Result<CreateOutcome, DomainError> {
        if self.collection_exists().await? {
            return match self.collection_dimension().await? {
                Some(size) if size as usize == self.dimension => Ok(CreateOutcome::AlreadyExists),
                Some(size) => Err(DomainError::dimension_mismatch(
                    self.dimension,
                    size as usize,
                )),
                None => Err(DomainError::internal(format!(
                    "collection {} uses named vectors",
                    self.collection
                ))),
            };
        }

        let created = self
            .client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                ),
            )
            .await;

        match created {
            Ok(_) => Ok(CreateOutcome::Created),
            Err(e) => {
                // Lost a race with another creator.
                if self.collection_exists().await? {
                    warn!(collection = %self.collection, error = %e, "collection created concurrently");
                    Ok(CreateOutcome::AlreadyExists)
                } else {
                    Err(DomainError::external(e.to_string()))
                }
            }
        }
    }

    async fn destroy(&self) -> Result<(), DomainError> {
        if !self.collection_exists().await? {
            return Err(DomainError::not_found(format!(
                "collection {}",
                self.collection
            )));
        }

        self.client
            .delete_collection(&self.collection)
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        Ok(())
    }

    async fn exists(&self) -> Result<bool, DomainError> {
        self.collection_exists().await
    }
}

fn parse_created_at(raw: Option<&str>) -> Result<DateTime<Utc>, DomainError> {
    let raw = raw.ok_or_else(|| DomainError::internal("payload has no created_at"))?;
    raw.parse::<DateTime<Utc>>()
        .map_err(|e| DomainError::internal(format!("invalid created_at {raw:?}: {e}")))
}
