use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection, QueryRejection},
        FromRequest, Path, Query, Request, State,
    },
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::{error::ApiError, state::AppState};
use crate::domain::{DocumentId, DomainError, SearchResult};

#[derive(Debug, Deserialize)]
pub struct AddDocumentBody {
    pub text: String,
}

/// Document text submitted either as a form field or as a JSON body.
#[derive(Debug)]
pub struct AddDocumentRequest(pub String);

impl<S> FromRequest<S> for AddDocumentRequest
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let body = if is_json {
            let Json(body) = Json::<AddDocumentBody>::from_request(req, state)
                .await
                .map_err(|rejection: JsonRejection| malformed(rejection.body_text()))?;
            body
        } else {
            let Form(body) = Form::<AddDocumentBody>::from_request(req, state)
                .await
                .map_err(|rejection: FormRejection| malformed(rejection.body_text()))?;
            body
        };

        Ok(Self(body.text))
    }
}

/// Extractor failures get the same JSON error body as domain errors.
fn malformed(reason: String) -> ApiError {
    ApiError(DomainError::invalid_input(reason))
}

#[derive(Debug, Serialize)]
pub struct DocumentIdResponse {
    pub id: DocumentId,
}

#[derive(Debug, Serialize)]
pub struct DocumentTextResponse {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub top_k: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SearchResultResponse {
    pub id: DocumentId,
    pub text: String,
    pub score: f32,
}

impl From<SearchResult> for SearchResultResponse {
    fn from(result: SearchResult) -> Self {
        Self {
            id: result.id,
            text: result.text,
            score: result.score,
        }
    }
}

pub async fn add_document(
    State(state): State<AppState>,
    AddDocumentRequest(text): AddDocumentRequest,
) -> Result<Json<DocumentIdResponse>, ApiError> {
    let id = state.documents.add(&text).await?;
    Ok(Json(DocumentIdResponse { id }))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentTextResponse>, ApiError> {
    let text = state.documents.get_by_str(&id).await?;
    Ok(Json(DocumentTextResponse { text }))
}

pub async fn search_documents(
    State(state): State<AppState>,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<SearchResultResponse>>, ApiError> {
    let Query(params) = params.map_err(|rejection| malformed(rejection.body_text()))?;
    let top_k = match params.top_k {
        None => state.search.default_top_k(),
        Some(k) => usize::try_from(k)
            .map_err(|_| DomainError::invalid_input(format!("top_k must be >= 0, got {k}")))?,
    };

    let results = state.search.search_text(&params.query, top_k).await?;
    Ok(Json(results.into_iter().map(Into::into).collect()))
}
