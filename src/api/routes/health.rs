use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Serialize)]
pub struct RootResponse {
    pub message: String,
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub documents: Option<usize>,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Semantic document search".into(),
        status: "OK".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let not_ready = || {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready".into(),
                documents: None,
            }),
        )
    };

    match state.index.is_ready().await {
        Ok(true) => {}
        Ok(false) => return Err(not_ready()),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            return Err(not_ready());
        }
    }

    let documents = state.documents.count().await.map_err(|e| {
        tracing::warn!(error = %e, "readiness check failed");
        not_ready()
    })?;

    Ok(Json(ReadinessResponse {
        status: "ready".into(),
        documents: Some(documents),
    }))
}
