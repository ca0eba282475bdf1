use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::IntoResponse,
    Json,
};
use futures::stream::Stream;
use serde_json::json;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use uuid::Uuid;

use crate::dto::candidate_dto::{CandidatePayload, CandidateResponse};
use crate::error::{Error, Result};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/candidates",
    responses(
        (status = 200, description = "All candidates, newest first"),
        (status = 500, description = "Store unavailable"),
    ),
)]
pub async fn list_candidates(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let candidates: Vec<CandidateResponse> = state
        .candidate_service
        .list()
        .await?
        .into_iter()
        .map(CandidateResponse::from)
        .collect();
    Ok(Json(json!({ "success": true, "candidates": candidates })))
}

#[utoipa::path(
    get,
    path = "/api/candidates/{id}",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate retrieved successfully"),
        (status = 404, description = "Candidate not found"),
    ),
)]
pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let candidate = state
        .candidate_service
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))?;
    Ok(Json(CandidateResponse::from(candidate)))
}

#[utoipa::path(
    post,
    path = "/api/candidates",
    responses(
        (status = 201, description = "Candidate created"),
        (status = 400, description = "Missing or malformed field"),
        (status = 409, description = "Duplicate candidate"),
        (status = 500, description = "Store unavailable"),
    ),
)]
pub async fn create_candidate(
    State(state): State<AppState>,
    Json(payload): Json<CandidatePayload>,
) -> Result<impl IntoResponse> {
    let normalized = payload.normalize_new()?;
    let candidate = state.candidate_service.create(normalized).await?;
    tracing::info!(candidate = %candidate.id, "candidate created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "candidateId": candidate.id })),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/candidates/{id}",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate updated"),
        (status = 404, description = "Candidate not found"),
    ),
)]
pub async fn update_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CandidatePayload>,
) -> Result<impl IntoResponse> {
    let update = payload.normalize_update()?;
    let candidate = state.candidate_service.update(id, update).await?;
    Ok(Json(CandidateResponse::from(candidate)))
}

#[utoipa::path(
    delete,
    path = "/api/candidates/{id}",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 204, description = "Candidate deleted (or was already absent)"),
        (status = 500, description = "Store unavailable"),
    ),
)]
pub async fn delete_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.candidate_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Best-effort stream of candidate-insert events. Each client owns a
/// subscription that closes when the connection drops; a lagging client
/// skips whatever it missed.
pub async fn candidate_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>> {
    let stream = BroadcastStream::new(state.candidate_service.subscribe())
        .filter_map(|event| event.ok())
        .map(|candidate| {
            Event::default()
                .event("candidate.created")
                .json_data(&CandidateResponse::from(candidate))
        });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
