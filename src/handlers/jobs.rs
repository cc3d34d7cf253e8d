//! Route layer for `/jobs`: body validation, admin guards, and translation of
//! gateway errors into HTTP responses.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::db::AppState;
use crate::error::ApiError;
use crate::middleware::AdminUser;
use crate::models::job::{JobFilter, JobStore, JobUpdate, NewJob};

/// Deserialize a JSON body into its request type. Parse and shape failures
/// both surface as validation errors, so every 400 carries the standard
/// error envelope (axum's built-in `Json` rejection would respond in plain
/// text).
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::validation_error(vec![e.to_string()]))
}

fn check(errors: Vec<String>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error(errors))
    }
}

/// POST /jobs (admin) - create a job, 201 with `{ job }`
pub async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let data: NewJob = parse_body(&body)?;
    check(data.validate())?;

    let job = JobStore::new(state.pool).create(&data).await?;
    Ok((StatusCode::CREATED, Json(json!({ "job": job }))))
}

/// GET /jobs (public) - list jobs, query params as filters, `{ jobs }`
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<JobFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let jobs = JobStore::new(state.pool).find_all(&filter).await?;
    Ok(Json(json!({ "jobs": jobs })))
}

/// GET /jobs/:id (public) - `{ job }` or 404
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let job = JobStore::new(state.pool).get(id).await?;
    Ok(Json(json!({ "job": job })))
}

/// PATCH /jobs/:id (admin) - partial update, `{ job }` or 400/404
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _admin: AdminUser,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let data: JobUpdate = parse_body(&body)?;
    check(data.validate())?;

    let job = JobStore::new(state.pool).update(id, &data).await?;
    Ok(Json(json!({ "job": job })))
}

/// DELETE /jobs/:id (admin) - `{ deleted: id }` or 404
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    JobStore::new(state.pool).remove(id).await?;
    Ok(Json(json!({ "deleted": id })))
}
