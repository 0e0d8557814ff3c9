//! Handlers for `/records` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/records` | Current [`Snapshot`], ordered by serial number |
//! | `POST`   | `/records` | Body: [`RecordFields`]; returns 201 + stored record |
//! | `GET`    | `/records/:id` | 404 if not found |
//! | `PUT`    | `/records/:id` | Body: [`RecordFields`]; full overwrite; 404 if not found |
//! | `DELETE` | `/records/:id` | 204, or 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use pariwar_core::{
  record::{Record, RecordFields},
  snapshot::Snapshot,
  store::RecordStore,
};
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /records`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Snapshot>, ApiError>
where
  S: RecordStore,
{
  let snapshot = store.list().await.map_err(ApiError::store)?;
  Ok(Json(snapshot))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /records`: returns 201 + the stored [`Record`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<RecordFields>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
{
  body.validate()?;
  let record = store.create(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /records/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Record>, ApiError>
where
  S: RecordStore,
{
  let record = store
    .get(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("record {id} not found")))?;
  Ok(Json(record))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /records/:id`: every field in the body replaces the stored value.
pub async fn update_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<RecordFields>,
) -> Result<Json<Record>, ApiError>
where
  S: RecordStore,
{
  body.validate()?;
  let record = store
    .update(id, body)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("record {id} not found")))?;
  Ok(Json(record))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /records/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore,
{
  if store.delete(id).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("record {id} not found")))
  }
}
