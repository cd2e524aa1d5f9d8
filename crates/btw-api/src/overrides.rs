//! Handlers for `/overrides/{identifier}` endpoints.
//!
//! The identifier segment is normalised before use, so `0123.456.789` and
//! `BE0123456789` address the same override. Every mutation returns the
//! updated override.

use axum::{
  Json,
  extract::{Path, State},
};
use btw_core::{
  CanonicalIdentifier, normalize,
  reconcile::{ManualOverride, OverrideChange},
  store::RunRepository,
};
use serde::Deserialize;
use tracing::info;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ValueBody {
  pub value: String,
}

fn key(raw: &str) -> Result<CanonicalIdentifier, ApiError> {
  if raw.trim().is_empty() {
    return Err(ApiError::BadRequest("identifier is empty".into()));
  }
  Ok(normalize(raw))
}

/// Apply `change` to the stored override in one atomic store update.
async fn update<S: RunRepository>(
  store: &S,
  raw: &str,
  change: OverrideChange,
) -> Result<ManualOverride, ApiError> {
  let id = key(raw)?;
  let updated = store
    .update_override(&id, change)
    .await
    .map_err(ApiError::store)?;
  info!(%id, ?updated, "override updated");
  Ok(updated)
}

/// `GET /overrides/{identifier}`
pub async fn get_one<S, P, F, A>(
  State(state): State<ApiState<S, P, F, A>>,
  Path(raw): Path<String>,
) -> Result<Json<ManualOverride>, ApiError>
where
  S: RunRepository,
{
  let id = key(&raw)?;
  let ov = state.store.get_override(&id).await.map_err(ApiError::store)?;
  Ok(Json(ov))
}

/// `POST /overrides/{identifier}/confirmed-active`
pub async fn toggle_confirmed<S, P, F, A>(
  State(state): State<ApiState<S, P, F, A>>,
  Path(raw): Path<String>,
) -> Result<Json<ManualOverride>, ApiError>
where
  S: RunRepository,
{
  let ov = update(state.store.as_ref(), &raw, OverrideChange::ToggleConfirmed).await?;
  Ok(Json(ov))
}

/// `POST /overrides/{identifier}/superseding`
pub async fn toggle_superseding<S, P, F, A>(
  State(state): State<ApiState<S, P, F, A>>,
  Path(raw): Path<String>,
) -> Result<Json<ManualOverride>, ApiError>
where
  S: RunRepository,
{
  let ov = update(state.store.as_ref(), &raw, OverrideChange::ToggleSuperseding).await?;
  Ok(Json(ov))
}

/// `PUT /overrides/{identifier}/superseding-value` — body: `{"value"}`
pub async fn set_value<S, P, F, A>(
  State(state): State<ApiState<S, P, F, A>>,
  Path(raw): Path<String>,
  Json(body): Json<ValueBody>,
) -> Result<Json<ManualOverride>, ApiError>
where
  S: RunRepository,
{
  let ov = update(state.store.as_ref(), &raw, OverrideChange::SetValue(body.value)).await?;
  Ok(Json(ov))
}

/// `POST /overrides/{identifier}/adopt` — body: `{"value"}`; sets the flag
/// and the value together.
pub async fn adopt<S, P, F, A>(
  State(state): State<ApiState<S, P, F, A>>,
  Path(raw): Path<String>,
  Json(body): Json<ValueBody>,
) -> Result<Json<ManualOverride>, ApiError>
where
  S: RunRepository,
{
  let ov = update(state.store.as_ref(), &raw, OverrideChange::Adopt(body.value)).await?;
  Ok(Json(ov))
}
