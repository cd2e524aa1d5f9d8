//! Handler for `POST /validate`: a one-off check outside any run.

use axum::{Json, extract::State};
use btw_core::{CanonicalIdentifier, lookup::LookupClient, normalize, verdict::Verdict};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ValidateBody {
  pub identifier: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
  pub identifier: CanonicalIdentifier,
  pub verdict:    Verdict,
}

/// `POST /validate` — body: `{"identifier":"BE 0123.456.789"}`
pub async fn handler<S, P, F, A>(
  State(state): State<ApiState<S, P, F, A>>,
  Json(body): Json<ValidateBody>,
) -> Result<Json<ValidateResponse>, ApiError>
where
  P: LookupClient,
  F: LookupClient,
{
  if body.identifier.trim().is_empty() {
    return Err(ApiError::BadRequest("identifier is empty".into()));
  }
  let identifier = normalize(&body.identifier);
  let verdict = state.sequencer.validate(&identifier).await;
  Ok(Json(ValidateResponse { identifier, verdict }))
}
