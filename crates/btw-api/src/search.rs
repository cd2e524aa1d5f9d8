//! Handler for `POST /search-address`.
//!
//! Body fields map directly to [`AddressQuery`]; all are optional but at
//! least one must be non-blank.

use axum::{Json, extract::State};
use btw_core::{
  address::AddressQuery,
  lookup::{AddressMatch, AddressSearch},
};

use crate::{ApiState, error::ApiError};

/// `POST /search-address` — body: `{"street", "house_number", "postal_code", "city"}`
pub async fn handler<S, P, F, A>(
  State(state): State<ApiState<S, P, F, A>>,
  Json(query): Json<AddressQuery>,
) -> Result<Json<Vec<AddressMatch>>, ApiError>
where
  A: AddressSearch,
{
  if query.is_empty() {
    return Err(ApiError::BadRequest("address query is empty".into()));
  }
  let matches = state.search.search(&query).await?;
  Ok(Json(matches))
}
