//! Handlers for `/runs` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/runs` | Body: `{"source"?, "rows": [{label: value}]}`; 400 when no row has an identifier |
//! | `GET`  | `/runs` | Summaries, newest first |
//! | `GET`  | `/runs/{id}` | Results with current overrides and final status |
//! | `GET`  | `/runs/{id}/export` | `{"stopped": [...], "continued": [...]}` |
//! | `GET`  | `/runs/{id}/export.xlsx` | The same groups as a workbook; 409 when both are empty |

use axum::{
  Json,
  extract::{Path, State},
  http::{StatusCode, header},
  response::IntoResponse,
};
use btw_core::{
  Error as CoreError,
  batch::run_batch,
  export::{ExportGroups, classify_for_export},
  lookup::LookupClient,
  reconcile::{FinalStatus, ManualOverride, ReconciliationStore},
  record::{ParsedRecord, RawRecord, parse_records},
  store::{Run, RunRepository, RunSummary},
  verdict::Verdict,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── Views ───────────────────────────────────────────────────────────────────

/// One result as shown to a reviewer: the stored verdict plus the override
/// and final status as of this request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResultView {
  pub record:       ParsedRecord,
  pub verdict:      Verdict,
  #[serde(rename = "override")]
  pub ov:           ManualOverride,
  pub final_status: FinalStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunView {
  pub run_id:     Uuid,
  pub created_at: DateTime<Utc>,
  pub source:     Option<String>,
  pub cancelled:  bool,
  pub results:    Vec<ResultView>,
}

impl RunView {
  fn new(run: Run, overrides: &ReconciliationStore) -> Self {
    let results = run
      .results
      .into_iter()
      .map(|r| ResultView {
        ov:           overrides.get(&r.record.identifier),
        final_status: overrides.final_status(&r.record.identifier, &r.verdict),
        record:       r.record,
        verdict:      r.verdict,
      })
      .collect();
    Self {
      run_id: run.run_id,
      created_at: run.created_at,
      source: run.source,
      cancelled: run.cancelled,
      results,
    }
  }
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub source: Option<String>,
  pub rows:   Vec<RawRecord>,
}

/// `POST /runs` — validates every row sequentially, then stores the run.
///
/// The request stays open for the whole run. A client that disconnects
/// drops the handler and nothing is stored.
pub async fn create<S, P, F, A>(
  State(state): State<ApiState<S, P, F, A>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RunRepository,
  P: LookupClient,
  F: LookupClient,
{
  let records = parse_records(&body.rows, &state.columns);

  let report = run_batch(
    &records,
    &state.sequencer,
    &state.batch,
    &CancellationToken::new(),
    |p| debug!(processed = p.processed, total = p.total, "run progress"),
  )
  .await
  .map_err(|e| match e {
    CoreError::NoData => ApiError::BadRequest(e.to_string()),
  })?;

  let run = Run::from_report(report, body.source);
  state.store.save_run(&run).await.map_err(ApiError::store)?;
  info!(run_id = %run.run_id, results = run.results.len(), "run stored");

  let overrides = state.store.load_overrides().await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(RunView::new(run, &overrides))))
}

// ─── Read ────────────────────────────────────────────────────────────────────

/// `GET /runs`
pub async fn list<S, P, F, A>(
  State(state): State<ApiState<S, P, F, A>>,
) -> Result<Json<Vec<RunSummary>>, ApiError>
where
  S: RunRepository,
{
  let runs = state.store.list_runs().await.map_err(ApiError::store)?;
  Ok(Json(runs))
}

async fn load<S: RunRepository>(store: &S, id: Uuid) -> Result<Run, ApiError> {
  store
    .get_run(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("run {id} not found")))
}

/// `GET /runs/{id}`
pub async fn get_one<S, P, F, A>(
  State(state): State<ApiState<S, P, F, A>>,
  Path(id): Path<Uuid>,
) -> Result<Json<RunView>, ApiError>
where
  S: RunRepository,
{
  let run = load(state.store.as_ref(), id).await?;
  let overrides = state.store.load_overrides().await.map_err(ApiError::store)?;
  Ok(Json(RunView::new(run, &overrides)))
}

/// `GET /runs/{id}/export`
pub async fn export<S, P, F, A>(
  State(state): State<ApiState<S, P, F, A>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ExportGroups>, ApiError>
where
  S: RunRepository,
{
  Ok(Json(export_groups(state.store.as_ref(), id).await?))
}

const XLSX_CONTENT_TYPE: &str =
  "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// `GET /runs/{id}/export.xlsx`
pub async fn export_xlsx<S, P, F, A>(
  State(state): State<ApiState<S, P, F, A>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RunRepository,
{
  let groups = export_groups(state.store.as_ref(), id).await?;
  let bytes = btw_io::xlsx::to_buffer(&groups)?;
  let disposition = format!("attachment; filename=\"btw-export-{id}.xlsx\"");
  Ok((
    [
      (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_owned()),
      (header::CONTENT_DISPOSITION, disposition),
    ],
    bytes,
  ))
}

async fn export_groups<S: RunRepository>(store: &S, id: Uuid) -> Result<ExportGroups, ApiError> {
  let run = load(store, id).await?;
  let overrides = store.load_overrides().await.map_err(ApiError::store)?;
  Ok(classify_for_export(&run.results, &overrides))
}
