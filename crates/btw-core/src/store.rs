//! The `RunRepository` trait and the persisted run types.
//!
//! The trait is implemented by storage backends (e.g. `btw-store-sqlite`).
//! Higher layers (`btw-api`, `btw-cli`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  batch::BatchReport,
  identifier::CanonicalIdentifier,
  reconcile::{ManualOverride, OverrideChange, ReconciliationStore},
  verdict::ValidationResult,
};

// ─── Run types ───────────────────────────────────────────────────────────────

/// A completed (or cancelled) validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
  pub run_id:     Uuid,
  pub created_at: DateTime<Utc>,
  /// Where the records came from, e.g. the uploaded file name.
  pub source:     Option<String>,
  pub cancelled:  bool,
  /// One entry per processed record, in input order.
  pub results:    Vec<ValidationResult>,
}

impl Run {
  /// Wrap a batch report as a new run with a fresh id.
  pub fn from_report(report: BatchReport, source: Option<String>) -> Self {
    Self {
      run_id: Uuid::new_v4(),
      created_at: Utc::now(),
      source,
      cancelled: report.cancelled,
      results: report.results,
    }
  }

  pub fn summary(&self) -> RunSummary {
    RunSummary {
      run_id:       self.run_id,
      created_at:   self.created_at,
      source:       self.source.clone(),
      cancelled:    self.cancelled,
      total:        self.results.len(),
      active_count: self.results.iter().filter(|r| r.verdict.is_active).count(),
    }
  }
}

/// Listing entry for a run, without its results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
  pub run_id:       Uuid,
  pub created_at:   DateTime<Utc>,
  pub source:       Option<String>,
  pub cancelled:    bool,
  pub total:        usize,
  /// Records verified active by a registry (overrides not applied).
  pub active_count: usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over persistence of runs and manual overrides.
///
/// Runs are written once and never modified. Overrides are last-writer-wins
/// per identifier.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RunRepository: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Runs ──────────────────────────────────────────────────────────────

  /// Persist a run with all its results.
  fn save_run(
    &self,
    run: &Run,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;

  /// Retrieve a run by id. Returns `None` if not found.
  fn get_run(
    &self,
    run_id: Uuid,
  ) -> impl Future<Output = Result<Option<Run>, Self::Error>> + Send + '_;

  /// List all runs, newest first.
  fn list_runs(
    &self,
  ) -> impl Future<Output = Result<Vec<RunSummary>, Self::Error>> + Send + '_;

  // ── Overrides ─────────────────────────────────────────────────────────

  /// Load every stored override into a fresh [`ReconciliationStore`].
  fn load_overrides(
    &self,
  ) -> impl Future<Output = Result<ReconciliationStore, Self::Error>> + Send + '_;

  /// The stored override for `id`, or the default when none is stored.
  fn get_override(
    &self,
    id: &CanonicalIdentifier,
  ) -> impl Future<Output = Result<ManualOverride, Self::Error>> + Send;

  /// Apply `change` to the stored override for `id` (the default when none
  /// is stored) and return the result. The read and the write are atomic:
  /// concurrent changes to the same identifier are applied one after the
  /// other, never merged from stale copies.
  fn update_override(
    &self,
    id: &CanonicalIdentifier,
    change: OverrideChange,
  ) -> impl Future<Output = Result<ManualOverride, Self::Error>> + Send;

  /// Store `ov` as the override for `id`, replacing any previous one.
  fn put_override(
    &self,
    id: &CanonicalIdentifier,
    ov: &ManualOverride,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
