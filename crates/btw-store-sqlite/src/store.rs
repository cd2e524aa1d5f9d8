//! [`SqliteStore`] — the SQLite implementation of [`RunRepository`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tracing::debug;
use uuid::Uuid;

use btw_core::{
  identifier::CanonicalIdentifier,
  reconcile::{ManualOverride, OverrideChange, ReconciliationStore},
  store::{Run, RunRepository, RunSummary},
};

use crate::{
  encode::{
    RawOverride, RawResult, RawRun, encode_dt, encode_results, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

const RUN_SUMMARY_SQL: &str = "
  SELECT r.run_id, r.created_at, r.source, r.cancelled,
         COUNT(x.position), COALESCE(SUM(x.is_active), 0)
  FROM runs r
  LEFT JOIN results x ON x.run_id = r.run_id";

fn raw_run(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRun> {
  Ok(RawRun {
    run_id:       row.get(0)?,
    created_at:   row.get(1)?,
    source:       row.get(2)?,
    cancelled:    row.get(3)?,
    total:        row.get(4)?,
    active_count: row.get(5)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A run store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn run_exists(&self, run_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(run_id);
    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM runs WHERE run_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }
}

// ─── RunRepository impl ──────────────────────────────────────────────────────

impl RunRepository for SqliteStore {
  type Error = Error;

  // ── Runs ──────────────────────────────────────────────────────────────────

  async fn save_run(&self, run: &Run) -> Result<()> {
    if self.run_exists(run.run_id).await? {
      return Err(Error::DuplicateRun(run.run_id));
    }

    let run_id_str = encode_uuid(run.run_id);
    let at_str     = encode_dt(run.created_at);
    let source     = run.source.clone();
    let cancelled  = run.cancelled;
    let rows       = encode_results(&run.results)?;
    let count      = rows.len();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO runs (run_id, created_at, source, cancelled) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![run_id_str, at_str, source, cancelled],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO results (
               run_id, position, identifier, is_active, record_json, verdict_json
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for r in &rows {
            stmt.execute(rusqlite::params![
              run_id_str,
              r.position,
              r.identifier,
              r.is_active,
              r.record_json,
              r.verdict_json,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    debug!(run_id = %run.run_id, results = count, "run saved");
    Ok(())
  }

  async fn get_run(&self, run_id: Uuid) -> Result<Option<Run>> {
    let id_str = encode_uuid(run_id);

    let found: Option<(RawRun, Vec<RawResult>)> = self
      .conn
      .call(move |conn| {
        let sql = format!("{RUN_SUMMARY_SQL} WHERE r.run_id = ?1 GROUP BY r.run_id");
        let Some(run) = conn
          .query_row(&sql, rusqlite::params![id_str], raw_run)
          .optional()?
        else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(
          "SELECT record_json, verdict_json FROM results
           WHERE run_id = ?1 ORDER BY position",
        )?;
        let results = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawResult {
              record_json:  row.get(0)?,
              verdict_json: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((run, results)))
      })
      .await?;

    found.map(|(run, results)| run.into_run(results)).transpose()
  }

  async fn list_runs(&self) -> Result<Vec<RunSummary>> {
    let raws: Vec<RawRun> = self
      .conn
      .call(|conn| {
        let sql = format!(
          "{RUN_SUMMARY_SQL} GROUP BY r.run_id ORDER BY r.created_at DESC, r.rowid DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], raw_run)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRun::into_summary).collect()
  }

  // ── Overrides ─────────────────────────────────────────────────────────────

  async fn load_overrides(&self) -> Result<ReconciliationStore> {
    let raws: Vec<RawOverride> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT identifier, confirmed_active, has_superseding, superseding_value
           FROM overrides",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawOverride {
              identifier:        row.get(0)?,
              confirmed_active:  row.get(1)?,
              has_superseding:   row.get(2)?,
              superseding_value: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawOverride::into_entry).collect())
  }

  async fn get_override(&self, id: &CanonicalIdentifier) -> Result<ManualOverride> {
    let id_str = id.as_str().to_owned();

    let raw = self
      .conn
      .call(move |conn| Ok(select_override(conn, &id_str)?))
      .await?;

    Ok(raw.map(|r| r.into_entry().1).unwrap_or_default())
  }

  async fn update_override(
    &self,
    id: &CanonicalIdentifier,
    change: OverrideChange,
  ) -> Result<ManualOverride> {
    let id_str = id.as_str().to_owned();
    let at_str = encode_dt(Utc::now());

    let updated = self
      .conn
      .call(move |conn| {
        // IMMEDIATE: hold the write lock from the read through the write.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut ov = select_override(&tx, &id_str)?
          .map(|r| r.into_entry().1)
          .unwrap_or_default();
        ov.apply(change);
        upsert_override(&tx, &id_str, &ov, &at_str)?;
        tx.commit()?;
        Ok(ov)
      })
      .await?;

    debug!(%id, ?updated, "override updated");
    Ok(updated)
  }

  async fn put_override(
    &self,
    id: &CanonicalIdentifier,
    ov: &ManualOverride,
  ) -> Result<()> {
    let id_str = id.as_str().to_owned();
    let ov     = ov.clone();
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| Ok(upsert_override(conn, &id_str, &ov, &at_str)?))
      .await?;
    Ok(())
  }
}

fn select_override(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<RawOverride>> {
  conn
    .query_row(
      "SELECT identifier, confirmed_active, has_superseding, superseding_value
       FROM overrides WHERE identifier = ?1",
      rusqlite::params![id],
      |row| {
        Ok(RawOverride {
          identifier:        row.get(0)?,
          confirmed_active:  row.get(1)?,
          has_superseding:   row.get(2)?,
          superseding_value: row.get(3)?,
        })
      },
    )
    .optional()
}

fn upsert_override(
  conn: &rusqlite::Connection,
  id: &str,
  ov: &ManualOverride,
  at: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO overrides (
       identifier, confirmed_active, has_superseding, superseding_value, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5)
     ON CONFLICT (identifier) DO UPDATE SET
       confirmed_active  = excluded.confirmed_active,
       has_superseding   = excluded.has_superseding,
       superseding_value = excluded.superseding_value,
       updated_at        = excluded.updated_at",
    rusqlite::params![
      id,
      ov.confirmed_active_in_registry,
      ov.has_superseding_identifier,
      ov.superseding_identifier_value,
      at
    ],
  )?;
  Ok(())
}

