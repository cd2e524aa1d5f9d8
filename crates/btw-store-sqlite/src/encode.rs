//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase. Records and
//! verdicts are stored as compact JSON.

use btw_core::{
  identifier::CanonicalIdentifier,
  reconcile::ManualOverride,
  record::ParsedRecord,
  store::{Run, RunSummary},
  verdict::{ValidationResult, Verdict},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// Column values for one `results` row, ready to bind.
pub struct EncodedResult {
  pub position:     i64,
  pub identifier:   String,
  pub is_active:    bool,
  pub record_json:  String,
  pub verdict_json: String,
}

pub fn encode_results(results: &[ValidationResult]) -> Result<Vec<EncodedResult>> {
  results
    .iter()
    .enumerate()
    .map(|(i, r)| {
      Ok(EncodedResult {
        position:     i as i64,
        identifier:   r.record.identifier.as_str().to_owned(),
        is_active:    r.verdict.is_active,
        record_json:  serde_json::to_string(&r.record)?,
        verdict_json: serde_json::to_string(&r.verdict)?,
      })
    })
    .collect()
}

/// Raw strings read from a `results` row.
pub struct RawResult {
  pub record_json:  String,
  pub verdict_json: String,
}

impl RawResult {
  pub fn into_result(self) -> Result<ValidationResult> {
    let record: ParsedRecord = serde_json::from_str(&self.record_json)?;
    let verdict: Verdict = serde_json::from_str(&self.verdict_json)?;
    Ok(ValidationResult { record, verdict })
  }
}

// ─── Runs ────────────────────────────────────────────────────────────────────

/// Raw values read from a `runs` row, optionally with aggregate counts.
pub struct RawRun {
  pub run_id:       String,
  pub created_at:   String,
  pub source:       Option<String>,
  pub cancelled:    bool,
  pub total:        i64,
  pub active_count: i64,
}

impl RawRun {
  pub fn into_summary(self) -> Result<RunSummary> {
    Ok(RunSummary {
      run_id:       decode_uuid(&self.run_id)?,
      created_at:   decode_dt(&self.created_at)?,
      source:       self.source,
      cancelled:    self.cancelled,
      total:        self.total as usize,
      active_count: self.active_count as usize,
    })
  }

  pub fn into_run(self, results: Vec<RawResult>) -> Result<Run> {
    Ok(Run {
      run_id:     decode_uuid(&self.run_id)?,
      created_at: decode_dt(&self.created_at)?,
      source:     self.source,
      cancelled:  self.cancelled,
      results:    results
        .into_iter()
        .map(RawResult::into_result)
        .collect::<Result<_>>()?,
    })
  }
}

// ─── Overrides ───────────────────────────────────────────────────────────────

/// Raw values read from an `overrides` row.
pub struct RawOverride {
  pub identifier:        String,
  pub confirmed_active:  bool,
  pub has_superseding:   bool,
  pub superseding_value: String,
}

impl RawOverride {
  pub fn into_entry(self) -> (CanonicalIdentifier, ManualOverride) {
    (
      CanonicalIdentifier::from_normalized(self.identifier),
      ManualOverride {
        confirmed_active_in_registry: self.confirmed_active,
        has_superseding_identifier:   self.has_superseding,
        superseding_identifier_value: self.superseding_value,
      },
    )
  }
}
