//! Sequential batch validation with progress reporting and cooperative
//! cancellation.

use std::{any::Any, panic::AssertUnwindSafe, time::Duration};

use futures::FutureExt as _;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
  Error, Result,
  lookup::LookupClient,
  record::ParsedRecord,
  sequencer::{DEFAULT_LOOKUP_TIMEOUT, Sequencer},
  verdict::{ValidationResult, Verdict},
};

// ─── Options ─────────────────────────────────────────────────────────────────

/// Pacing knobs for a run, deserialised from the `[batch]` config section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
  /// Upper bound on each registry call.
  pub lookup_timeout_ms: u64,
  /// Pause between records, to stay under registry rate limits.
  pub pause_ms:          u64,
}

impl Default for BatchOptions {
  fn default() -> Self {
    Self {
      lookup_timeout_ms: DEFAULT_LOOKUP_TIMEOUT.as_millis() as u64,
      pause_ms:          100,
    }
  }
}

impl BatchOptions {
  pub fn lookup_timeout(&self) -> Duration {
    Duration::from_millis(self.lookup_timeout_ms)
  }

  pub fn pause(&self) -> Duration { Duration::from_millis(self.pause_ms) }
}

// ─── Progress & report ───────────────────────────────────────────────────────

/// Reported after every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
  pub processed: usize,
  pub total:     usize,
}

impl Progress {
  pub fn is_complete(&self) -> bool { self.processed == self.total }
}

/// The outcome of a run. `results[i]` belongs to input record `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
  pub results:   Vec<ValidationResult>,
  /// `true` when the run stopped early; `results` then holds only the
  /// records completed before cancellation.
  pub cancelled: bool,
}

// ─── Runner ──────────────────────────────────────────────────────────────────

/// Validate `records` one at a time, in order.
///
/// `progress` is invoked after each record with a strictly increasing
/// `processed` count. `cancel` is checked before each record; a lookup that
/// is already in flight is allowed to finish.
///
/// Only an empty input is an error ([`Error::NoData`]). Every per-record
/// fault, including a panic inside a lookup client, is captured as an
/// inactive result for that record and the run continues.
pub async fn run_batch<P, F, R>(
  records: &[ParsedRecord],
  sequencer: &Sequencer<P, F>,
  options: &BatchOptions,
  cancel: &CancellationToken,
  mut progress: R,
) -> Result<BatchReport>
where
  P: LookupClient,
  F: LookupClient,
  R: FnMut(Progress) + Send,
{
  if records.is_empty() {
    return Err(Error::NoData);
  }

  let total = records.len();
  let pause = options.pause();
  let mut results = Vec::with_capacity(total);
  info!(total, "validation run started");

  for (index, record) in records.iter().enumerate() {
    if index > 0 && !pause.is_zero() {
      tokio::select! {
        _ = cancel.cancelled() => {}
        _ = tokio::time::sleep(pause) => {}
      }
    }
    if cancel.is_cancelled() {
      info!(processed = index, total, "validation run cancelled");
      return Ok(BatchReport { results, cancelled: true });
    }

    let verdict = match AssertUnwindSafe(sequencer.validate(&record.identifier))
      .catch_unwind()
      .await
    {
      Ok(verdict) => verdict,
      Err(panic) => {
        let message = panic_message(panic.as_ref());
        error!(id = %record.identifier, %message, "record validation panicked");
        Verdict::inactive(format!("validation failed: {message}"))
      }
    };

    results.push(ValidationResult { record: record.clone(), verdict });
    progress(Progress { processed: index + 1, total });
  }

  info!(total, "validation run finished");
  Ok(BatchReport { results, cancelled: false })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(s) = payload.downcast_ref::<&str>() {
    (*s).to_owned()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "unknown fault".to_owned()
  }
}
