//! Error types for `btw-core`.

use std::time::Duration;

use thiserror::Error;

/// Precondition failures of the engine. Per-record faults never surface here;
/// they are folded into the record's [`Verdict`](crate::verdict::Verdict).
#[derive(Debug, Error)]
pub enum Error {
  #[error("no data available to validate")]
  NoData,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A fault raised by a single registry call.
///
/// The sequencer downgrades every variant into an inactive outcome carrying
/// the `Display` text as its error message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
  #[error("{registry} lookup timed out after {}ms", .after.as_millis())]
  Timeout {
    registry: &'static str,
    after:    Duration,
  },

  #[error("{registry} unreachable: {message}")]
  Transport {
    registry: &'static str,
    message:  String,
  },

  #[error("{registry} returned an unreadable response: {message}")]
  Malformed {
    registry: &'static str,
    message:  String,
  },

  #[error("{registry} rejected the request: {message}")]
  Rejected {
    registry: &'static str,
    message:  String,
  },
}

impl LookupError {
  /// The registry that produced the fault.
  pub fn registry(&self) -> &'static str {
    match self {
      Self::Timeout { registry, .. }
      | Self::Transport { registry, .. }
      | Self::Malformed { registry, .. }
      | Self::Rejected { registry, .. } => registry,
    }
  }
}
