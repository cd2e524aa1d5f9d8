//! Error type for `btw-registry`.

use std::time::Duration;

use btw_core::LookupError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("unexpected status {0}")]
  Status(reqwest::StatusCode),

  #[error("invalid registry url: {0}")]
  Url(String),

  #[error("registry reported: {0}")]
  Service(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  /// Convert into the engine's fault type, attributing it to `registry`.
  ///
  /// `timeout` is the configured request timeout, reported when the HTTP
  /// client gave up waiting.
  pub fn into_lookup_error(
    self,
    registry: &'static str,
    timeout: Duration,
  ) -> LookupError {
    match self {
      Error::Http(e) if e.is_timeout() => {
        LookupError::Timeout { registry, after: timeout }
      }
      Error::Http(e) if e.is_decode() => {
        LookupError::Malformed { registry, message: e.to_string() }
      }
      Error::Http(e) => LookupError::Transport { registry, message: e.to_string() },
      Error::Status(status) => LookupError::Rejected {
        registry,
        message: format!("HTTP {status}"),
      },
      Error::Url(message) => LookupError::Rejected { registry, message },
      Error::Service(message) => LookupError::Rejected { registry, message },
    }
  }
}
