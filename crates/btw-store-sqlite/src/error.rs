//! Error type for `btw-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A run id was saved twice.
  #[error("run already exists: {0}")]
  DuplicateRun(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
