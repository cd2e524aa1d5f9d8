//! Error types for reading input tables and writing export workbooks.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("malformed input table: {0}")]
  Csv(#[from] csv::Error),

  #[error("input table has no header row")]
  MissingHeader,

  #[error("workbook error: {0}")]
  Xlsx(#[from] rust_xlsxwriter::XlsxError),

  #[error("nothing to export: both groups are empty")]
  NothingToExport,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
