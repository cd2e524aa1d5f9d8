//! File formats at the edges of a validation run.
//!
//! - [`delimited`] reads the merchant list (CSV with `;`, `,` or tab
//!   separators, UTF-8 or Windows-1252) into [`RawRecord`]s.
//! - [`xlsx`] writes the export groups to a workbook, one sheet per group.
//!
//! Pure synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use btw_core::record::{ColumnMap, parse_records};
//!
//! let rows = btw_io::read_path("merchants.csv".as_ref()).unwrap();
//! let records = parse_records(&rows, &ColumnMap::default());
//! println!("{} records", records.len());
//! ```
//!
//! [`RawRecord`]: btw_core::record::RawRecord

pub mod delimited;
pub mod error;
pub mod xlsx;

pub use delimited::{read_path, read_str};
pub use error::{Error, Result};
