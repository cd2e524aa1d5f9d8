//! Export classification — the problem records that need follow-up, split
//! into those that stopped and those that continue under a new identifier.

use serde::{Deserialize, Serialize};

use crate::{reconcile::ReconciliationStore, verdict::ValidationResult};

pub const STATUS_STOPPED: &str = "fully stopped";
pub const STATUS_CONTINUED: &str = "active under new identifier";

/// A row that can be written to a sheet: fixed headers, one string per
/// header in the same order.
pub trait SheetRow {
  const HEADERS: &'static [&'static str];

  fn cells(&self) -> Vec<&str>;
}

/// A merchant whose identifier is inactive with no known successor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoppedRow {
  pub name:                String,
  pub original_identifier: String,
  pub email:               String,
  pub address:             String,
  pub kind:                String,
  pub status:              String,
}

impl SheetRow for StoppedRow {
  const HEADERS: &'static [&'static str] =
    &["Company name", "VAT number", "E-mail", "Address", "Point-of-sale type", "Status"];

  fn cells(&self) -> Vec<&str> {
    vec![
      self.name.as_str(),
      self.original_identifier.as_str(),
      self.email.as_str(),
      self.address.as_str(),
      self.kind.as_str(),
      self.status.as_str(),
    ]
  }
}

/// A merchant whose old identifier is inactive but who continues under a new
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuedRow {
  pub name:                String,
  pub original_identifier: String,
  pub new_identifier:      String,
  pub email:               String,
  pub address:             String,
  pub kind:                String,
  pub status:              String,
}

impl SheetRow for ContinuedRow {
  const HEADERS: &'static [&'static str] = &[
    "Company name",
    "Old VAT number",
    "New VAT number",
    "E-mail",
    "Address",
    "Point-of-sale type",
    "Status",
  ];

  fn cells(&self) -> Vec<&str> {
    vec![
      self.name.as_str(),
      self.original_identifier.as_str(),
      self.new_identifier.as_str(),
      self.email.as_str(),
      self.address.as_str(),
      self.kind.as_str(),
      self.status.as_str(),
    ]
  }
}

/// The two export groups, each in original result order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportGroups {
  pub stopped:   Vec<StoppedRow>,
  pub continued: Vec<ContinuedRow>,
}

impl ExportGroups {
  pub fn is_empty(&self) -> bool {
    self.stopped.is_empty() && self.continued.is_empty()
  }
}

/// Partition `results` into export groups.
///
/// Records verified active by a registry are left out. Of the rest, a
/// superseding flag puts the record in `continued`; otherwise a manual
/// registry confirmation leaves it out; everything else is `stopped`.
pub fn classify_for_export<'a, I>(
  results: I,
  overrides: &ReconciliationStore,
) -> ExportGroups
where
  I: IntoIterator<Item = &'a ValidationResult>,
{
  let mut groups = ExportGroups::default();

  for result in results {
    if result.verdict.is_active {
      continue;
    }
    let record = &result.record;
    let ov = overrides.get(&record.identifier);

    if ov.has_superseding_identifier {
      groups.continued.push(ContinuedRow {
        name:                record.name.clone(),
        original_identifier: record.original_identifier.clone(),
        new_identifier:      ov.superseding_identifier_value,
        email:               record.email.clone(),
        address:             record.address.clone(),
        kind:                record.kind.clone(),
        status:              STATUS_CONTINUED.to_owned(),
      });
    } else if !ov.confirmed_active_in_registry {
      groups.stopped.push(StoppedRow {
        name:                record.name.clone(),
        original_identifier: record.original_identifier.clone(),
        email:               record.email.clone(),
        address:             record.address.clone(),
        kind:                record.kind.clone(),
        status:              STATUS_STOPPED.to_owned(),
      });
    }
  }

  groups
}
