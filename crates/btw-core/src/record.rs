//! Input rows and the parsed records derived from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  address::format_address,
  identifier::{CanonicalIdentifier, normalize},
};

/// Placeholder used when a row carries no company name.
pub const UNKNOWN_NAME: &str = "Unknown";

// ─── RawRecord ───────────────────────────────────────────────────────────────

/// One tokenised input row: column label → cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(BTreeMap<String, String>);

impl RawRecord {
  pub fn new(cells: BTreeMap<String, String>) -> Self { Self(cells) }

  /// The cell under `label`, if present and not blank.
  pub fn get(&self, label: &str) -> Option<&str> {
    self
      .0
      .get(label)
      .map(String::as_str)
      .filter(|v| !v.trim().is_empty())
  }

  /// The first non-blank cell among `labels`, in the given order.
  pub fn first_of<'a, I>(&'a self, labels: I) -> Option<&'a str>
  where
    I: IntoIterator<Item = &'a String>,
  {
    labels.into_iter().find_map(|label| self.get(label))
  }

  pub fn cells(&self) -> &BTreeMap<String, String> { &self.0 }
}

impl<K, V> FromIterator<(K, V)> for RawRecord
where
  K: Into<String>,
  V: Into<String>,
{
  fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

// ─── ColumnMap ───────────────────────────────────────────────────────────────

/// Which column labels hold which field. Each field lists every accepted
/// spelling; the first one present with a value wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
  pub identifier:  Vec<String>,
  pub name:        Vec<String>,
  pub email:       Vec<String>,
  pub street:      Vec<String>,
  pub postal_code: Vec<String>,
  pub city:        Vec<String>,
  pub kind:        Vec<String>,
}

fn labels(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| (*s).to_owned()).collect()
}

impl Default for ColumnMap {
  fn default() -> Self {
    Self {
      identifier:  labels(&["BTW nummer", "BTW nummer\t", "BTW Nummer", "BTW-nummer"]),
      name:        labels(&["Bedrijfsnaam"]),
      email:       labels(&["E-mail", "e-mailadres"]),
      street:      labels(&["Straat + huisnummer"]),
      postal_code: labels(&["Postcode"]),
      city:        labels(&["Gemeente"]),
      kind:        labels(&["Type verkooppunt"]),
    }
  }
}

// ─── ParsedRecord ────────────────────────────────────────────────────────────

/// A row after intake: the fields the workflow cares about plus the
/// normalised identifier. Immutable for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRecord {
  /// The identifier exactly as it appeared in the file (trimmed).
  pub original_identifier: String,
  pub identifier:          CanonicalIdentifier,
  pub name:                String,
  pub email:               String,
  /// `"street, postal_code city"`, or empty when incomplete.
  pub address:             String,
  /// Merchant type (point-of-sale category).
  pub kind:                String,
}

impl ParsedRecord {
  /// Build a record from a raw row, or `None` when the row has no
  /// identifier in any of the accepted columns.
  pub fn from_raw(row: &RawRecord, columns: &ColumnMap) -> Option<Self> {
    let original = row.first_of(&columns.identifier)?.trim().to_owned();
    let field = |labels: &Vec<String>| {
      row.first_of(labels).map(str::trim).unwrap_or_default().to_owned()
    };

    Some(Self {
      identifier:          normalize(&original),
      original_identifier: original,
      name:                row
        .first_of(&columns.name)
        .map(|s| s.trim().to_owned())
        .unwrap_or_else(|| UNKNOWN_NAME.to_owned()),
      email:               field(&columns.email),
      address:             format_address(
        &field(&columns.street),
        &field(&columns.postal_code),
        &field(&columns.city),
      ),
      kind:                field(&columns.kind),
    })
  }
}

/// Parse every row that carries an identifier, preserving input order.
pub fn parse_records<'a, I>(rows: I, columns: &ColumnMap) -> Vec<ParsedRecord>
where
  I: IntoIterator<Item = &'a RawRecord>,
{
  rows
    .into_iter()
    .filter_map(|row| ParsedRecord::from_raw(row, columns))
    .collect()
}
