//! Verdicts — the outcome of validating one identifier — and the result
//! records that pair them with their input.

use serde::{Deserialize, Serialize};

use crate::{lookup::LookupOutcome, record::ParsedRecord};

/// Fallback message when neither registry resolved and neither raised.
pub const NOT_ACTIVE_MESSAGE: &str = "identifier not active in either registry";

/// Which registry resolved an identifier as active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
  Primary,
  Fallback,
  None,
}

/// Registry details accompanying an active verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Details {
  pub name:    Option<String>,
  pub address: Option<String>,
  pub status:  Option<String>,
}

impl From<LookupOutcome> for Details {
  fn from(o: LookupOutcome) -> Self {
    Self { name: o.name, address: o.address, status: o.status }
  }
}

/// The automated verdict for one identifier. Created once per record per
/// run; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
  pub is_active:   bool,
  pub details:     Option<Details>,
  pub resolved_by: Source,
  pub error:       Option<String>,
}

impl Verdict {
  pub fn active(source: Source, details: Details) -> Self {
    Self {
      is_active:   true,
      details:     Some(details),
      resolved_by: source,
      error:       None,
    }
  }

  pub fn inactive(error: impl Into<String>) -> Self {
    Self {
      is_active:   false,
      details:     None,
      resolved_by: Source::None,
      error:       Some(error.into()),
    }
  }
}

/// A parsed record together with its verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
  pub record:  ParsedRecord,
  pub verdict: Verdict,
}
