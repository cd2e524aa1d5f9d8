//! Manual reconciliation — user overrides layered on top of automated
//! verdicts.
//!
//! Overrides are keyed by [`CanonicalIdentifier`] and owned by the
//! [`ReconciliationStore`]. The final classification of a record is never
//! stored; [`classify`] recomputes it from the verdict and the current
//! override on every read.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
  identifier::CanonicalIdentifier,
  verdict::{Source, Verdict},
};

// ─── ManualOverride ──────────────────────────────────────────────────────────

/// A user's corrections for one identifier.
///
/// `has_superseding_identifier` and `superseding_identifier_value` are
/// independent: a value may be staged before the flag is ticked, and only the
/// flag affects classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualOverride {
  /// The user checked the registry by hand and found the identifier active.
  pub confirmed_active_in_registry: bool,
  /// The merchant continues under a different identifier.
  pub has_superseding_identifier:   bool,
  pub superseding_identifier_value: String,
}

impl ManualOverride {
  /// `true` when this override carries no information.
  pub fn is_default(&self) -> bool { *self == Self::default() }

  /// Apply one user edit in place. Each change touches only the fields it
  /// names.
  pub fn apply(&mut self, change: OverrideChange) {
    match change {
      OverrideChange::ToggleConfirmed => {
        self.confirmed_active_in_registry = !self.confirmed_active_in_registry;
      }
      OverrideChange::ToggleSuperseding => {
        self.has_superseding_identifier = !self.has_superseding_identifier;
      }
      OverrideChange::SetValue(value) => self.superseding_identifier_value = value,
      OverrideChange::Adopt(value) => {
        self.has_superseding_identifier = true;
        self.superseding_identifier_value = value;
      }
    }
  }
}

/// A single user edit to one override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideChange {
  /// Flip `confirmed_active_in_registry`.
  ToggleConfirmed,
  /// Flip `has_superseding_identifier`; the staged value is left alone.
  ToggleSuperseding,
  /// Stage the superseding identifier text without touching the flag.
  SetValue(String),
  /// Set the flag and the value together, as when a match from an address
  /// search is picked.
  Adopt(String),
}

// ─── Final classification ────────────────────────────────────────────────────

/// Why a record counts as active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveReason {
  /// The named registry reported it active.
  Verified(Source),
  /// The user confirmed it in the registry.
  ConfirmedInRegistry,
  /// The merchant continues under a superseding identifier.
  Superseded,
}

/// The computed status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum FinalStatus {
  Active(ActiveReason),
  Stopped,
}

impl FinalStatus {
  pub fn is_active(&self) -> bool { matches!(self, Self::Active(_)) }
}

/// Combine an automated verdict with the override for the same identifier.
///
/// Active if any of the three signals says so; there is no override that can
/// force an active verdict to inactive.
pub fn classify(verdict: &Verdict, ov: &ManualOverride) -> FinalStatus {
  if verdict.is_active {
    FinalStatus::Active(ActiveReason::Verified(verdict.resolved_by))
  } else if ov.confirmed_active_in_registry {
    FinalStatus::Active(ActiveReason::ConfirmedInRegistry)
  } else if ov.has_superseding_identifier {
    FinalStatus::Active(ActiveReason::Superseded)
  } else {
    FinalStatus::Stopped
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// All manual overrides of a session.
///
/// Every operation is total: identifiers never seen in a run are accepted
/// and simply get a fresh default override on first write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReconciliationStore {
  overrides: HashMap<CanonicalIdentifier, ManualOverride>,
}

impl ReconciliationStore {
  pub fn new() -> Self { Self::default() }

  /// The override for `id`, or an all-false default.
  pub fn get(&self, id: &CanonicalIdentifier) -> ManualOverride {
    self.overrides.get(id).cloned().unwrap_or_default()
  }

  /// Apply `change` to the override for `id`; returns the updated override.
  pub fn apply(
    &mut self,
    id: &CanonicalIdentifier,
    change: OverrideChange,
  ) -> &ManualOverride {
    let ov = self.entry(id);
    ov.apply(change);
    ov
  }

  /// Flip `confirmed_active_in_registry`; returns the updated override.
  pub fn toggle_confirmed_active(
    &mut self,
    id: &CanonicalIdentifier,
  ) -> &ManualOverride {
    self.apply(id, OverrideChange::ToggleConfirmed)
  }

  /// Flip `has_superseding_identifier`; the staged value is left alone.
  pub fn toggle_superseding_flag(
    &mut self,
    id: &CanonicalIdentifier,
  ) -> &ManualOverride {
    self.apply(id, OverrideChange::ToggleSuperseding)
  }

  /// Stage the superseding identifier text without touching the flag.
  pub fn set_superseding_value(
    &mut self,
    id: &CanonicalIdentifier,
    value: impl Into<String>,
  ) -> &ManualOverride {
    self.apply(id, OverrideChange::SetValue(value.into()))
  }

  /// Record that the merchant continues as `value`: sets the flag and the
  /// value together. Used when the user picks a match from an address search.
  pub fn adopt_superseding(
    &mut self,
    id: &CanonicalIdentifier,
    value: impl Into<String>,
  ) -> &ManualOverride {
    self.apply(id, OverrideChange::Adopt(value.into()))
  }

  /// Replace the override for `id` wholesale, e.g. when restoring from
  /// storage.
  pub fn insert(&mut self, id: CanonicalIdentifier, ov: ManualOverride) {
    self.overrides.insert(id, ov);
  }

  /// The final status of a record with this verdict.
  pub fn final_status(
    &self,
    id: &CanonicalIdentifier,
    verdict: &Verdict,
  ) -> FinalStatus {
    match self.overrides.get(id) {
      Some(ov) => classify(verdict, ov),
      None => classify(verdict, &ManualOverride::default()),
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = (&CanonicalIdentifier, &ManualOverride)> {
    self.overrides.iter()
  }

  pub fn len(&self) -> usize { self.overrides.len() }

  pub fn is_empty(&self) -> bool { self.overrides.is_empty() }

  fn entry(&mut self, id: &CanonicalIdentifier) -> &mut ManualOverride {
    self.overrides.entry(id.clone()).or_default()
  }
}

impl FromIterator<(CanonicalIdentifier, ManualOverride)> for ReconciliationStore {
  fn from_iter<T: IntoIterator<Item = (CanonicalIdentifier, ManualOverride)>>(
    iter: T,
  ) -> Self {
    Self { overrides: iter.into_iter().collect() }
  }
}
