//! Registry capabilities consumed by the engine.
//!
//! The traits are implemented by `btw-registry` (HTTP clients for VIES and
//! KBO, plus deterministic mocks). The engine never knows how a result was
//! obtained, only its shape.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{address::AddressQuery, error::LookupError, identifier::CanonicalIdentifier};

// ─── Lookup ──────────────────────────────────────────────────────────────────

/// What one registry knows about one identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOutcome {
  pub is_active: bool,
  pub name:      Option<String>,
  pub address:   Option<String>,
  /// Registry status text, verbatim.
  pub status:    Option<String>,
}

impl LookupOutcome {
  /// Not registered, or registered but not active.
  pub fn inactive() -> Self { Self::default() }
}

/// A registry that can say whether an identifier is active.
///
/// Implementations must not retry or fall back on their own; sequencing and
/// fault isolation belong to [`Sequencer`](crate::sequencer::Sequencer).
pub trait LookupClient: Send + Sync {
  /// Short registry name used in logs and error messages.
  fn registry(&self) -> &'static str;

  /// Returns a fault for transport or parse failures; "not found" and
  /// "stopped" are both `Ok` with `is_active == false`.
  fn lookup(
    &self,
    id: &CanonicalIdentifier,
  ) -> impl Future<Output = Result<LookupOutcome, LookupError>> + Send;
}

// ─── Address search ──────────────────────────────────────────────────────────

/// One enterprise registered at a searched address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressMatch {
  /// Normalised VAT identifier for the enterprise.
  pub identifier:      CanonicalIdentifier,
  /// Registry spelling of the number, e.g. `0123.456.789`.
  pub registry_number: String,
  pub status:          String,
  pub name:            String,
  pub address:         String,
  /// Legal form, e.g. "Rechtspersoon".
  pub kind:            String,
}

/// Search a registry for enterprises at an address.
///
/// Not used by the engine itself; the chosen match flows back through
/// [`ReconciliationStore::adopt_superseding`](crate::reconcile::ReconciliationStore::adopt_superseding).
pub trait AddressSearch: Send + Sync {
  fn search(
    &self,
    query: &AddressQuery,
  ) -> impl Future<Output = Result<Vec<AddressMatch>, LookupError>> + Send;
}
