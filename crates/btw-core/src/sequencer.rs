//! Primary-then-fallback validation of a single identifier.

use std::time::Duration;

use tracing::{debug, warn};

use crate::{
  error::LookupError,
  identifier::CanonicalIdentifier,
  lookup::{LookupClient, LookupOutcome},
  verdict::{NOT_ACTIVE_MESSAGE, Source, Verdict},
};

/// Upper bound on a single registry call unless configured otherwise.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(20);

/// Validates identifiers against a primary registry, consulting the fallback
/// only when the primary does not report the identifier as active.
///
/// The two registries are always called one after the other, never
/// concurrently. A fault or timeout from either one is downgraded to an
/// inactive outcome; `validate` itself cannot fail.
#[derive(Debug, Clone)]
pub struct Sequencer<P, F> {
  primary:  P,
  fallback: F,
  timeout:  Duration,
}

impl<P, F> Sequencer<P, F>
where
  P: LookupClient,
  F: LookupClient,
{
  pub fn new(primary: P, fallback: F) -> Self {
    Self { primary, fallback, timeout: DEFAULT_LOOKUP_TIMEOUT }
  }

  /// Bound each individual registry call by `timeout`.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn primary(&self) -> &P { &self.primary }

  pub fn fallback(&self) -> &F { &self.fallback }

  pub fn timeout(&self) -> Duration { self.timeout }

  /// Produce the verdict for `id`.
  pub async fn validate(&self, id: &CanonicalIdentifier) -> Verdict {
    let mut last_error = None;

    match guarded_lookup(&self.primary, id, self.timeout).await {
      Ok(outcome) if outcome.is_active => {
        debug!(%id, registry = self.primary.registry(), "resolved by primary");
        return Verdict::active(Source::Primary, outcome.into());
      }
      Ok(_) => {}
      Err(e) => last_error = Some(e.to_string()),
    }

    match guarded_lookup(&self.fallback, id, self.timeout).await {
      Ok(outcome) if outcome.is_active => {
        debug!(%id, registry = self.fallback.registry(), "resolved by fallback");
        return Verdict::active(Source::Fallback, outcome.into());
      }
      Ok(_) => {}
      Err(e) => last_error = Some(e.to_string()),
    }

    debug!(%id, "not active in either registry");
    Verdict::inactive(last_error.unwrap_or_else(|| NOT_ACTIVE_MESSAGE.to_owned()))
  }
}

/// Call `client`, converting an elapsed timeout into a [`LookupError`].
async fn guarded_lookup<C: LookupClient>(
  client: &C,
  id: &CanonicalIdentifier,
  timeout: Duration,
) -> Result<LookupOutcome, LookupError> {
  let result = match tokio::time::timeout(timeout, client.lookup(id)).await {
    Ok(result) => result,
    Err(_) => Err(LookupError::Timeout { registry: client.registry(), after: timeout }),
  };
  if let Err(e) = &result {
    warn!(%id, registry = client.registry(), error = %e, "lookup fault downgraded to inactive");
  }
  result
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;
  use crate::{identifier::normalize, testing::FakeLookup};

  fn id() -> CanonicalIdentifier { normalize("0123456789") }

  #[tokio::test]
  async fn primary_active_skips_fallback() {
    let primary = FakeLookup::new("primary").active("BE0123456789", "Acme");
    let fallback = FakeLookup::new("fallback").active("BE0123456789", "Other");
    let seq = Sequencer::new(primary, fallback);

    let verdict = seq.validate(&id()).await;

    assert!(verdict.is_active);
    assert_eq!(verdict.resolved_by, Source::Primary);
    assert_eq!(verdict.details.unwrap().name.as_deref(), Some("Acme"));
    assert_eq!(seq.primary().calls(), 1);
    assert_eq!(seq.fallback().calls(), 0);
  }

  #[tokio::test]
  async fn primary_inactive_fallback_active() {
    let primary = FakeLookup::new("primary");
    let fallback = FakeLookup::new("fallback").active("BE0123456789", "Acme");
    let seq = Sequencer::new(primary, fallback);

    let verdict = seq.validate(&id()).await;

    assert!(verdict.is_active);
    assert_eq!(verdict.resolved_by, Source::Fallback);
    assert!(verdict.error.is_none());
    assert_eq!(seq.primary().calls(), 1);
    assert_eq!(seq.fallback().calls(), 1);
  }

  #[tokio::test]
  async fn neither_active_uses_default_message() {
    let seq = Sequencer::new(FakeLookup::new("primary"), FakeLookup::new("fallback"));

    let verdict = seq.validate(&id()).await;

    assert!(!verdict.is_active);
    assert_eq!(verdict.resolved_by, Source::None);
    assert!(verdict.details.is_none());
    assert_eq!(verdict.error.as_deref(), Some(NOT_ACTIVE_MESSAGE));
  }

  #[tokio::test]
  async fn primary_fault_falls_through_to_fallback() {
    let primary = FakeLookup::new("primary").failing("BE0123456789");
    let fallback = FakeLookup::new("fallback").active("BE0123456789", "Acme");
    let seq = Sequencer::new(primary, fallback);

    let verdict = seq.validate(&id()).await;

    assert!(verdict.is_active);
    assert_eq!(verdict.resolved_by, Source::Fallback);
  }

  #[tokio::test]
  async fn last_error_message_is_kept() {
    let primary = FakeLookup::new("primary").failing("BE0123456789");
    let seq = Sequencer::new(primary, FakeLookup::new("fallback"));

    let verdict = seq.validate(&id()).await;

    assert!(!verdict.is_active);
    let error = verdict.error.unwrap();
    assert!(error.contains("primary"), "unexpected error: {error}");
  }

  #[tokio::test(start_paused = true)]
  async fn slow_lookup_times_out() {
    let primary = FakeLookup::new("primary")
      .active("BE0123456789", "Acme")
      .with_delay(Duration::from_secs(60));
    let seq = Sequencer::new(primary, FakeLookup::new("fallback"))
      .with_timeout(Duration::from_secs(1));

    let verdict = seq.validate(&id()).await;

    assert!(!verdict.is_active);
    assert!(verdict.error.unwrap().contains("timed out"));
    assert_eq!(seq.fallback().calls(), 1);
  }
}
