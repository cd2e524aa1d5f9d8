//! Scripted lookup clients for unit tests.

use std::{
  collections::{HashMap, HashSet},
  sync::atomic::{AtomicUsize, Ordering},
  time::Duration,
};

use crate::{
  error::LookupError,
  identifier::CanonicalIdentifier,
  lookup::{LookupClient, LookupOutcome},
};

/// A lookup client answering from fixed tables and counting its calls.
pub struct FakeLookup {
  name:     &'static str,
  active:   HashMap<String, String>,
  failing:  HashSet<String>,
  panicking: HashSet<String>,
  delay:    Option<Duration>,
  calls:    AtomicUsize,
}

impl FakeLookup {
  pub fn new(name: &'static str) -> Self {
    Self {
      name,
      active: HashMap::new(),
      failing: HashSet::new(),
      panicking: HashSet::new(),
      delay: None,
      calls: AtomicUsize::new(0),
    }
  }

  /// Report `id` as active under `company`.
  pub fn active(mut self, id: &str, company: &str) -> Self {
    self.active.insert(id.to_owned(), company.to_owned());
    self
  }

  /// Return a transport fault for `id`.
  pub fn failing(mut self, id: &str) -> Self {
    self.failing.insert(id.to_owned());
    self
  }

  /// Panic when asked about `id`.
  pub fn panicking(mut self, id: &str) -> Self {
    self.panicking.insert(id.to_owned());
    self
  }

  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = Some(delay);
    self
  }

  pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

impl LookupClient for FakeLookup {
  fn registry(&self) -> &'static str { self.name }

  async fn lookup(
    &self,
    id: &CanonicalIdentifier,
  ) -> Result<LookupOutcome, LookupError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }
    if self.panicking.contains(id.as_str()) {
      panic!("scripted panic for {id}");
    }
    if self.failing.contains(id.as_str()) {
      return Err(LookupError::Transport {
        registry: self.name,
        message:  "connection reset".to_owned(),
      });
    }
    Ok(match self.active.get(id.as_str()) {
      Some(company) => LookupOutcome {
        is_active: true,
        name:      Some(company.clone()),
        address:   None,
        status:    Some("Active".to_owned()),
      },
      None => LookupOutcome::inactive(),
    })
  }
}
