//! Deterministic registries for demos and tests.
//!
//! Both lookups share a small sample database. Outside it, canonical numbers
//! are decided by their last digit: `0..=2` are active in the primary
//! registry, `3..=4` only in the fallback, everything else in neither.

use std::time::Duration;

use btw_core::{
  CanonicalIdentifier, LookupError, normalize,
  address::{AddressQuery, format_address},
  lookup::{AddressMatch, AddressSearch, LookupClient, LookupOutcome},
};

struct SampleCompany {
  id:      &'static str,
  name:    &'static str,
  address: &'static str,
  status:  &'static str,
}

const SAMPLE: &[SampleCompany] = &[
  SampleCompany {
    id:      "BE0123456789",
    name:    "Bloemenwinkel Voorbeeld 1",
    address: "Teststraat 123, 1000 Brussel",
    status:  "Actief",
  },
  SampleCompany {
    id:      "BE0987654321",
    name:    "Tuincentrum Voorbeeld 2",
    address: "Demoweg 45, 2000 Antwerpen",
    status:  "Actief",
  },
];

fn sample(id: &CanonicalIdentifier) -> Option<&'static SampleCompany> {
  SAMPLE.iter().find(|c| c.id == id.as_str())
}

fn last_digit(id: &CanonicalIdentifier) -> Option<u32> {
  if !id.is_canonical() {
    return None;
  }
  id.as_str().chars().last().and_then(|c| c.to_digit(10))
}

async fn simulate_latency(delay: Duration) {
  if !delay.is_zero() {
    tokio::time::sleep(delay).await;
  }
}

// ─── Lookups ─────────────────────────────────────────────────────────────────

/// Stand-in for VIES.
#[derive(Debug, Clone, Default)]
pub struct MockVies {
  delay: Duration,
}

impl MockVies {
  pub fn new() -> Self { Self::default() }

  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }
}

impl LookupClient for MockVies {
  fn registry(&self) -> &'static str { "VIES (mock)" }

  async fn lookup(
    &self,
    id: &CanonicalIdentifier,
  ) -> Result<LookupOutcome, LookupError> {
    simulate_latency(self.delay).await;

    if let Some(c) = sample(id) {
      return Ok(LookupOutcome {
        is_active: true,
        name:      Some(c.name.to_owned()),
        address:   Some(c.address.to_owned()),
        status:    None,
      });
    }
    Ok(match last_digit(id) {
      Some(0..=2) => LookupOutcome {
        is_active: true,
        name:      Some(format!("Generated name for {id}")),
        address:   Some("Generated address".to_owned()),
        status:    None,
      },
      _ => LookupOutcome::inactive(),
    })
  }
}

/// Stand-in for the KBO number search.
#[derive(Debug, Clone, Default)]
pub struct MockKbo {
  delay: Duration,
}

impl MockKbo {
  pub fn new() -> Self { Self::default() }

  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }
}

impl LookupClient for MockKbo {
  fn registry(&self) -> &'static str { "KBO (mock)" }

  async fn lookup(
    &self,
    id: &CanonicalIdentifier,
  ) -> Result<LookupOutcome, LookupError> {
    simulate_latency(self.delay).await;

    if let Some(c) = sample(id) {
      return Ok(LookupOutcome {
        is_active: true,
        name:      Some(c.name.to_owned()),
        address:   Some(c.address.to_owned()),
        status:    Some(c.status.to_owned()),
      });
    }
    Ok(match last_digit(id) {
      Some(3..=4) => LookupOutcome {
        is_active: true,
        name:      Some(format!("KBO name for {id}")),
        address:   None,
        status:    Some("Actief".to_owned()),
      },
      _ => LookupOutcome::inactive(),
    })
  }
}

// ─── Address search ──────────────────────────────────────────────────────────

/// Returns two active enterprises at any address with a street and postal
/// code, numbered from the postal code so repeated searches agree.
#[derive(Debug, Clone, Default)]
pub struct MockAddressSearch;

impl AddressSearch for MockAddressSearch {
  async fn search(
    &self,
    query: &AddressQuery,
  ) -> Result<Vec<AddressMatch>, LookupError> {
    let street = query.street.trim();
    let postal_code = query.postal_code.trim();
    if street.is_empty() || postal_code.is_empty() {
      return Ok(Vec::new());
    }
    let area: u32 = postal_code.parse().unwrap_or(0) % 10_000;

    Ok(
      (1..=2u32)
        .map(|i| {
          let identifier = normalize(&format!("0{area:04}{:05}", i * 7));
          let registry_number = identifier.enterprise_number().unwrap_or_default();
          AddressMatch {
            name: format!("Company at {street} #{i}"),
            address: format_address(
              &format!("{street} {}", i * 2 - 1),
              postal_code,
              query.city.trim(),
            ),
            status: "Actief".to_owned(),
            kind: (if i == 1 { "Rechtspersoon" } else { "Natuurlijk persoon" }).to_owned(),
            identifier,
            registry_number,
          }
        })
        .collect(),
    )
  }
}
