//! Async client for the EU VIES VAT-number check.

use std::time::Duration;

use btw_core::{
  CanonicalIdentifier, LookupError,
  lookup::{LookupClient, LookupOutcome},
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, RegistryConfig, Result};

pub const REGISTRY: &str = "VIES";

/// VIES answers `userError` with one of these when it actually checked the
/// number; anything else means the member-state service was unavailable.
const DEFINITIVE_ANSWERS: &[&str] = &["VALID", "INVALID"];

/// Placeholder VIES uses for undisclosed trader details.
const UNDISCLOSED: &str = "---";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckRequest<'a> {
  country_code: &'a str,
  vat_number:   &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckResponse {
  #[serde(default)]
  valid:      bool,
  name:       Option<String>,
  address:    Option<String>,
  user_error: Option<String>,
}

/// Primary registry: the EU VIES REST service.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ViesClient {
  client:  Client,
  url:     String,
  timeout: Duration,
}

impl ViesClient {
  pub fn new(config: &RegistryConfig) -> Result<Self> {
    Ok(Self {
      client:  config.http_client()?,
      url:     config.vies_url.clone(),
      timeout: config.timeout(),
    })
  }

  /// `POST <vies_url>` with `{"countryCode", "vatNumber"}`.
  pub async fn check(&self, id: &CanonicalIdentifier) -> Result<LookupOutcome> {
    let (country_code, vat_number) = split_identifier(id);
    debug!(%id, "querying VIES");

    let resp = self
      .client
      .post(&self.url)
      .json(&CheckRequest { country_code, vat_number })
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(Error::Status(resp.status()));
    }
    let body: CheckResponse = resp.json().await?;

    if !body.valid
      && let Some(code) = body.user_error.as_deref()
      && !DEFINITIVE_ANSWERS.contains(&code)
    {
      return Err(Error::Service(code.to_owned()));
    }

    Ok(LookupOutcome {
      is_active: body.valid,
      name:      disclosed(body.name),
      address:   disclosed(body.address),
      status:    None,
    })
  }
}

impl LookupClient for ViesClient {
  fn registry(&self) -> &'static str { REGISTRY }

  async fn lookup(
    &self,
    id: &CanonicalIdentifier,
  ) -> Result<LookupOutcome, LookupError> {
    self
      .check(id)
      .await
      .map_err(|e| e.into_lookup_error(REGISTRY, self.timeout))
  }
}

/// Split into the two-letter country code and the rest. Non-canonical keys
/// are split the same way and left for VIES to reject.
fn split_identifier(id: &CanonicalIdentifier) -> (&str, &str) {
  let s = id.as_str();
  let at = s.char_indices().nth(2).map_or(s.len(), |(i, _)| i);
  s.split_at(at)
}

fn disclosed(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty() && v != UNDISCLOSED)
}
