//! Async client for the KBO (Crossroads Bank for Enterprises) public search.

use std::time::Duration;

use btw_core::{
  CanonicalIdentifier, LookupError,
  lookup::{LookupClient, LookupOutcome},
};
use reqwest::Client;
use tracing::debug;

use crate::{
  Error, RegistryConfig, Result,
  html::grid_rows,
  status::{KeywordStatus, StatusInterpreter},
};

pub const REGISTRY: &str = "KBO";

/// Fallback registry: scrapes the KBO search-by-number page.
///
/// The result grid has the enterprise name in row 2 and the status in row 3
/// (second cell each). A grid with only a header row means the number is not
/// registered.
#[derive(Clone)]
pub struct KboClient<S = KeywordStatus> {
  client:  Client,
  url:     String,
  timeout: Duration,
  status:  S,
}

impl KboClient<KeywordStatus> {
  pub fn new(config: &RegistryConfig) -> Result<Self> {
    Self::with_interpreter(config, KeywordStatus::default())
  }
}

impl<S: StatusInterpreter> KboClient<S> {
  pub fn with_interpreter(config: &RegistryConfig, status: S) -> Result<Self> {
    Ok(Self {
      client: config.http_client()?,
      url: config.kbo_url.clone(),
      timeout: config.timeout(),
      status,
    })
  }

  /// `GET <kbo_url>?nummer=0123.456.789&actionLu=Zoek`
  pub async fn check(&self, id: &CanonicalIdentifier) -> Result<LookupOutcome> {
    let number = id
      .enterprise_number()
      .unwrap_or_else(|| id.as_str().replacen(btw_core::identifier::COUNTRY_PREFIX, "", 1));
    debug!(%id, %number, "querying KBO");

    let resp = self
      .client
      .get(&self.url)
      .query(&[("nummer", number.as_str()), ("actionLu", "Zoek")])
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(Error::Status(resp.status()));
    }
    let body = resp.text().await?;
    Ok(self.interpret(&grid_rows(&body)))
  }

  fn interpret(&self, rows: &[Vec<String>]) -> LookupOutcome {
    if rows.len() <= 1 {
      return LookupOutcome::inactive();
    }
    let cell = |row: usize| {
      rows
        .get(row)
        .and_then(|r| r.get(1))
        .filter(|s| !s.is_empty())
        .cloned()
    };
    let name = cell(1);
    let status = cell(2);
    let is_active = self.status.is_active(status.as_deref().unwrap_or_default());

    LookupOutcome { is_active, name, address: None, status }
  }
}

impl<S: StatusInterpreter> LookupClient for KboClient<S> {
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
