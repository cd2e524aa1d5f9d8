//! Registry endpoints and HTTP settings.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::Result;

/// Endpoints and HTTP settings for the live registries, deserialised from the
/// `[registry]` config section. Every field has a working default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
  /// VIES REST endpoint accepting `{"countryCode", "vatNumber"}`.
  pub vies_url:        String,
  /// KBO public search by enterprise number.
  pub kbo_url:         String,
  /// KBO public search by address.
  pub kbo_address_url: String,
  /// KBO serves an error page to clients without a browser User-Agent.
  pub user_agent:      String,
  pub timeout_secs:    u64,
}

impl Default for RegistryConfig {
  fn default() -> Self {
    Self {
      vies_url:        "https://ec.europa.eu/taxation_customs/vies/rest-api/check-vat-number"
        .to_string(),
      kbo_url:         "https://kbopub.economie.fgov.be/kbopub/zoeknummerform.html".to_string(),
      kbo_address_url: "https://kbopub.economie.fgov.be/kbopub/zoekadresform.html".to_string(),
      user_agent:      "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                        (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
        .to_string(),
      timeout_secs:    20,
    }
  }
}

impl RegistryConfig {
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }

  /// Build the shared HTTP client.
  ///
  /// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
  pub(crate) fn http_client(&self) -> Result<Client> {
    Ok(
      Client::builder()
        .timeout(self.timeout())
        .user_agent(self.user_agent.clone())
        .build()?,
    )
  }
}
