//! KBO search by postal address.

use std::time::Duration;

use btw_core::{
  LookupError, normalize,
  address::AddressQuery,
  lookup::{AddressMatch, AddressSearch},
};
use reqwest::Client;
use tracing::debug;

use crate::{Error, RegistryConfig, Result, html::grid_rows, kbo::REGISTRY};

/// Lists enterprises registered at an address, restricted to active ones.
#[derive(Clone)]
pub struct KboAddressSearch {
  client:  Client,
  url:     String,
  timeout: Duration,
}

impl KboAddressSearch {
  pub fn new(config: &RegistryConfig) -> Result<Self> {
    Ok(Self {
      client:  config.http_client()?,
      url:     config.kbo_address_url.clone(),
      timeout: config.timeout(),
    })
  }

  pub async fn find(&self, query: &AddressQuery) -> Result<Vec<AddressMatch>> {
    debug!(?query, "searching KBO by address");

    let resp = self
      .client
      .get(&self.url)
      .query(&search_params(query, "actionLU"))
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(Error::Status(resp.status()));
    }
    let body = resp.text().await?;
    Ok(matches_from_rows(grid_rows(&body)))
  }
}

impl AddressSearch for KboAddressSearch {
  async fn search(
    &self,
    query: &AddressQuery,
  ) -> Result<Vec<AddressMatch>, LookupError> {
    self
      .find(query)
      .await
      .map_err(|e| e.into_lookup_error(REGISTRY, self.timeout))
  }
}

/// Query parameters of the KBO address form. Blank fields are omitted; the
/// municipality is only sent alongside a postal code.
pub(crate) fn search_params(
  query: &AddressQuery,
  action_key: &'static str,
) -> Vec<(&'static str, String)> {
  let street = query.street.trim();
  let number = query.house_number.trim();
  let postal_code = query.postal_code.trim();
  let city = query.city.trim();

  let mut params = Vec::new();
  if !postal_code.is_empty() {
    params.push(("postcod1", postal_code.to_owned()));
    if !city.is_empty() {
      params.push(("postgemeente1", format!("{postal_code} - {city}")));
    }
  }
  if !street.is_empty() {
    params.push(("straatgemeente1", street.to_owned()));
  }
  if !number.is_empty() {
    params.push(("huisnummer", number.to_owned()));
  }
  params.push(("filterEnkelActieve", "true".to_owned()));
  params.push(("_filterEnkelActieve", "on".to_owned()));
  params.push((action_key, "Zoek".to_owned()));
  params
}

/// Result rows are `number | status | name | address | legal form`; the first
/// row is the header.
fn matches_from_rows(rows: Vec<Vec<String>>) -> Vec<AddressMatch> {
  rows
    .into_iter()
    .skip(1)
    .filter(|cells| cells.len() >= 5)
    .filter_map(|mut cells| {
      let mut take = |i: usize| std::mem::take(&mut cells[i]);
      let registry_number = take(0);
      if registry_number.is_empty() {
        return None;
      }
      Some(AddressMatch {
        identifier: normalize(&registry_number),
        status: take(1),
        name: take(2),
        address: take(3),
        kind: take(4),
        registry_number,
      })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
  };

  use super::*;

  const RESULTS: &str = r#"
    <table class="grid">
      <tr><th>Ondernemingsnummer</th><th>Status</th><th>Naam</th><th>Adres</th><th>Type</th></tr>
      <tr><td>0123.456.789</td><td>Actief</td><td>Acme</td><td>Teststraat 1, 1000 Brussel</td><td>Rechtspersoon</td></tr>
      <tr><td></td><td>Actief</td><td>Nameless</td><td>Teststraat 1</td><td>?</td></tr>
      <tr><td colspan="5">Pagina 1</td></tr>
      <tr><td>0987.654.321</td><td>Actief</td><td>Beta &amp; Zonen</td><td>Teststraat 1, 1000 Brussel</td><td>Natuurlijk persoon</td></tr>
    </table>"#;

  fn query() -> AddressQuery {
    AddressQuery {
      street:       "Teststraat".into(),
      house_number: "1".into(),
      postal_code:  "1000".into(),
      city:         "Brussel".into(),
    }
  }

  #[tokio::test]
  async fn lists_matches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/zoekadresform.html"))
      .and(query_param("postcod1", "1000"))
      .and(query_param("postgemeente1", "1000 - Brussel"))
      .and(query_param("straatgemeente1", "Teststraat"))
      .and(query_param("huisnummer", "1"))
      .and(query_param("filterEnkelActieve", "true"))
      .and(query_param("actionLU", "Zoek"))
      .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS))
      .expect(1)
      .mount(&server)
      .await;

    let search = KboAddressSearch::new(&RegistryConfig {
      kbo_address_url: format!("{}/zoekadresform.html", server.uri()),
      ..RegistryConfig::default()
    })
    .unwrap();
    let found = search.search(&query()).await.unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].identifier.as_str(), "BE0123456789");
    assert_eq!(found[0].registry_number, "0123.456.789");
    assert_eq!(found[0].kind, "Rechtspersoon");
    assert_eq!(found[1].name, "Beta & Zonen");
  }

  #[test]
  fn blank_fields_are_omitted() {
    let params = search_params(
      &AddressQuery { street: "Markt".into(), city: "Gent".into(), ..Default::default() },
      "actionLU",
    );
    let keys: Vec<_> = params.iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, [
      "straatgemeente1",
      "filterEnkelActieve",
      "_filterEnkelActieve",
      "actionLU"
    ]);
  }
}
