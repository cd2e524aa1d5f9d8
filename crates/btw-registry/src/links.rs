//! Deep links into the KBO public search, for humans to verify a result.

use btw_core::{CanonicalIdentifier, address::AddressQuery, identifier::COUNTRY_PREFIX};
use reqwest::Url;

use crate::{Error, RegistryConfig, Result, address::search_params};

/// Link to the KBO page for one enterprise number.
pub fn kbo_number_url(config: &RegistryConfig, id: &CanonicalIdentifier) -> Result<Url> {
  let number = id
    .enterprise_number()
    .unwrap_or_else(|| id.as_str().replacen(COUNTRY_PREFIX, "", 1));
  Url::parse_with_params(&config.kbo_url, [("nummer", number.as_str()), ("actionLu", "Zoek")])
    .map_err(|e| Error::Url(e.to_string()))
}

/// Link to a KBO address search pre-filled from a display address. Falls back
/// to the empty search form when the address cannot be split.
pub fn kbo_address_url(config: &RegistryConfig, address: &str) -> Result<Url> {
  let query = AddressQuery::from_display(address);
  let url = if query.postal_code.is_empty() || query.street.is_empty() {
    Url::parse(&config.kbo_address_url)
  } else {
    let params = search_params(&query, "actionLU");
    Url::parse_with_params(
      &config.kbo_address_url,
      params.iter().map(|(k, v)| (*k, v.as_str())),
    )
  };
  url.map_err(|e| Error::Url(e.to_string()))
}

#[cfg(test)]
mod tests {
  use btw_core::normalize;

  use super::*;

  #[test]
  fn number_link() {
    let url = kbo_number_url(&RegistryConfig::default(), &normalize("BE0123456789")).unwrap();
    assert_eq!(
      url.as_str(),
      "https://kbopub.economie.fgov.be/kbopub/zoeknummerform.html?nummer=0123.456.789&actionLu=Zoek"
    );
  }

  #[test]
  fn address_link_is_prefilled() {
    let url =
      kbo_address_url(&RegistryConfig::default(), "Teststraat 12, 1000 Brussel").unwrap();
    let pairs: Vec<_> = url.query_pairs().into_owned().collect();
    assert!(pairs.contains(&("postcod1".into(), "1000".into())));
    assert!(pairs.contains(&("straatgemeente1".into(), "Teststraat".into())));
    assert!(pairs.contains(&("huisnummer".into(), "12".into())));
  }

  #[test]
  fn unparseable_address_links_to_blank_form() {
    let url = kbo_address_url(&RegistryConfig::default(), "somewhere").unwrap();
    assert_eq!(url.query(), None);
  }

  #[test]
  fn bad_base_url_is_an_error() {
    let config = RegistryConfig { kbo_url: "not a url".into(), ..RegistryConfig::default() };
    assert!(matches!(
      kbo_number_url(&config, &normalize("BE0123456789")),
      Err(Error::Url(_))
    ));
  }
}
