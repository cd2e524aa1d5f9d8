//! Postal address helpers shared by record intake and address search.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Join the three address parts as `"street, postal_code city"`.
///
/// Returns an empty string when any part is missing or blank.
pub fn format_address(street: &str, postal_code: &str, city: &str) -> String {
  let (street, postal_code, city) =
    (street.trim(), postal_code.trim(), city.trim());
  if street.is_empty() || postal_code.is_empty() || city.is_empty() {
    return String::new();
  }
  format!("{street}, {postal_code} {city}")
}

/// Input to an address search (see
/// [`AddressSearch`](crate::lookup::AddressSearch)).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressQuery {
  #[serde(default)]
  pub street:       String,
  #[serde(default)]
  pub house_number: String,
  #[serde(default)]
  pub postal_code:  String,
  #[serde(default)]
  pub city:         String,
}

static STREET_PART: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^(.*?),\s+").expect("static regex"));
static HOUSE_NUMBER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^(.*?)(\d+\w*)$").expect("static regex"));
static POSTAL_CITY: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r",\s+(\d{4})\s+(.*?)$").expect("static regex"));

impl AddressQuery {
  /// Best-effort split of a display address produced by [`format_address`]
  /// (`"Teststraat 12a, 1000 Brussel"`) into search fields. Parts that cannot
  /// be recognised are left empty.
  pub fn from_display(address: &str) -> Self {
    let mut query = Self::default();
    let address = address.trim();

    if let Some(street_part) = STREET_PART.captures(address).map(|c| c[1].trim().to_owned()) {
      match HOUSE_NUMBER.captures(&street_part) {
        Some(c) => {
          query.street = c[1].trim().to_owned();
          query.house_number = c[2].trim().to_owned();
        }
        None => query.street = street_part,
      }
    }

    if let Some(c) = POSTAL_CITY.captures(address) {
      query.postal_code = c[1].to_owned();
      query.city = c[2].trim().to_owned();
    }

    query
  }

  /// `true` when no field carries any text.
  pub fn is_empty(&self) -> bool {
    [&self.street, &self.house_number, &self.postal_code, &self.city]
      .iter()
      .all(|s| s.trim().is_empty())
  }
}
