//! Identifier normalisation — turns whatever a merchant file contains into
//! the `BE` + 10 digit key used by every later stage.
//!
//! Normalisation never fails. Input that does not fit the national numbering
//! scheme is passed through unchanged and is still looked up; the registries
//! simply report it as inactive.

use std::fmt;

use serde::{Deserialize, Serialize};

/// ISO country prefix of every canonical identifier.
pub const COUNTRY_PREFIX: &str = "BE";

/// Number of digits following the prefix.
pub const NATIONAL_DIGITS: usize = 10;

const CANONICAL_LEN: usize = COUNTRY_PREFIX.len() + NATIONAL_DIGITS;

// ─── CanonicalIdentifier ─────────────────────────────────────────────────────

/// The lookup key for a record.
///
/// Either `BE` followed by ten digits, or — when normalisation did not
/// recognise the input — the raw input verbatim. Treated as opaque: overrides
/// and results are keyed by this value, so two spellings that normalise to the
/// same key deliberately share state.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CanonicalIdentifier(String);

impl CanonicalIdentifier {
  /// Wrap an already-normalised key, e.g. one read back from storage.
  pub fn from_normalized(key: impl Into<String>) -> Self { Self(key.into()) }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn into_string(self) -> String { self.0 }

  /// `true` when this key has the `BE` + 10 digit shape.
  pub fn is_canonical(&self) -> bool { is_canonical_form(&self.0) }

  /// The two-letter country code, for canonical keys only.
  pub fn country_code(&self) -> Option<&str> {
    self.is_canonical().then(|| &self.0[..COUNTRY_PREFIX.len()])
  }

  /// The ten national digits, for canonical keys only.
  pub fn national_number(&self) -> Option<&str> {
    self.is_canonical().then(|| &self.0[COUNTRY_PREFIX.len()..])
  }

  /// The KBO enterprise-number spelling, `0123.456.789`.
  pub fn enterprise_number(&self) -> Option<String> {
    self
      .national_number()
      .map(|n| format!("{}.{}.{}", &n[..4], &n[4..7], &n[7..]))
  }

  /// Human-friendly grouping, `BE 0123 456 789`. Non-canonical keys are
  /// returned unchanged. Never use the result as a lookup key.
  pub fn display(&self) -> String {
    match self.national_number() {
      Some(n) => {
        format!("{COUNTRY_PREFIX} {} {} {}", &n[..4], &n[4..7], &n[7..])
      }
      None => self.0.clone(),
    }
  }
}

impl fmt::Display for CanonicalIdentifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl AsRef<str> for CanonicalIdentifier {
  fn as_ref(&self) -> &str { &self.0 }
}

// ─── Normalisation ───────────────────────────────────────────────────────────

/// Normalise a raw identifier string.
///
/// 1. Drop every character that is not an ASCII letter or digit.
/// 2. Nine digits: pad with a leading `0` (older numbers omit it).
/// 3. Ten digits: prepend the country prefix.
/// 4. `BE` + ten digits: done.
/// 5. Anything else: the original input, untouched.
///
/// Step 4 checks that all ten characters after `BE` are digits, not just the
/// length, so `"BE-0123-456-78X"` stays as typed rather than becoming a
/// twelve-character key that no registry would accept.
pub fn normalize(raw: &str) -> CanonicalIdentifier {
  let mut cleaned: String =
    raw.chars().filter(char::is_ascii_alphanumeric).collect();

  if is_all_digits(&cleaned) && cleaned.len() == NATIONAL_DIGITS - 1 {
    cleaned.insert(0, '0');
  }

  if is_all_digits(&cleaned) && cleaned.len() == NATIONAL_DIGITS {
    cleaned.insert_str(0, COUNTRY_PREFIX);
  }

  if is_canonical_form(&cleaned) {
    CanonicalIdentifier(cleaned)
  } else {
    CanonicalIdentifier(raw.to_owned())
  }
}

fn is_all_digits(s: &str) -> bool {
  !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_canonical_form(s: &str) -> bool {
  s.len() == CANONICAL_LEN
    && s.starts_with(COUNTRY_PREFIX)
    && is_all_digits(&s[COUNTRY_PREFIX.len()..])
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;

  #[test]
  fn dotted_enterprise_number() {
    assert_eq!(normalize("0123.456.789").as_str(), "BE0123456789");
  }

  #[test]
  fn nine_digits_padded_then_prefixed() {
    assert_eq!(normalize("123456789").as_str(), "BE0123456789");
  }

  #[test]
  fn spaced_prefixed_form() {
    assert_eq!(normalize("BE 0123 456 789").as_str(), "BE0123456789");
    assert_eq!(normalize("BE0123.456.789").as_str(), "BE0123456789");
  }

  #[test]
  fn unrecognised_input_is_returned_verbatim() {
    assert_eq!(normalize("NL123456789B01").as_str(), "NL123456789B01");
    assert_eq!(normalize("  12 34 ").as_str(), "  12 34 ");
    assert_eq!(normalize("be0123456789").as_str(), "be0123456789");
    assert_eq!(normalize("BEABCDEFGHIJ").as_str(), "BEABCDEFGHIJ");
  }

  #[test]
  fn prefixed_form_needs_ten_digits() {
    assert_eq!(normalize("BE-0123-456-78X").as_str(), "BE-0123-456-78X");
    assert!(!normalize("BE-0123-456-78X").is_canonical());
  }

  #[test]
  fn empty_string_stays_empty() {
    assert_eq!(normalize("").as_str(), "");
  }

  #[test]
  fn spellings_collide_on_one_key() {
    assert_eq!(normalize("0123.456.789"), normalize("BE 0123 456 789"));
    assert_eq!(normalize("123456789"), normalize("0123456789"));
  }

  #[test]
  fn presentation_forms() {
    let id = normalize("0123456789");
    assert_eq!(id.display(), "BE 0123 456 789");
    assert_eq!(id.enterprise_number().as_deref(), Some("0123.456.789"));
    assert_eq!(id.country_code(), Some("BE"));
    assert_eq!(id.national_number(), Some("0123456789"));

    let odd = normalize("unknown");
    assert_eq!(odd.display(), "unknown");
    assert!(odd.enterprise_number().is_none());
    assert!(!odd.is_canonical());
  }

  proptest! {
    #[test]
    fn nine_digits_gain_a_leading_zero(digits in "[0-9]{9}") {
      let id = normalize(&digits);
      prop_assert_eq!(id.as_str(), format!("BE0{digits}"));
    }

    #[test]
    fn ten_digits_gain_the_prefix(digits in "[0-9]{10}") {
      let id = normalize(&digits);
      prop_assert_eq!(id.as_str(), format!("BE{digits}"));
    }

    #[test]
    fn canonical_form_is_fixed_point(digits in "[0-9]{10}") {
      let canonical = format!("BE{digits}");
      let normalized = normalize(&canonical);
      prop_assert_eq!(normalized.as_str(), canonical.as_str());
    }

    #[test]
    fn normalize_is_idempotent(raw in "\\PC{0,20}") {
      let once = normalize(&raw);
      let twice = normalize(once.as_str());
      prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalize_is_idempotent_on_id_like_input(raw in "[0-9BE .\\-/]{0,16}") {
      let once = normalize(&raw);
      prop_assert_eq!(normalize(once.as_str()), once);
    }
  }
}
