//! Interpretation of free-text registry status.
//!
//! KBO reports status as a Dutch phrase. Which phrases mean "active" is a
//! heuristic, so it is pluggable: [`KboClient`](crate::KboClient) takes any
//! [`StatusInterpreter`].

use serde::Deserialize;

/// Decides whether a registry status text means the enterprise is active.
pub trait StatusInterpreter: Send + Sync {
  fn is_active(&self, status: &str) -> bool;
}

impl<F> StatusInterpreter for F
where
  F: Fn(&str) -> bool + Send + Sync,
{
  fn is_active(&self, status: &str) -> bool { self(status) }
}

/// Keyword matching, case-insensitive: active when the text contains any
/// active marker, or contains no stopped marker.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeywordStatus {
  pub active_markers:  Vec<String>,
  pub stopped_markers: Vec<String>,
}

impl Default for KeywordStatus {
  fn default() -> Self {
    Self {
      active_markers:  vec!["actief".to_owned()],
      stopped_markers: vec!["stopgezet".to_owned()],
    }
  }
}

impl StatusInterpreter for KeywordStatus {
  fn is_active(&self, status: &str) -> bool {
    let status = status.to_lowercase();
    let mentions = |markers: &[String]| {
      markers.iter().any(|m| status.contains(&m.to_lowercase()))
    };
    mentions(&self.active_markers) || !mentions(&self.stopped_markers)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_keywords() {
    let s = KeywordStatus::default();
    assert!(s.is_active("Actief"));
    assert!(!s.is_active("Stopgezet"));
    assert!(!s.is_active("  STOPGEZET sinds 2021 "));
    assert!(s.is_active("In vereffening"));
  }

  #[test]
  fn closures_are_interpreters() {
    let strict = |s: &str| s.eq_ignore_ascii_case("actief");
    assert!(strict.is_active("ACTIEF"));
    assert!(!strict.is_active("In vereffening"));
  }
}
