//! Integration tests for `SqliteStore` against in-memory and file databases.

use btw_core::{
  normalize,
  reconcile::{ManualOverride, OverrideChange, ReconciliationStore},
  record::ParsedRecord,
  store::{Run, RunRepository},
  verdict::{Details, Source, ValidationResult, Verdict},
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn result(raw_id: &str, active: bool) -> ValidationResult {
  let verdict = if active {
    Verdict::active(Source::Primary, Details {
      name:    Some("Acme".into()),
      address: None,
      status:  None,
    })
  } else {
    Verdict::inactive("identifier not active in either registry")
  };
  ValidationResult {
    record: ParsedRecord {
      original_identifier: raw_id.into(),
      identifier:          normalize(raw_id),
      name:                "Acme".into(),
      email:               "info@acme.be".into(),
      address:             "Teststraat 1, 1000 Brussel".into(),
      kind:                "Bloemist".into(),
    },
    verdict,
  }
}

fn run(results: Vec<ValidationResult>) -> Run {
  Run {
    run_id: Uuid::new_v4(),
    created_at: Utc::now(),
    source: Some("merchants.csv".into()),
    cancelled: false,
    results,
  }
}

// ─── Runs ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_and_get_run_preserves_order() {
  let s = store().await;
  let saved = run(vec![
    result("BE0123456789", true),
    result("0987.654.321", false),
    result("BE0000000003", true),
  ]);
  s.save_run(&saved).await.unwrap();

  let loaded = s.get_run(saved.run_id).await.unwrap().expect("run present");
  assert_eq!(loaded.run_id, saved.run_id);
  assert_eq!(loaded.source.as_deref(), Some("merchants.csv"));
  assert_eq!(loaded.results, saved.results);
  assert_eq!(loaded.results[1].record.original_identifier, "0987.654.321");
}

#[tokio::test]
async fn missing_run_is_none() {
  let s = store().await;
  assert!(s.get_run(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn empty_cancelled_run_round_trips() {
  let s = store().await;
  let mut saved = run(vec![]);
  saved.cancelled = true;
  s.save_run(&saved).await.unwrap();

  let loaded = s.get_run(saved.run_id).await.unwrap().unwrap();
  assert!(loaded.cancelled);
  assert!(loaded.results.is_empty());
}

#[tokio::test]
async fn saving_a_run_twice_fails() {
  let s = store().await;
  let saved = run(vec![result("BE0123456789", true)]);
  s.save_run(&saved).await.unwrap();

  let err = s.save_run(&saved).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateRun(id) if id == saved.run_id));
}

#[tokio::test]
async fn list_runs_newest_first_with_counts() {
  let s = store().await;
  let mut older = run(vec![result("BE0123456789", true)]);
  older.created_at = Utc::now() - Duration::hours(1);
  let newer = run(vec![
    result("BE0123456789", true),
    result("BE0987654321", false),
  ]);
  s.save_run(&older).await.unwrap();
  s.save_run(&newer).await.unwrap();

  let runs = s.list_runs().await.unwrap();
  assert_eq!(runs.len(), 2);
  assert_eq!(runs[0].run_id, newer.run_id);
  assert_eq!(runs[0].total, 2);
  assert_eq!(runs[0].active_count, 1);
  assert_eq!(runs[1], older.summary());
}

// ─── Overrides ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn absent_override_is_default() {
  let s = store().await;
  let ov = s.get_override(&normalize("BE0123456789")).await.unwrap();
  assert!(ov.is_default());
}

#[tokio::test]
async fn put_override_is_last_writer_wins() {
  let s = store().await;
  let id = normalize("BE0123456789");

  s.put_override(&id, &ManualOverride {
    confirmed_active_in_registry: true,
    ..ManualOverride::default()
  })
  .await
  .unwrap();
  let second = ManualOverride {
    confirmed_active_in_registry: false,
    has_superseding_identifier:   true,
    superseding_identifier_value: "BE0987654321".into(),
  };
  s.put_override(&id, &second).await.unwrap();

  assert_eq!(s.get_override(&id).await.unwrap(), second);
}

#[tokio::test]
async fn update_override_starts_from_default() {
  let s = store().await;
  let id = normalize("BE0123456789");

  let ov = s
    .update_override(&id, OverrideChange::SetValue("BE0987654321".into()))
    .await
    .unwrap();

  assert!(!ov.has_superseding_identifier);
  assert_eq!(ov.superseding_identifier_value, "BE0987654321");
  assert_eq!(s.get_override(&id).await.unwrap(), ov);
}

#[tokio::test]
async fn concurrent_toggles_are_applied_in_turn() {
  let s = store().await;
  let id = normalize("BE0111222333");

  let (a, b) = tokio::join!(
    s.update_override(&id, OverrideChange::ToggleConfirmed),
    s.update_override(&id, OverrideChange::ToggleConfirmed),
  );
  a.unwrap();
  b.unwrap();

  assert!(s.get_override(&id).await.unwrap().is_default());
}

#[tokio::test]
async fn concurrent_changes_to_different_fields_both_stick() {
  let s = store().await;
  let id = normalize("BE0444555666");

  let (a, b) = tokio::join!(
    s.update_override(&id, OverrideChange::SetValue("BE0999888777".into())),
    s.update_override(&id, OverrideChange::ToggleSuperseding),
  );
  a.unwrap();
  b.unwrap();

  assert_eq!(s.get_override(&id).await.unwrap(), ManualOverride {
    confirmed_active_in_registry: false,
    has_superseding_identifier:   true,
    superseding_identifier_value: "BE0999888777".into(),
  });
}

#[tokio::test]
async fn load_overrides_builds_a_store() {
  let s = store().await;
  let mut expected = ReconciliationStore::new();
  let a = normalize("BE0123456789");
  let b = normalize("0987.654.321");
  expected.toggle_confirmed_active(&a);
  expected.adopt_superseding(&b, "BE0111111111");

  for (id, ov) in expected.iter() {
    s.put_override(id, ov).await.unwrap();
  }

  let loaded = s.load_overrides().await.unwrap();
  assert_eq!(loaded.len(), 2);
  assert_eq!(loaded.get(&a), expected.get(&a));
  assert_eq!(loaded.get(&b).superseding_identifier_value, "BE0111111111");
}

#[tokio::test]
async fn overrides_survive_reopening_the_file() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("btw.db");
  let id = normalize("BE0123456789");
  let ov = ManualOverride {
    confirmed_active_in_registry: true,
    ..ManualOverride::default()
  };

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.put_override(&id, &ov).await.unwrap();
  }

  let reopened = SqliteStore::open(&path).await.unwrap();
  assert_eq!(reopened.get_override(&id).await.unwrap(), ov);
}
