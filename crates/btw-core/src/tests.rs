//! End-to-end scenarios: rows in, export groups out.

use tokio_util::sync::CancellationToken;

use crate::{
  batch::{BatchOptions, run_batch},
  export::{STATUS_STOPPED, classify_for_export},
  record::{ColumnMap, RawRecord, parse_records},
  reconcile::{ActiveReason, FinalStatus, ReconciliationStore},
  sequencer::Sequencer,
  store::Run,
  testing::FakeLookup,
  verdict::Source,
};

fn row(id: &str, name: &str) -> RawRecord {
  [("BTW nummer", id), ("Bedrijfsnaam", name)].into_iter().collect()
}

fn options() -> BatchOptions { BatchOptions { pause_ms: 0, ..BatchOptions::default() } }

#[tokio::test]
async fn dotted_number_resolved_by_fallback_is_not_exported() {
  let rows = vec![row("0123.456.789", "Acme")];
  let records = parse_records(&rows, &ColumnMap::default());
  assert_eq!(records[0].identifier.as_str(), "BE0123456789");

  let seq = Sequencer::new(
    FakeLookup::new("vies"),
    FakeLookup::new("kbo").active("BE0123456789", "Acme"),
  );
  let report = run_batch(&records, &seq, &options(), &CancellationToken::new(), |_| {})
    .await
    .unwrap();

  let result = &report.results[0];
  assert_eq!(result.verdict.resolved_by, Source::Fallback);
  assert_eq!(
    result.verdict.details.as_ref().and_then(|d| d.name.as_deref()),
    Some("Acme")
  );

  let store = ReconciliationStore::new();
  assert_eq!(
    store.final_status(&result.record.identifier, &result.verdict),
    FinalStatus::Active(ActiveReason::Verified(Source::Fallback))
  );
  assert!(classify_for_export(&report.results, &store).is_empty());
}

#[tokio::test]
async fn nine_digit_number_inactive_everywhere_is_stopped() {
  let rows = vec![row("123456789", "Gone BV")];
  let records = parse_records(&rows, &ColumnMap::default());
  assert_eq!(records[0].identifier.as_str(), "BE0123456789");

  let seq = Sequencer::new(FakeLookup::new("vies"), FakeLookup::new("kbo"));
  let report = run_batch(&records, &seq, &options(), &CancellationToken::new(), |_| {})
    .await
    .unwrap();

  let groups = classify_for_export(&report.results, &ReconciliationStore::new());
  assert!(groups.continued.is_empty());
  assert_eq!(groups.stopped.len(), 1);
  assert_eq!(groups.stopped[0].status, STATUS_STOPPED);
  assert_eq!(groups.stopped[0].original_identifier, "123456789");
  assert_eq!(groups.stopped[0].name, "Gone BV");
}

#[tokio::test]
async fn overrides_follow_the_canonical_key_across_runs() {
  let seq = Sequencer::new(FakeLookup::new("vies"), FakeLookup::new("kbo"));
  let first = parse_records(&[row("0123.456.789", "Acme")], &ColumnMap::default());
  let report = run_batch(&first, &seq, &options(), &CancellationToken::new(), |_| {})
    .await
    .unwrap();
  let run = Run::from_report(report, Some("first.csv".into()));

  let mut store = ReconciliationStore::new();
  store.adopt_superseding(&run.results[0].record.identifier, "BE0999888777");

  let second = parse_records(&[row("BE 0123 456 789", "Acme")], &ColumnMap::default());
  let report = run_batch(&second, &seq, &options(), &CancellationToken::new(), |_| {})
    .await
    .unwrap();

  let groups = classify_for_export(&report.results, &store);
  assert_eq!(groups.continued.len(), 1);
  assert_eq!(groups.continued[0].original_identifier, "BE 0123 456 789");
  assert_eq!(groups.continued[0].new_identifier, "BE0999888777");
  assert_eq!(run.summary().total, 1);
  assert_eq!(run.summary().active_count, 0);
}

#[test]
fn reconciliation_store_serialises_as_a_map() {
  let mut store = ReconciliationStore::new();
  store.toggle_confirmed_active(&crate::normalize("0123456789"));
  let json = serde_json::to_value(&store).unwrap();
  assert_eq!(json["BE0123456789"]["confirmed_active_in_registry"], true);
}
