//! Command implementations, independent of how their results are printed.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use btw_core::{
  CanonicalIdentifier,
  address::AddressQuery,
  batch::{BatchOptions, Progress, run_batch},
  export::{ExportGroups, classify_for_export},
  lookup::{AddressMatch, AddressSearch, LookupClient},
  normalize,
  reconcile::{FinalStatus, ManualOverride, OverrideChange, ReconciliationStore},
  record::{ColumnMap, parse_records},
  sequencer::Sequencer,
  store::{Run, RunRepository, RunSummary},
  verdict::Verdict,
};
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

/// Totals shown after a check and in `show`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
  pub total:     usize,
  pub active:    usize,
  pub stopped:   usize,
  pub continued: usize,
}

impl Tally {
  pub fn of(run: &Run, overrides: &ReconciliationStore) -> Self {
    let groups = classify_for_export(&run.results, overrides);
    Self {
      total:     run.results.len(),
      active:    run
        .results
        .iter()
        .filter(|r| overrides.final_status(&r.record.identifier, &r.verdict).is_active())
        .count(),
      stopped:   groups.stopped.len(),
      continued: groups.continued.len(),
    }
  }
}

/// Everything a command may need: storage, both registries and intake
/// settings.
pub struct App<S, P, F, A> {
  store:     S,
  sequencer: Sequencer<P, F>,
  search:    A,
  batch:     BatchOptions,
  columns:   ColumnMap,
}

impl<S, P, F, A> App<S, P, F, A>
where
  S: RunRepository,
  P: LookupClient,
  F: LookupClient,
  A: AddressSearch,
{
  pub fn new(
    store: S,
    primary: P,
    fallback: F,
    search: A,
    batch: BatchOptions,
    columns: ColumnMap,
  ) -> Self {
    let sequencer =
      Sequencer::new(primary, fallback).with_timeout(batch.lookup_timeout());
    Self { store, sequencer, search, batch, columns }
  }

  // ── Runs ──────────────────────────────────────────────────────────────────

  /// Read `path`, validate every record and store the run under `source`
  /// (default: the file name). Cancelling `cancel` stops before the next
  /// record; the partial run is still stored.
  pub async fn check(
    &self,
    path: &Path,
    source: Option<String>,
    cancel: &CancellationToken,
    progress: impl FnMut(Progress) + Send,
  ) -> Result<Run> {
    let rows = btw_io::read_path(path)
      .with_context(|| format!("reading {}", path.display()))?;
    let records = parse_records(&rows, &self.columns);
    info!(rows = rows.len(), records = records.len(), "input parsed");

    let report = run_batch(&records, &self.sequencer, &self.batch, cancel, progress)
      .await
      .with_context(|| format!("no identifiers found in {}", path.display()))?;

    let source = source
      .or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned()));
    let run = Run::from_report(report, source);
    self.store.save_run(&run).await.context("saving run")?;
    Ok(run)
  }

  pub async fn runs(&self) -> Result<Vec<RunSummary>> {
    self.store.list_runs().await.context("listing runs")
  }

  /// A stored run with the overrides as they are now.
  pub async fn show(&self, run_id: Uuid) -> Result<(Run, ReconciliationStore)> {
    let run = self
      .store
      .get_run(run_id)
      .await
      .context("loading run")?
      .ok_or_else(|| anyhow!("run {run_id} not found"))?;
    let overrides = self.overrides().await?;
    Ok((run, overrides))
  }

  pub async fn export_groups(&self, run_id: Uuid) -> Result<ExportGroups> {
    let (run, overrides) = self.show(run_id).await?;
    Ok(classify_for_export(&run.results, &overrides))
  }

  // ── Single identifiers ────────────────────────────────────────────────────

  pub async fn validate(&self, raw: &str) -> Result<(CanonicalIdentifier, Verdict)> {
    let id = key(raw)?;
    let verdict = self.sequencer.validate(&id).await;
    Ok((id, verdict))
  }

  pub async fn get_override(&self, raw: &str) -> Result<(CanonicalIdentifier, ManualOverride)> {
    let id = key(raw)?;
    let ov = self.store.get_override(&id).await.context("loading override")?;
    Ok((id, ov))
  }

  pub async fn change_override(
    &self,
    raw: &str,
    change: OverrideChange,
  ) -> Result<(CanonicalIdentifier, ManualOverride)> {
    let id = key(raw)?;
    let updated = self
      .store
      .update_override(&id, change)
      .await
      .context("saving override")?;
    Ok((id, updated))
  }

  /// The final status `id` would get with `verdict` under current overrides.
  pub async fn final_status(
    &self,
    id: &CanonicalIdentifier,
    verdict: &Verdict,
  ) -> Result<FinalStatus> {
    Ok(self.overrides().await?.final_status(id, verdict))
  }

  // ── Address search ────────────────────────────────────────────────────────

  pub async fn search_address(&self, query: &AddressQuery) -> Result<Vec<AddressMatch>> {
    if query.is_empty() {
      bail!("address query is empty");
    }
    Ok(self.search.search(query).await?)
  }

  /// Adopt match number `pick` (1-based) from `matches` as the superseding
  /// identifier of `raw`.
  pub async fn adopt_match(
    &self,
    raw: &str,
    matches: &[AddressMatch],
    pick: usize,
  ) -> Result<(CanonicalIdentifier, ManualOverride)> {
    let chosen = pick
      .checked_sub(1)
      .and_then(|i| matches.get(i))
      .ok_or_else(|| anyhow!("pick must be between 1 and {}", matches.len()))?;
    self
      .change_override(raw, OverrideChange::Adopt(chosen.identifier.to_string()))
      .await
  }

  async fn overrides(&self) -> Result<ReconciliationStore> {
    self.store.load_overrides().await.context("loading overrides")
  }
}

fn key(raw: &str) -> Result<CanonicalIdentifier> {
  if raw.trim().is_empty() {
    bail!("identifier is empty");
  }
  Ok(normalize(raw))
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use btw_registry::mock::{MockAddressSearch, MockKbo, MockVies};
  use btw_store_sqlite::SqliteStore;

  use super::*;

  type TestApp = App<SqliteStore, MockVies, MockKbo, MockAddressSearch>;

  async fn app() -> TestApp {
    App::new(
      SqliteStore::open_in_memory().await.unwrap(),
      MockVies::new(),
      MockKbo::new(),
      MockAddressSearch,
      BatchOptions { pause_ms: 0, ..BatchOptions::default() },
      ColumnMap::default(),
    )
  }

  fn csv(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
  }

  const MERCHANTS: &str = "BTW nummer;Bedrijfsnaam;E-mail\n\
                           BE0123456789;Bloemen;a@b.be\n\
                           0000.000.004;Fallback BV;\n\
                           BE0000000007;Gone BV;gone@b.be\n";

  #[tokio::test]
  async fn check_stores_the_run() {
    let app = app().await;
    let file = csv(MERCHANTS);
    let mut seen = Vec::new();

    let run = app
      .check(file.path(), None, &CancellationToken::new(), |p| seen.push(p.processed))
      .await
      .unwrap();

    assert_eq!(seen, [1, 2, 3]);
    assert!(!run.cancelled);
    assert!(run.source.as_deref().unwrap().ends_with(".csv"));

    let (stored, overrides) = app.show(run.run_id).await.unwrap();
    assert_eq!(stored.results, run.results);
    assert_eq!(Tally::of(&stored, &overrides), Tally {
      total:     3,
      active:    2,
      stopped:   1,
      continued: 0,
    });
  }

  #[tokio::test]
  async fn cancelled_check_keeps_nothing_processed() {
    let app = app().await;
    let file = csv(MERCHANTS);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let run = app.check(file.path(), Some("march".into()), &cancel, |_| {}).await.unwrap();

    assert!(run.cancelled);
    assert!(run.results.is_empty());
    let runs = app.runs().await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].source.as_deref(), Some("march"));
  }

  #[tokio::test]
  async fn file_without_identifiers_is_an_error() {
    let app = app().await;
    let file = csv("Bedrijfsnaam;E-mail\nAcme;a@b.be\n");
    assert!(app.check(file.path(), None, &CancellationToken::new(), |_| {}).await.is_err());
  }

  #[tokio::test]
  async fn overrides_move_records_between_groups() {
    let app = app().await;
    let run = app
      .check(csv(MERCHANTS).path(), None, &CancellationToken::new(), |_| {})
      .await
      .unwrap();

    app
      .change_override("0000000007", OverrideChange::SetValue("BE0987654321".into()))
      .await
      .unwrap();
    assert_eq!(app.export_groups(run.run_id).await.unwrap().stopped.len(), 1);

    let (_, ov) = app
      .change_override("BE0000000007", OverrideChange::ToggleSuperseding)
      .await
      .unwrap();
    assert!(ov.has_superseding_identifier);

    let groups = app.export_groups(run.run_id).await.unwrap();
    assert!(groups.stopped.is_empty());
    assert_eq!(groups.continued[0].new_identifier, "BE0987654321");
  }

  #[tokio::test]
  async fn concurrent_confirms_cancel_out() {
    let app = app().await;
    let (a, b) = tokio::join!(
      app.change_override("0111.222.333", OverrideChange::ToggleConfirmed),
      app.change_override("BE0111222333", OverrideChange::ToggleConfirmed),
    );
    a.unwrap();
    b.unwrap();

    let (_, ov) = app.get_override("BE0111222333").await.unwrap();
    assert!(ov.is_default());
  }

  #[tokio::test]
  async fn adopting_an_address_match() {
    let app = app().await;
    let query = AddressQuery::from_display("Teststraat 1, 1000 Brussel");
    let matches = app.search_address(&query).await.unwrap();

    let (id, ov) = app.adopt_match("BE0000000007", &matches, 2).await.unwrap();
    assert_eq!(id.as_str(), "BE0000000007");
    assert!(ov.has_superseding_identifier);
    assert_eq!(ov.superseding_identifier_value, matches[1].identifier.as_str());

    assert!(app.adopt_match("BE0000000007", &matches, 0).await.is_err());
    assert!(app.adopt_match("BE0000000007", &matches, 3).await.is_err());
  }

  #[tokio::test]
  async fn validate_uses_both_registries() {
    let app = app().await;
    let (id, verdict) = app.validate("0000.000.003").await.unwrap();
    assert_eq!(id.as_str(), "BE0000000003");
    assert!(verdict.is_active);
    assert_eq!(
      app.final_status(&id, &verdict).await.unwrap(),
      FinalStatus::Active(btw_core::reconcile::ActiveReason::Verified(
        btw_core::verdict::Source::Fallback
      ))
    );
    assert!(app.validate(" ").await.is_err());
  }
}
