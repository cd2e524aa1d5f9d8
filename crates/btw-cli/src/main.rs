//! `btw` — validate merchant lists from the terminal.
//!
//! Runs, overrides and exports go straight to the local SQLite store, so the
//! server does not need to be running.

mod app;
mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use app::{App, Tally};
use btw_core::{
  address::AddressQuery,
  batch::BatchOptions,
  lookup::{AddressSearch, LookupClient},
  reconcile::OverrideChange,
  record::ColumnMap,
  store::RunRepository,
};
use btw_registry::{
  KboAddressSearch, KboClient, RegistryConfig, ViesClient,
  mock::{MockAddressSearch, MockKbo, MockVies},
};
use btw_store_sqlite::SqliteStore;
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "btw", about = "Check Belgian VAT numbers against VIES and KBO")]
struct Args {
  /// Path to a TOML config file (store_path, mock, [registry], [batch],
  /// [columns]).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// SQLite database holding runs and overrides.
  #[arg(long, env = "BTW_STORE", value_name = "FILE")]
  store: Option<PathBuf>,

  /// Use the deterministic mock registries.
  #[arg(long, env = "BTW_MOCK")]
  mock: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Validate every identifier in a CSV file and store the run.
  Check {
    file:   PathBuf,
    /// Label stored with the run instead of the file name.
    #[arg(long)]
    source: Option<String>,
  },
  /// List stored runs, newest first.
  Runs,
  /// Show one run with current overrides applied.
  Show { run: Uuid },
  /// Check a single identifier.
  Validate { identifier: String },
  /// Show the override for an identifier.
  Override { identifier: String },
  /// Toggle "confirmed active in the registry".
  Confirm { identifier: String },
  /// Toggle "continues under a new number".
  Supersede { identifier: String },
  /// Stage the new number without ticking the flag.
  SetNew { identifier: String, value: String },
  /// Search KBO for enterprises registered at an address.
  SearchAddress {
    #[command(flatten)]
    query:     AddressArgs,
    /// Adopt one of the matches as the new number of this identifier.
    #[arg(long, value_name = "IDENTIFIER", requires = "pick")]
    adopt_for: Option<String>,
    /// Which match to adopt (1-based, as listed).
    #[arg(long, requires = "adopt_for")]
    pick:      Option<usize>,
  },
  /// Write a run's stopped and continued merchants to an Excel workbook.
  Export {
    run: Uuid,
    #[arg(short, long, value_name = "FILE")]
    out: PathBuf,
  },
}

#[derive(ClapArgs)]
struct AddressArgs {
  /// Full address, e.g. "Teststraat 1, 1000 Brussel".
  #[arg(long, conflicts_with_all = ["street", "number", "postal_code", "city"])]
  address:     Option<String>,
  #[arg(long)]
  street:      Option<String>,
  #[arg(long)]
  number:      Option<String>,
  #[arg(long)]
  postal_code: Option<String>,
  #[arg(long)]
  city:        Option<String>,
}

impl AddressArgs {
  fn into_query(self) -> AddressQuery {
    if let Some(address) = self.address {
      return AddressQuery::from_display(&address);
    }
    AddressQuery {
      street:       self.street.unwrap_or_default(),
      house_number: self.number.unwrap_or_default(),
      postal_code:  self.postal_code.unwrap_or_default(),
      city:         self.city.unwrap_or_default(),
    }
  }
}

// ─── Config file ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
  store_path: Option<PathBuf>,
  mock:       bool,
  registry:   RegistryConfig,
  batch:      BatchOptions,
  columns:    ColumnMap,
}

fn load_config(path: Option<&Path>) -> Result<ConfigFile> {
  let Some(path) = path else {
    return Ok(ConfigFile::default());
  };
  let text = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read config {}", path.display()))?;
  toml::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
}

// ─── main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  // Logs go to stderr so stdout stays clean for the command output.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();
  let cfg = load_config(args.config.as_deref())?;

  // CLI flags override config file values, which override defaults.
  let store_path = args
    .store
    .or(cfg.store_path)
    .unwrap_or_else(|| PathBuf::from("btw.db"));
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {}", store_path.display()))?;

  if args.mock || cfg.mock {
    tracing::warn!("using mock registries; verdicts are not real");
    let app = App::new(
      store,
      MockVies::new(),
      MockKbo::new(),
      MockAddressSearch,
      cfg.batch,
      cfg.columns,
    );
    execute(&app, args.command).await
  } else {
    let registry = &cfg.registry;
    let app = App::new(
      store,
      ViesClient::new(registry).context("failed to build VIES client")?,
      KboClient::new(registry).context("failed to build KBO client")?,
      KboAddressSearch::new(registry).context("failed to build KBO address client")?,
      cfg.batch,
      cfg.columns,
    );
    execute(&app, args.command).await
  }
}

async fn execute<S, P, F, A>(app: &App<S, P, F, A>, command: Command) -> Result<()>
where
  S: RunRepository,
  P: LookupClient,
  F: LookupClient,
  A: AddressSearch,
{
  match command {
    Command::Check { file, source } => {
      let cancel = CancellationToken::new();
      let on_interrupt = cancel.clone();
      tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
          eprintln!("\nStopping after the current record...");
          on_interrupt.cancel();
        }
      });

      let run = app
        .check(&file, source, &cancel, |p| {
          eprint!("\rChecked {}/{}", p.processed, p.total);
          if p.is_complete() {
            eprintln!();
          }
        })
        .await?;

      let (_, overrides) = app.show(run.run_id).await?;
      println!("Run {}", run.run_id);
      render::tally(&Tally::of(&run, &overrides));
      if run.cancelled {
        println!("Cancelled; the records checked so far were stored.");
      }
    }
    Command::Runs => render::run_list(&app.runs().await?),
    Command::Show { run } => {
      let (run, overrides) = app.show(run).await?;
      render::run(&run, &overrides);
    }
    Command::Validate { identifier } => {
      let (id, verdict) = app.validate(&identifier).await?;
      let status = app.final_status(&id, &verdict).await?;
      render::verdict(&id, &verdict, &status);
    }
    Command::Override { identifier } => {
      let (id, ov) = app.get_override(&identifier).await?;
      render::override_state(&id, &ov);
    }
    Command::Confirm { identifier } => {
      let (id, ov) = app.change_override(&identifier, OverrideChange::ToggleConfirmed).await?;
      render::override_state(&id, &ov);
    }
    Command::Supersede { identifier } => {
      let (id, ov) = app.change_override(&identifier, OverrideChange::ToggleSuperseding).await?;
      render::override_state(&id, &ov);
    }
    Command::SetNew { identifier, value } => {
      let (id, ov) = app.change_override(&identifier, OverrideChange::SetValue(value)).await?;
      render::override_state(&id, &ov);
    }
    Command::SearchAddress { query, adopt_for, pick } => {
      let found = app.search_address(&query.into_query()).await?;
      render::matches(&found);
      if let (Some(identifier), Some(pick)) = (adopt_for, pick) {
        let (id, ov) = app.adopt_match(&identifier, &found, pick).await?;
        render::override_state(&id, &ov);
      }
    }
    Command::Export { run, out } => {
      let groups = app.export_groups(run).await?;
      if groups.is_empty() {
        bail!("nothing to export: every merchant in run {run} is active");
      }
      btw_io::xlsx::save(&groups, &out)
        .with_context(|| format!("failed to write {}", out.display()))?;
      println!(
        "Wrote {} stopped and {} continued merchants to {}",
        groups.stopped.len(),
        groups.continued.len(),
        out.display()
      );
    }
  }
  Ok(())
}
