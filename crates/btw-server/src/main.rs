//! btw-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `BTW_*` environment variables, opens the SQLite store, and serves the JSON
//! API over HTTP.
//!
//! Nested keys use a double underscore: `BTW_REGISTRY__TIMEOUT_SECS=5`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use btw_registry::{
  KboAddressSearch, KboClient, ViesClient,
  mock::{MockAddressSearch, MockKbo, MockVies},
};
use btw_server::ServerConfig;
use btw_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "BTW validation server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Use the deterministic mock registries, overriding the config file.
  #[arg(long)]
  mock: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("BTW")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg.mock_registries |= cli.mock;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let app = if server_cfg.mock_registries {
    tracing::warn!("serving mock registries; verdicts are not real");
    btw_server::router(&server_cfg, store, MockVies::new(), MockKbo::new(), MockAddressSearch)
  } else {
    let registry = &server_cfg.registry;
    btw_server::router(
      &server_cfg,
      store,
      ViesClient::new(registry).context("failed to build VIES client")?,
      KboClient::new(registry).context("failed to build KBO client")?,
      KboAddressSearch::new(registry).context("failed to build KBO address client")?,
    )
  };

  let address = server_cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
