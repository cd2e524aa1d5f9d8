//! HTTP server for BTW validation.
//!
//! Mounts the [`btw_api`] router under `/api` with request tracing. The
//! binary in `main.rs` wires configuration, storage and registries into it.

use std::path::PathBuf;

use axum::Router;
use btw_api::{ApiState, api_router};
use btw_core::{
  batch::BatchOptions,
  lookup::{AddressSearch, LookupClient},
  record::ColumnMap,
  sequencer::Sequencer,
  store::RunRepository,
};
use btw_registry::RegistryConfig;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `BTW_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  /// Serve the deterministic mock registries instead of VIES and KBO.
  pub mock_registries: bool,
  pub registry:        RegistryConfig,
  pub batch:           BatchOptions,
  pub columns:         ColumnMap,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            "127.0.0.1".to_string(),
      port:            8080,
      store_path:      PathBuf::from("btw.db"),
      mock_registries: false,
      registry:        RegistryConfig::default(),
      batch:           BatchOptions::default(),
      columns:         ColumnMap::default(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application router: the API under `/api`, traced.
pub fn router<S, P, F, A>(
  config: &ServerConfig,
  store: S,
  primary: P,
  fallback: F,
  search: A,
) -> Router
where
  S: RunRepository + 'static,
  P: LookupClient + 'static,
  F: LookupClient + 'static,
  A: AddressSearch + 'static,
{
  let sequencer =
    Sequencer::new(primary, fallback).with_timeout(config.batch.lookup_timeout());
  let state = ApiState::new(store, sequencer, search)
    .with_batch(config.batch.clone())
    .with_columns(config.columns.clone());

  Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}
