//! JSON REST API for BTW validation runs and manual reconciliation.
//!
//! Exposes an axum [`Router`] backed by any [`RunRepository`], a pair of
//! [`LookupClient`]s and an [`AddressSearch`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", btw_api::api_router(state))
//! ```

pub mod error;
pub mod overrides;
pub mod runs;
pub mod search;
pub mod validate;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use btw_core::{
  batch::BatchOptions,
  lookup::{AddressSearch, LookupClient},
  record::ColumnMap,
  sequencer::Sequencer,
  store::RunRepository,
};

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S, P, F, A> {
  pub store:     Arc<S>,
  pub sequencer: Arc<Sequencer<P, F>>,
  pub search:    Arc<A>,
  pub batch:     BatchOptions,
  pub columns:   Arc<ColumnMap>,
}

impl<S, P, F, A> ApiState<S, P, F, A> {
  pub fn new(store: S, sequencer: Sequencer<P, F>, search: A) -> Self {
    Self {
      store:     Arc::new(store),
      sequencer: Arc::new(sequencer),
      search:    Arc::new(search),
      batch:     BatchOptions::default(),
      columns:   Arc::new(ColumnMap::default()),
    }
  }

  pub fn with_batch(mut self, batch: BatchOptions) -> Self {
    self.batch = batch;
    self
  }

  pub fn with_columns(mut self, columns: ColumnMap) -> Self {
    self.columns = Arc::new(columns);
    self
  }
}

// Manual impl: no `Clone` bounds on the type parameters.
impl<S, P, F, A> Clone for ApiState<S, P, F, A> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      sequencer: Arc::clone(&self.sequencer),
      search:    Arc::clone(&self.search),
      batch:     self.batch.clone(),
      columns:   Arc::clone(&self.columns),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, P, F, A>(state: ApiState<S, P, F, A>) -> Router<()>
where
  S: RunRepository + 'static,
  P: LookupClient + 'static,
  F: LookupClient + 'static,
  A: AddressSearch + 'static,
{
  Router::new()
    .route("/validate", post(validate::handler::<S, P, F, A>))
    // Runs
    .route("/runs", get(runs::list::<S, P, F, A>).post(runs::create::<S, P, F, A>))
    .route("/runs/{id}", get(runs::get_one::<S, P, F, A>))
    .route("/runs/{id}/export", get(runs::export::<S, P, F, A>))
    .route("/runs/{id}/export.xlsx", get(runs::export_xlsx::<S, P, F, A>))
    // Overrides
    .route("/overrides/{identifier}", get(overrides::get_one::<S, P, F, A>))
    .route(
      "/overrides/{identifier}/confirmed-active",
      post(overrides::toggle_confirmed::<S, P, F, A>),
    )
    .route(
      "/overrides/{identifier}/superseding",
      post(overrides::toggle_superseding::<S, P, F, A>),
    )
    .route(
      "/overrides/{identifier}/superseding-value",
      axum::routing::put(overrides::set_value::<S, P, F, A>),
    )
    .route("/overrides/{identifier}/adopt", post(overrides::adopt::<S, P, F, A>))
    // Address search
    .route("/search-address", post(search::handler::<S, P, F, A>))
    .with_state(state)
}
