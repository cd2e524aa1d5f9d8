//! Core types and engine for BTW (Belgian VAT) identifier reconciliation.
//!
//! Raw rows are normalised into canonical identifiers, checked against a
//! primary and a fallback registry, and merged with manual overrides into a
//! final classification that feeds the export.
//!
//! This crate is deliberately free of HTTP, file-format and database
//! dependencies. Registries, codecs and storage live in sibling crates and
//! plug in through the traits in [`lookup`] and [`store`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod address;
pub mod batch;
pub mod error;
pub mod export;
pub mod identifier;
pub mod lookup;
pub mod reconcile;
pub mod record;
pub mod sequencer;
pub mod store;
pub mod verdict;

pub use error::{Error, LookupError, Result};
pub use identifier::{CanonicalIdentifier, normalize};

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod tests;
