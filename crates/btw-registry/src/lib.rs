//! Registry clients for BTW identifier validation.
//!
//! - [`ViesClient`] — the EU VIES service, used as the primary lookup.
//! - [`KboClient`] — the Belgian KBO public search, used as the fallback.
//! - [`KboAddressSearch`] — KBO search by address, for manual reconciliation.
//! - [`mock`] — deterministic stand-ins for demos and tests.
//!
//! Every client implements the capability traits from
//! [`btw_core::lookup`]; nothing in the engine depends on this crate.

pub mod address;
pub mod config;
pub mod error;
mod html;
pub mod kbo;
pub mod links;
pub mod mock;
pub mod status;
pub mod vies;

pub use address::KboAddressSearch;
pub use config::RegistryConfig;
pub use error::{Error, Result};
pub use kbo::KboClient;
pub use status::{KeywordStatus, StatusInterpreter};
pub use vies::ViesClient;
