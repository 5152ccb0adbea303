//! users-search: a lazily executed search over the users index
//!
//! Settings are loaded once, a cluster client is built from them, and the
//! index and document type are bound into a [`QueryAdapter`]. Each call to
//! [`QueryAdapter::search`] returns a [`Deferred`] that sends exactly one
//! request when run and hands back the cluster's response or error as is.

pub mod app;
pub mod config;
pub mod error;
pub mod network;
pub mod search;

pub use app::App;
pub use config::Settings;
pub use error::{Error, Result};
pub use network::ClusterClient;
pub use search::{Deferred, QueryAdapter, RawSearch};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
