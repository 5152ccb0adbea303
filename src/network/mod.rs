//! Cluster networking module
//!
//! Provides the HTTP client that talks to the search cluster, endpoint
//! handling and request signing.

mod client;
mod endpoint;
mod signer;

pub use client::ClusterClient;
pub use endpoint::Endpoint;
pub use signer::Signer;
