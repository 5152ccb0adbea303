//! Query adapter module
//!
//! Binds an index and a document type over a raw search primitive and hands
//! out lazily executed searches.

mod adapter;
mod deferred;

pub use adapter::QueryAdapter;
pub use deferred::Deferred;

use async_trait::async_trait;
use serde_json::Value;

/// The three-argument search primitive a cluster client provides.
///
/// Implementations send exactly one request per call and report failures
/// through their own `Error` type, which reaches adapter callers untouched.
#[async_trait]
pub trait RawSearch: Send + Sync {
    type Error: Send + 'static;

    async fn raw_search(
        &self,
        index: &str,
        doc_type: &str,
        body: &Value,
    ) -> Result<Value, Self::Error>;
}
