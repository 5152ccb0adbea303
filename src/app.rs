//! Process-wide adapter state built once at startup

use crate::config::Settings;
use crate::error::Result;
use crate::network::ClusterClient;
use crate::search::{Deferred, QueryAdapter};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Settings, cluster client and the bound users search, shared by cloning
#[derive(Clone)]
pub struct App {
    /// Settings the app was built from
    pub settings: Arc<Settings>,
    /// Search bound to the configured index and type
    pub users: QueryAdapter<ClusterClient>,
}

impl App {
    /// Validate settings, build the cluster client and bind the search.
    ///
    /// Any failure here is fatal for the caller.
    pub fn init(settings: Settings) -> Result<Self> {
        settings.validate()?;

        let client = Arc::new(ClusterClient::with_settings(&settings)?);
        info!(
            "Cluster client ready for {} endpoint(s), signed: {}",
            client.endpoints().len(),
            client.is_signed()
        );

        let users = QueryAdapter::new(
            client,
            settings.cluster.index.clone(),
            settings.cluster.doc_type.clone(),
        );
        info!("Searching index '{}' type '{}'", users.index(), users.doc_type());

        Ok(Self {
            settings: Arc::new(settings),
            users,
        })
    }

    /// Shorthand for `self.users.search(body)`
    pub fn search(&self, body: Value) -> Deferred<Value, crate::Error> {
        self.users.search(body)
    }
}
