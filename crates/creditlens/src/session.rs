//! One-shot bootstrap of the immutable per-session reference data.
//!
//! The client registry and feature catalog are fetched once at startup and
//! held read-only for the life of the session. They are constructed
//! explicitly and injected into whatever needs them, never kept as ambient
//! globals, so tests can substitute fakes.

use std::sync::Arc;

use crate::catalog::{ClientIdRegistry, FeatureCatalog};
use crate::remote::RemoteClient;
use crate::types::CreditResult;

/// Session-wide read-only state.
#[derive(Debug, Clone)]
pub struct Session {
    clients: ClientIdRegistry,
    catalog: Arc<FeatureCatalog>,
}

impl Session {
    /// Fetch the client id registry and feature catalog from the service.
    pub async fn bootstrap<C: RemoteClient>(client: &C) -> CreditResult<Self> {
        let ids = client.list_client_ids().await?;
        let catalog = client.list_feature_catalog().await?;
        tracing::info!(
            "session bootstrapped: {} clients, {} features",
            ids.len(),
            catalog.len()
        );
        Ok(Self {
            clients: ClientIdRegistry::new(ids),
            catalog: Arc::new(catalog),
        })
    }

    pub fn clients(&self) -> &ClientIdRegistry {
        &self.clients
    }

    /// Shared handle to the catalog, for handing to a fetcher.
    pub fn catalog(&self) -> Arc<FeatureCatalog> {
        Arc::clone(&self.catalog)
    }
}
