//! Cache-aside orchestration: check the store, fetch on miss, write once.
//!
//! `get` behaves atomically from the caller's view: it returns either a
//! fully-written readable artifact or an error, never a partial blob. A
//! per-key async lock is held across the existence check, the remote fetch
//! and the store write, so concurrent requests for the same semantic
//! artifact inside one process collapse to a single remote call. Across
//! processes the store itself provides the at-most-once guarantee: a key
//! that exists on disk is never fetched again.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;

use crate::catalog::FeatureCatalog;
use crate::remote::RemoteClient;
use crate::request::{ArtifactRequest, DerivedKeys, FeatureBounds};
use crate::store::ArtifactStore;
use crate::types::{ArtifactHandle, CreditError, CreditResult, LayoutHint};

/// Outcome of a [`CachingFetcher::prefetch`] run.
#[derive(Debug, Default)]
pub struct PrefetchReport {
    /// Requests now present locally (fresh fetch or prior hit).
    pub resolved: usize,
    /// Requests that failed, with their errors.
    pub failures: Vec<(ArtifactRequest, CreditError)>,
}

/// Orchestrates key derivation, the artifact store and the remote client.
pub struct CachingFetcher<C> {
    catalog: Arc<FeatureCatalog>,
    store: ArtifactStore,
    client: C,
    bounds: FeatureBounds,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<C: RemoteClient> CachingFetcher<C> {
    pub fn new(catalog: Arc<FeatureCatalog>, store: ArtifactStore, client: C) -> Self {
        Self {
            catalog,
            store,
            client,
            bounds: FeatureBounds::default(),
            locks: DashMap::new(),
        }
    }

    /// Override the allowed `max_features` range.
    pub fn with_bounds(mut self, bounds: FeatureBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn catalog(&self) -> &FeatureCatalog {
        &self.catalog
    }

    /// Resolve a request to a local artifact handle.
    ///
    /// Validation failures are rejected before any network call. Gauge
    /// requests always go live: the scalar is cheap and may change as the
    /// model evolves, so it is never persisted. Everything else is served
    /// from the store when any candidate key exists, and fetched then
    /// written exactly once otherwise.
    pub async fn get(&self, request: &ArtifactRequest) -> CreditResult<ArtifactHandle> {
        request.validate(&self.catalog, &self.bounds)?;

        if let ArtifactRequest::Gauge { client_id } = request {
            let score = self.client.get_score(*client_id).await?;
            return Ok(ArtifactHandle::Score(score));
        }

        let keys = match request.cache_keys(&self.catalog)? {
            Some(keys) => keys,
            None => {
                return Err(CreditError::InvalidParameter(
                    "request has no storage key".to_string(),
                ))
            }
        };
        let path = self.resolve_image(request, &keys).await?;
        Ok(ArtifactHandle::Image(path))
    }

    /// Layout hint for a bivariate pair. Computed from catalog metadata
    /// only; never triggers a fetch.
    pub fn bivariate_layout_hint(&self, feature_a: &str, feature_b: &str) -> LayoutHint {
        self.catalog.bivariate_layout_hint(feature_a, feature_b)
    }

    /// Warm the store for a batch of requests with bounded concurrency.
    pub async fn prefetch(
        &self,
        requests: Vec<ArtifactRequest>,
        concurrency: usize,
    ) -> PrefetchReport {
        let results: Vec<(ArtifactRequest, CreditResult<ArtifactHandle>)> =
            stream::iter(requests)
                .map(|req| async move {
                    let res = self.get(&req).await;
                    (req, res)
                })
                .buffer_unordered(concurrency.max(1))
                .collect()
                .await;

        let mut report = PrefetchReport::default();
        for (req, res) in results {
            match res {
                Ok(_) => report.resolved += 1,
                Err(e) => {
                    tracing::warn!("prefetch failed for {req:?}: {e}");
                    report.failures.push((req, e));
                }
            }
        }
        report
    }

    async fn resolve_image(
        &self,
        request: &ArtifactRequest,
        keys: &DerivedKeys,
    ) -> CreditResult<PathBuf> {
        let lock = self.key_lock(&keys.lock_token);
        let _guard = lock.lock().await;

        if self.store.exists(&keys.primary) {
            return self.store.read(&keys.primary);
        }
        // A prior session may have stored the same semantic artifact under
        // an equivalent key. Return it under its historical key.
        for alt in &keys.alternates {
            if self.store.exists(alt) {
                tracing::debug!("hit on alternate key {alt}");
                return self.store.read(alt);
            }
        }

        tracing::info!("miss on {}, fetching", keys.primary);
        let bytes = self.fetch_remote(request).await?;
        self.store.write(&keys.primary, &bytes)
    }

    async fn fetch_remote(&self, request: &ArtifactRequest) -> CreditResult<Vec<u8>> {
        match request {
            ArtifactRequest::GlobalImpact { max_features } => {
                self.client.stream_global_impact(*max_features).await
            }
            ArtifactRequest::LocalImpact {
                client_id,
                max_features,
            } => {
                self.client
                    .stream_local_impact(*client_id, *max_features)
                    .await
            }
            ArtifactRequest::SingleFeature { client_id, feature } => {
                self.client.stream_single_feature(*client_id, feature).await
            }
            ArtifactRequest::BivariatePair {
                feature_a,
                feature_b,
            } => self.client.stream_bivariate(feature_a, feature_b).await,
            ArtifactRequest::Gauge { .. } => Err(CreditError::InvalidParameter(
                "gauge requests are never fetched as blobs".to_string(),
            )),
        }
    }

    fn key_lock(&self, token: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(token.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
