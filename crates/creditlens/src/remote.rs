//! HTTP boundary to the scoring and explanation service.
//!
//! One scalar-JSON endpoint family (score, id list, feature lists, feature
//! selection) and four binary-stream endpoints (global impact, local impact,
//! single feature, bivariate). Every call is bounded by a timeout and maps
//! failures onto the retrieval-layer taxonomy. No automatic retry: failures
//! surface to the caller unmodified.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::catalog::FeatureCatalog;
use crate::types::{ClientId, CreditError, CreditResult, SelectionFilter};

/// Default bound on a remote call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Bound on the bivariate endpoint, the heaviest server-side computation.
pub const BIVARIATE_TIMEOUT: Duration = Duration::from_secs(60);

/// Operations exposed by the scoring service.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    async fn list_client_ids(&self) -> CreditResult<Vec<ClientId>>;

    async fn list_feature_catalog(&self) -> CreditResult<FeatureCatalog>;

    async fn list_feature_selection(
        &self,
        client_id: ClientId,
        rank_by_client_impact: bool,
        filter: SelectionFilter,
    ) -> CreditResult<Vec<String>>;

    /// Model score for one application, in `[0, 1]`.
    async fn get_score(&self, client_id: ClientId) -> CreditResult<f64>;

    async fn stream_global_impact(&self, max_features: u32) -> CreditResult<Vec<u8>>;

    async fn stream_local_impact(
        &self,
        client_id: ClientId,
        max_features: u32,
    ) -> CreditResult<Vec<u8>>;

    async fn stream_single_feature(
        &self,
        client_id: ClientId,
        feature: &str,
    ) -> CreditResult<Vec<u8>>;

    async fn stream_bivariate(&self, feature_a: &str, feature_b: &str) -> CreditResult<Vec<u8>>;
}

#[derive(Deserialize)]
struct ClientListPayload {
    id_list: Vec<ClientId>,
}

#[derive(Deserialize)]
struct FeatureListsPayload {
    all: Vec<String>,
    cat: Vec<String>,
    num: Vec<String>,
}

#[derive(Deserialize)]
struct SelectionPayload {
    feature_selection: Vec<String>,
}

#[derive(Deserialize)]
struct ScorePayload {
    score: f64,
}

/// reqwest-backed client for the scoring service.
#[derive(Debug, Clone)]
pub struct HttpRemoteClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
    bivariate_timeout: Duration,
}

impl HttpRemoteClient {
    /// Create a client for the given base URL with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            timeout: DEFAULT_TIMEOUT,
            bivariate_timeout: BIVARIATE_TIMEOUT,
        }
    }

    /// Override both timeouts. Mostly for tests.
    pub fn with_timeouts(mut self, timeout: Duration, bivariate_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.bivariate_timeout = bivariate_timeout;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> CreditResult<T> {
        let url = self.url(path);
        tracing::debug!("GET {url}");
        let resp = self
            .client
            .get(&url)
            .query(query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(map_transport_error)?;
        let resp = check_status(resp).await?;
        resp.json::<T>().await.map_err(map_transport_error)
    }

    /// Fetch a binary endpoint, draining the body completely before
    /// returning. A timeout mid-body surfaces as `Timeout` and no bytes
    /// reach the caller, so a truncated stream can never be persisted.
    async fn get_bytes(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> CreditResult<Vec<u8>> {
        let url = self.url(path);
        tracing::debug!("GET {url} (stream)");
        let resp = self
            .client
            .get(&url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_transport_error)?;
        let resp = check_status(resp).await?;
        let bytes = resp.bytes().await.map_err(map_transport_error)?;
        Ok(bytes.to_vec())
    }
}

async fn check_status(resp: reqwest::Response) -> CreditResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(CreditError::ServerError {
        status: status.as_u16(),
        body,
    })
}

fn map_transport_error(e: reqwest::Error) -> CreditError {
    if e.is_timeout() {
        CreditError::Timeout(e.to_string())
    } else if e.is_decode() {
        CreditError::Json(e.to_string())
    } else {
        CreditError::Unreachable(e.to_string())
    }
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    async fn list_client_ids(&self) -> CreditResult<Vec<ClientId>> {
        let payload: ClientListPayload = self.get_json("clients_list", &[]).await?;
        Ok(payload.id_list)
    }

    async fn list_feature_catalog(&self) -> CreditResult<FeatureCatalog> {
        let payload: FeatureListsPayload = self.get_json("feature_lists", &[]).await?;
        FeatureCatalog::new(payload.all, payload.cat, payload.num)
    }

    async fn list_feature_selection(
        &self,
        client_id: ClientId,
        rank_by_client_impact: bool,
        filter: SelectionFilter,
    ) -> CreditResult<Vec<String>> {
        let payload: SelectionPayload = self
            .get_json(
                &format!("{client_id}/feature_selection"),
                &[
                    ("is_wf", rank_by_client_impact.to_string()),
                    ("filter", filter.as_query_value().to_string()),
                ],
            )
            .await?;
        Ok(payload.feature_selection)
    }

    async fn get_score(&self, client_id: ClientId) -> CreditResult<f64> {
        let payload: ScorePayload = self.get_json(&format!("{client_id}"), &[]).await?;
        Ok(payload.score)
    }

    async fn stream_global_impact(&self, max_features: u32) -> CreditResult<Vec<u8>> {
        self.get_bytes(
            "global_impact",
            &[("max_feat", max_features.to_string())],
            self.timeout,
        )
        .await
    }

    async fn stream_local_impact(
        &self,
        client_id: ClientId,
        max_features: u32,
    ) -> CreditResult<Vec<u8>> {
        self.get_bytes(
            &format!("{client_id}/local_impact"),
            &[("max_feat", max_features.to_string())],
            self.timeout,
        )
        .await
    }

    async fn stream_single_feature(
        &self,
        client_id: ClientId,
        feature: &str,
    ) -> CreditResult<Vec<u8>> {
        self.get_bytes(
            &format!("{client_id}/feature"),
            &[("feature", feature.to_string())],
            self.timeout,
        )
        .await
    }

    async fn stream_bivariate(&self, feature_a: &str, feature_b: &str) -> CreditResult<Vec<u8>> {
        self.get_bytes(
            "graph_bivar",
            &[
                ("feature_1", feature_a.to_string()),
                ("feature_2", feature_b.to_string()),
            ],
            self.bivariate_timeout,
        )
        .await
    }
}
