//! CreditLens: artifact-caching retrieval layer for a credit-scoring
//! dashboard.
//!
//! Dashboard visualizations (feature-impact plots, bivariate analyses) are
//! rendered by a remote scoring service and expensive to recompute. This
//! crate derives a deterministic cache key from each request's semantic
//! parameters, serves repeats from a durable local store, and fetches each
//! distinct artifact at most once. Gauge scores stay live and uncached.

pub mod catalog;
pub mod config;
pub mod fetcher;
pub mod remote;
pub mod request;
pub mod session;
pub mod store;
pub mod types;

pub use catalog::{ClientIdRegistry, FeatureCatalog};
pub use config::{Config, DEFAULT_SERVER_URL};
pub use fetcher::{CachingFetcher, PrefetchReport};
pub use remote::{HttpRemoteClient, RemoteClient, BIVARIATE_TIMEOUT, DEFAULT_TIMEOUT};
pub use request::{ArtifactRequest, CacheKey, DerivedKeys, FeatureBounds};
pub use session::Session;
pub use store::{ArtifactStore, StoredArtifact};
pub use types::*;
