//! `creditlens fetch` — resolve one artifact through the cache.

use anyhow::{Context, Result};
use creditlens::{
    ArtifactHandle, ArtifactRequest, ArtifactStore, CachingFetcher, Config, HttpRemoteClient,
    LayoutHint, Session,
};

use crate::cli::output;

pub async fn run(config: &Config, request: ArtifactRequest) -> Result<()> {
    let client = HttpRemoteClient::new(&config.server_url);
    let session = Session::bootstrap(&client)
        .await
        .context("bootstrapping session")?;
    let store = ArtifactStore::open(&config.cache_dir)
        .with_context(|| format!("opening cache at {}", config.cache_dir.display()))?;
    let fetcher =
        CachingFetcher::new(session.catalog(), store, client).with_bounds(config.feature_bounds);

    // Presentation hint only. Derived from catalog metadata, independent of
    // whether the artifact is cached yet.
    let hint = match &request {
        ArtifactRequest::BivariatePair {
            feature_a,
            feature_b,
        } => Some(fetcher.bivariate_layout_hint(feature_a, feature_b)),
        _ => None,
    };

    let handle = fetcher.get(&request).await.context("fetching artifact")?;

    match handle {
        ArtifactHandle::Image(path) => {
            if output::is_json() {
                output::print_json(&serde_json::json!({
                    "path": path.display().to_string(),
                    "layout": hint,
                }));
                return Ok(());
            }
            println!("{}", path.display());
            if let Some(hint) = hint {
                let name = match hint {
                    LayoutHint::Large => "large",
                    LayoutHint::Normal => "normal",
                };
                println!("layout: {name}");
            }
        }
        ArtifactHandle::Score(score) => {
            // Gauge requests are not reachable from `fetch`, but print
            // something sensible rather than erroring.
            println!("score {score:.3}");
        }
    }
    Ok(())
}
