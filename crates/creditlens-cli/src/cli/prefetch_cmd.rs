//! `creditlens prefetch <client_id>` — warm the cache for one client.

use anyhow::{bail, Context, Result};
use creditlens::{
    ArtifactRequest, ArtifactStore, CachingFetcher, Config, HttpRemoteClient, RemoteClient,
    SelectionFilter, Session,
};

use crate::cli::output;

pub async fn run(
    config: &Config,
    client_id: i64,
    max_feat: u32,
    top: usize,
    concurrency: usize,
) -> Result<()> {
    let client = HttpRemoteClient::new(&config.server_url);
    let session = Session::bootstrap(&client)
        .await
        .context("bootstrapping session")?;
    if !session.clients().contains(client_id) {
        bail!("unknown client id {client_id}");
    }

    let selection = client
        .list_feature_selection(client_id, true, SelectionFilter::Current)
        .await
        .context("listing top-impact features")?;

    let store = ArtifactStore::open(&config.cache_dir)
        .with_context(|| format!("opening cache at {}", config.cache_dir.display()))?;
    let fetcher = CachingFetcher::new(session.catalog(), store, client.clone())
        .with_bounds(config.feature_bounds);

    let mut requests = vec![
        ArtifactRequest::GlobalImpact {
            max_features: max_feat,
        },
        ArtifactRequest::LocalImpact {
            client_id,
            max_features: max_feat,
        },
    ];
    requests.extend(
        selection
            .into_iter()
            .take(top)
            .map(|feature| ArtifactRequest::SingleFeature { client_id, feature }),
    );

    let total = requests.len();
    let report = fetcher.prefetch(requests, concurrency).await;

    if output::is_json() {
        let failures: Vec<serde_json::Value> = report
            .failures
            .iter()
            .map(|(req, err)| serde_json::json!({"request": format!("{req:?}"), "error": err.to_string()}))
            .collect();
        output::print_json(&serde_json::json!({
            "resolved": report.resolved,
            "failed": report.failures.len(),
            "failures": failures,
        }));
    } else {
        if !output::is_quiet() {
            println!("{}/{} artifacts ready", report.resolved, total);
        }
        for (req, err) in &report.failures {
            eprintln!("  {req:?}: {err}");
        }
    }

    if !report.failures.is_empty() {
        bail!("{} of {} requests failed", report.failures.len(), total);
    }
    Ok(())
}
