//! `creditlens features` — show the feature catalog.

use anyhow::{bail, Context, Result};
use creditlens::{Config, FeatureKind, HttpRemoteClient, RemoteClient};

use crate::cli::output;

pub async fn run(config: &Config, kind: &str) -> Result<()> {
    let client = HttpRemoteClient::new(&config.server_url);
    let catalog = client
        .list_feature_catalog()
        .await
        .context("loading feature catalog")?;

    let wanted = match kind {
        "all" => None,
        "cat" => Some(FeatureKind::Categorical),
        "num" => Some(FeatureKind::Numeric),
        other => bail!("unknown kind {other:?}, expected cat, num or all"),
    };

    let selected: Vec<&String> = catalog
        .all()
        .iter()
        .filter(|f| wanted.map_or(true, |w| catalog.classify(f) == w))
        .collect();

    if output::is_json() {
        let entries: Vec<serde_json::Value> = selected
            .iter()
            .map(|f| {
                let kind = match catalog.classify(f) {
                    FeatureKind::Categorical => "categorical",
                    FeatureKind::Numeric => "numeric",
                    FeatureKind::Unknown => "unknown",
                };
                serde_json::json!({ "name": f, "kind": kind })
            })
            .collect();
        output::print_json(&serde_json::json!({ "features": entries }));
        return Ok(());
    }

    for f in &selected {
        println!("{f}");
    }
    if !output::is_quiet() {
        println!("{} of {} features", selected.len(), catalog.len());
    }
    Ok(())
}
