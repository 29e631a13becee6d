//! `creditlens select <client_id>` — feature-selection list.

use anyhow::{bail, Context, Result};
use creditlens::{Config, HttpRemoteClient, RemoteClient, SelectionFilter};

use crate::cli::output;

pub async fn run(config: &Config, client_id: i64, by_impact: bool, filter: &str) -> Result<()> {
    let filter = match filter {
        "current" => SelectionFilter::Current,
        "previous" => SelectionFilter::Previous,
        "all" => SelectionFilter::All,
        other => bail!("unknown filter {other:?}, expected current, previous or all"),
    };

    let client = HttpRemoteClient::new(&config.server_url);
    let features = client
        .list_feature_selection(client_id, by_impact, filter)
        .await
        .with_context(|| format!("listing feature selection for client {client_id}"))?;

    if output::is_json() {
        output::print_json(&serde_json::json!({ "feature_selection": features }));
        return Ok(());
    }

    for f in &features {
        println!("{f}");
    }
    Ok(())
}
