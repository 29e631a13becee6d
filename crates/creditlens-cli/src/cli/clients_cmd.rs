//! `creditlens clients` — list valid client identifiers.

use anyhow::{Context, Result};
use creditlens::{Config, HttpRemoteClient, RemoteClient};

use crate::cli::output;

pub async fn run(config: &Config) -> Result<()> {
    let client = HttpRemoteClient::new(&config.server_url);
    let ids = client
        .list_client_ids()
        .await
        .context("listing client ids")?;

    if output::is_json() {
        output::print_json(&serde_json::json!({ "id_list": ids }));
        return Ok(());
    }

    for id in &ids {
        println!("{id}");
    }
    if !output::is_quiet() {
        println!("{} clients", ids.len());
    }
    Ok(())
}
