//! `creditlens cache` — inspect or empty the artifact scratch directory.

use anyhow::{Context, Result};
use creditlens::{ArtifactStore, Config};

use crate::cli::output;

pub async fn run_stats(config: &Config) -> Result<()> {
    let store = ArtifactStore::open(&config.cache_dir)
        .with_context(|| format!("opening cache at {}", config.cache_dir.display()))?;
    let entries = store.entries().context("listing cached artifacts")?;
    let total: u64 = entries.iter().map(|e| e.bytes).sum();

    if output::is_json() {
        let listed: Vec<serde_json::Value> = entries
            .iter()
            .map(|e| serde_json::json!({"name": e.name, "bytes": e.bytes}))
            .collect();
        output::print_json(&serde_json::json!({
            "dir": store.root().display().to_string(),
            "count": entries.len(),
            "total_bytes": total,
            "entries": listed,
        }));
        return Ok(());
    }

    for e in &entries {
        println!("{:>10}  {}", e.bytes, e.name);
    }
    if !output::is_quiet() {
        println!(
            "{} artifacts, {} bytes in {}",
            entries.len(),
            total,
            store.root().display()
        );
    }
    Ok(())
}

pub async fn run_clear(config: &Config) -> Result<()> {
    let store = ArtifactStore::open(&config.cache_dir)
        .with_context(|| format!("opening cache at {}", config.cache_dir.display()))?;
    let removed = store.clear().context("clearing cache")?;

    if output::is_json() {
        output::print_json(&serde_json::json!({ "removed": removed }));
        return Ok(());
    }
    println!("removed {removed} artifacts");
    Ok(())
}
