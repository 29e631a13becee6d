//! `creditlens score <client_id>` — gauge scalar and verdict.

use anyhow::{Context, Result};
use creditlens::{Config, HttpRemoteClient, RemoteClient, ScoreVerdict};

use crate::cli::output;

pub async fn run(config: &Config, client_id: i64) -> Result<()> {
    let client = HttpRemoteClient::new(&config.server_url);
    let score = client
        .get_score(client_id)
        .await
        .with_context(|| format!("scoring client {client_id}"))?;
    let verdict = ScoreVerdict::from_score(score);

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "client_id": client_id,
            "score": score,
            "verdict": verdict,
        }));
        return Ok(());
    }

    println!("client {client_id}: score {score:.3}");
    match verdict {
        ScoreVerdict::Accepted => println!("credit accepted"),
        ScoreVerdict::Refused => println!("credit refused"),
    }
    Ok(())
}
