//! CreditLens command-line controller.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use creditlens::{ArtifactRequest, Config};
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(
    name = "creditlens",
    about = "CreditLens, cached retrieval for the credit-scoring dashboard",
    version,
    after_help = "Run 'creditlens <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Scoring service base URL (overrides CREDITLENS_SERVER_URL)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Artifact cache directory (overrides CREDITLENS_CACHE_DIR)
    #[arg(long, global = true)]
    cache_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List valid client identifiers
    Clients,
    /// Show the feature catalog
    Features {
        /// Restrict to one kind (cat, num, all)
        #[arg(long, default_value = "all")]
        kind: String,
    },
    /// Score one application and print the verdict
    Score {
        /// Client identifier
        client_id: i64,
    },
    /// List features for the selection menus
    Select {
        /// Client identifier
        client_id: i64,
        /// Rank by impact on this client's score
        #[arg(long)]
        by_impact: bool,
        /// Restrict the list (current, previous, all)
        #[arg(long, default_value = "current")]
        filter: String,
    },
    /// Fetch one artifact through the cache and print its local path
    Fetch {
        #[command(subcommand)]
        what: FetchWhat,
    },
    /// Warm the cache for one client
    Prefetch {
        /// Client identifier
        client_id: i64,
        /// Feature count for the impact artifacts
        #[arg(long, default_value = "16")]
        max_feat: u32,
        /// How many top-impact features to warm
        #[arg(long, default_value = "8")]
        top: usize,
        /// Concurrent fetches
        #[arg(long, default_value = "4")]
        concurrency: usize,
    },
    /// Inspect or empty the artifact cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum FetchWhat {
    /// Population-wide feature impact
    Global {
        /// Number of features on the plot
        #[arg(long, default_value = "20")]
        max_feat: u32,
    },
    /// Client-specific feature impact
    Local {
        client_id: i64,
        /// Number of features on the plot
        #[arg(long, default_value = "16")]
        max_feat: u32,
    },
    /// Impact scatter for a single feature
    Feature { client_id: i64, feature: String },
    /// Bivariate analysis of two distinct features
    Bivar { feature_a: String, feature_b: String },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show cached artifacts and their sizes
    Stats,
    /// Delete every cached artifact
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var("CREDITLENS_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("CREDITLENS_QUIET", "1");
    }

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::resolve(cli.server.as_deref(), cli.cache_dir.as_deref())?;

    let result = match cli.command {
        Commands::Clients => cli::clients_cmd::run(&config).await,
        Commands::Features { kind } => cli::features_cmd::run(&config, &kind).await,
        Commands::Score { client_id } => cli::score_cmd::run(&config, client_id).await,
        Commands::Select {
            client_id,
            by_impact,
            filter,
        } => cli::select_cmd::run(&config, client_id, by_impact, &filter).await,
        Commands::Fetch { what } => {
            let request = match what {
                FetchWhat::Global { max_feat } => ArtifactRequest::GlobalImpact {
                    max_features: max_feat,
                },
                FetchWhat::Local {
                    client_id,
                    max_feat,
                } => ArtifactRequest::LocalImpact {
                    client_id,
                    max_features: max_feat,
                },
                FetchWhat::Feature { client_id, feature } => {
                    ArtifactRequest::SingleFeature { client_id, feature }
                }
                FetchWhat::Bivar {
                    feature_a,
                    feature_b,
                } => ArtifactRequest::BivariatePair {
                    feature_a,
                    feature_b,
                },
            };
            cli::fetch_cmd::run(&config, request).await
        }
        Commands::Prefetch {
            client_id,
            max_feat,
            top,
            concurrency,
        } => cli::prefetch_cmd::run(&config, client_id, max_feat, top, concurrency).await,
        Commands::Cache { action } => match action {
            CacheAction::Stats => cli::cache_cmd::run_stats(&config).await,
            CacheAction::Clear => cli::cache_cmd::run_clear(&config).await,
        },
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "creditlens", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli::output::is_quiet() && !cli::output::is_json() {
            eprintln!("Error: {e:#}");
        }
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }
    result
}
