use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use brokerscan_common::{default_roster, removal_candidates, Config, RawBrokerItem, SearchQuery};
use brokerscan_scanner::{
    normalize_one, registry_from_config, BatchScanOrchestrator, HashedLikelihood, ScanPacing,
};

#[derive(Parser)]
#[command(name = "scan", about = "Search data broker sites for a person's records")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the broker roster in batches
    Scan {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// "City, ST" or ZIP
        #[arg(long)]
        address: Option<String>,
        /// Highest broker priority to include (overrides SCAN_PRIORITY)
        #[arg(long)]
        priority: Option<u8>,
        /// Brokers per batch (overrides SCAN_BATCH_SIZE)
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Normalize a JSON array of raw items from one source
    Normalize {
        #[arg(long)]
        source: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("brokerscan=info,apify_client=info,skiptrace_client=info")
    });
    if cli.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    match cli.command {
        Command::Scan {
            name,
            phone,
            email,
            address,
            priority,
            batch_size,
        } => {
            let config = Config::from_env()?;
            let query = SearchQuery {
                full_name: name,
                phone,
                email,
                address,
            };

            let mut options = config.scan_options();
            if let Some(p) = priority {
                options.priority = p;
            }
            if let Some(b) = batch_size {
                options.batch_size = b;
            }

            let registry = registry_from_config(&config, Arc::new(HashedLikelihood))?;
            let orchestrator = BatchScanOrchestrator::new(default_roster(), registry)
                .with_pacing(ScanPacing {
                    batch_cooldown: config.batch_cooldown,
                    call_timeout: config.broker_timeout,
                });

            let summary = orchestrator.scan(&query, options).await?;
            let removals = removal_candidates(&summary);
            info!(removal_candidates = removals.len(), "Scan finished");

            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Normalize { source, name, file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let items: Vec<RawBrokerItem> = serde_json::from_str(&raw)
                .with_context(|| format!("{} must hold a JSON array of objects", file.display()))?;

            let result = normalize_one(&source, &SearchQuery::new(&name), &items)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
