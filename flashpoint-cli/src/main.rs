//! Flashpoint CLI
//!
//! Conflict-signal aggregation and threat scoring from open sources.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use flashpoint_core::{Clock, SystemClock, ThreatLevel};
use flashpoint_runtime::{AggregationService, CachedResult, FlashpointConfig, ThreatSnapshot};
use flashpoint_sources::{default_event_sources, default_hint_sources, AcledConfig, SourceSettings};

#[derive(Parser)]
#[command(name = "flashpoint")]
#[command(author, version, about = "Flashpoint: conflict signal aggregation and threat scoring", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,

    /// TOML configuration file
    #[arg(short, long, env = "FLASHPOINT_CONFIG")]
    config: Option<PathBuf>,

    /// ACLED access key (or set ACLED_API_KEY env var)
    #[arg(long, env = "ACLED_API_KEY", hide_env_values = true)]
    acled_key: Option<String>,

    /// ACLED registered email (or set ACLED_EMAIL env var)
    #[arg(long, env = "ACLED_EMAIL")]
    acled_email: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the threat list once and print it as JSON
    Snapshot {
        /// Bypass the result cache
        #[arg(long)]
        force: bool,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Recompute periodically and report when the threat list changes
    Watch {
        /// Seconds between recomputations
        #[arg(long, default_value = "300")]
        every: u64,
    },

    /// Probe every provider once and report reachability
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // stdout carries the JSON output
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let service = build_service(&cli)?;

    match cli.command {
        Commands::Snapshot { force, pretty } => {
            run_snapshot(&service, force, pretty).await?;
        }
        Commands::Watch { every } => {
            run_watch(&service, every).await?;
        }
        Commands::Status => {
            check_status(&service).await;
        }
    }

    Ok(())
}

fn build_service(cli: &Cli) -> Result<AggregationService> {
    let config = match &cli.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            FlashpointConfig::load(path)?
        }
        None => FlashpointConfig::default(),
    };

    let settings = SourceSettings {
        acled: AcledConfig::default().with_credentials(cli.acled_key.clone(), cli.acled_email.clone()),
        ..Default::default()
    }
    .with_timeout(config.service.adapter_timeout_secs);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let events = default_event_sources(&settings)?;
    let hints = default_hint_sources(&settings, clock.clone())?;

    Ok(AggregationService::new(config, events, hints, clock))
}

async fn run_snapshot(service: &AggregationService, force: bool, pretty: bool) -> Result<()> {
    let snapshot = if force {
        service.refresh().await
    } else {
        service.query().await
    };

    let json = if pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };
    println!("{}", json);
    Ok(())
}

async fn run_watch(service: &AggregationService, every: u64) -> Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(every.max(1)));
    let mut last_fingerprint: Option<String> = None;

    info!("Watching every {}s (Ctrl-C to stop)", every);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let result = service.result(true).await;
                if last_fingerprint.as_deref() != Some(result.fingerprint.as_str()) {
                    println!("{}", summary_line(&result));
                    last_fingerprint = Some(result.fingerprint.clone());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watch");
                break;
            }
        }
    }

    Ok(())
}

fn summary_line(result: &CachedResult) -> String {
    let count = |level: ThreatLevel| result.records.iter().filter(|r| r.level == level).count();
    let top: Vec<String> = result
        .records
        .iter()
        .take(3)
        .map(|r| format!("{} ({} {})", r.name, r.level.as_str(), r.score))
        .collect();
    let snapshot = ThreatSnapshot::from_result(result);

    format!(
        "{} [{}] {} threats: {} critical, {} high, {} elevated | {} countries | top: {}{}",
        result.computed_at.format("%Y-%m-%d %H:%M:%S"),
        result.fingerprint,
        result.records.len(),
        count(ThreatLevel::Critical),
        count(ThreatLevel::High),
        count(ThreatLevel::Elevated),
        snapshot.affected_entity_codes.len(),
        top.join(", "),
        if result.from_fallback { " | static fallback" } else { "" }
    )
}

async fn check_status(service: &AggregationService) {
    println!("Probing providers...\n");

    for status in service.probe_sources().await {
        if status.ok {
            println!(
                "✅ {:<14} {:<6} {:>4} results in {}ms",
                status.name, status.kind, status.count, status.elapsed_ms
            );
        } else {
            println!(
                "❌ {:<14} {:<6} {}",
                status.name,
                status.kind,
                status.error.unwrap_or_default()
            );
        }
    }
}
