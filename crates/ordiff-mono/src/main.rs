//! Command-line entry point for the indexer comparator.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info, LevelFilter};
use tokio::signal;

use ordiff_compare::{
    Blockchain, CompareConfig, IndexerComparator, Protocol, RetryPolicy, RunSummary,
    ShutdownCoordinator,
};
use ordiff_mono::adapters::HttpIndexerApi;

/// Compare block receipts from two indexers for verification and QA.
#[derive(Parser, Debug, Clone)]
#[command(name = "ordiff", version, about, long_about = None)]
struct Args {
    /// URL of the primary indexer endpoint (reference)
    #[arg(short = 'p', long)]
    primary_endpoint: String,
    /// URL of the secondary indexer endpoint (to verify)
    #[arg(short = 's', long)]
    secondary_endpoint: String,
    /// Protocol to compare (ORDINAL or BRC20)
    #[arg(short = 'm', long)]
    protocol: Protocol,
    /// Blockchain to compare (BITCOIN or FRACTAL)
    #[arg(short = 'c', long = "chain")]
    blockchain: Blockchain,
    /// Starting block height (default: first protocol-specific block)
    #[arg(long)]
    start_block: Option<u32>,
    /// Ending block height (default: latest common block)
    #[arg(long)]
    end_block: Option<u32>,
    /// Number of concurrent comparison workers
    #[arg(long, default_value_t = 100)]
    workers: usize,
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
    /// Path to a log file (default: log to console)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::builder();
    builder.format_timestamp_secs().filter_level(level);
    if let Some(path) = log_file {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("could not create log directory {}", dir.display()))?;
        }
        let file = std::fs::File::create(path)
            .with_context(|| format!("could not open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

/// Register the interrupt handler. The first Ctrl-C requests a graceful
/// shutdown; further interrupts before the run stops are ignored.
fn register_signal_handler(shutdown: ShutdownCoordinator) {
    tokio::spawn(async move {
        loop {
            match signal::ctrl_c().await {
                Ok(()) => {
                    if shutdown.request_shutdown() {
                        info!("interrupt received, initiating graceful shutdown...");
                    } else {
                        debug!("interrupt ignored, shutdown already in progress");
                    }
                }
                Err(err) => {
                    error!("error listening for interrupt signals: {}", err);
                    break;
                }
            }
        }
    });
}

async fn run(args: Args, shutdown: ShutdownCoordinator) -> Result<RunSummary> {
    info!(
        "starting comparison of {} against {} ({} {})",
        args.secondary_endpoint, args.primary_endpoint, args.blockchain, args.protocol
    );
    info!("system has {} CPU cores available", num_cpus::get());

    let primary = HttpIndexerApi::new(&args.primary_endpoint, args.protocol)?;
    let secondary = HttpIndexerApi::new(&args.secondary_endpoint, args.protocol)?;

    let config = CompareConfig {
        start_block: args.start_block,
        end_block: args.end_block,
        workers: args.workers,
        retry: RetryPolicy::default(),
    };

    let comparator = IndexerComparator::new(
        primary,
        secondary,
        args.blockchain,
        args.protocol,
        config,
        shutdown,
    )?;
    let summary = comparator.run().await?;
    Ok(summary)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(err) = init_logging(args.log_level, args.log_file.as_deref()) {
        eprintln!("warning: could not configure logging: {}", err);
    }

    let shutdown = ShutdownCoordinator::default();
    register_signal_handler(shutdown.clone());

    let exit_code = match run(args, shutdown).await {
        Ok(summary) if summary.interrupted => {
            info!("run interrupted by user");
            130
        }
        Ok(_) => 0,
        Err(err) => {
            error!("fatal error: {:#}", err);
            1
        }
    };
    std::process::exit(exit_code);
}
