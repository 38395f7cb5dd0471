//! The comparison engine.
//!
//! [`IndexerComparator`] owns two endpoint adapters and drives the full run:
//! validate that both endpoints serve the expected network, resolve the
//! height range, then dispatch one comparison task per height under a
//! bounded concurrency limit. Each task resolves the block hash, fetches
//! both receipts concurrently (each retried with backoff), normalizes them
//! per protocol and diffs the results. A cancellation token threads through
//! the scheduler and every task, so an external interrupt halts admission
//! and drains in-flight work within a bounded window.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, info, warn};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::chain::{Blockchain, Protocol};
use crate::error::{CompareError, CompareResult};
use crate::protocols::{comparator_for, BlockComparator};
use crate::range::resolve_range;
use crate::retry::execute_with_retry;
use crate::shutdown::ShutdownCoordinator;
use crate::traits::IndexerApiAdapter;
use crate::types::{
    BlockRange, ChainInfo, CompareConfig, RetryPolicy, RunSummary, TaskOutcome,
};

/// Orchestrates a differential comparison run between two indexer endpoints.
pub struct IndexerComparator<P, S>
where
    P: IndexerApiAdapter + 'static,
    S: IndexerApiAdapter + 'static,
{
    primary: Arc<P>,
    secondary: Arc<S>,
    blockchain: Blockchain,
    protocol: Protocol,
    comparator: Arc<dyn BlockComparator>,
    config: CompareConfig,
    shutdown: ShutdownCoordinator,
    progress: Arc<AtomicU64>,
}

impl<P, S> IndexerComparator<P, S>
where
    P: IndexerApiAdapter + 'static,
    S: IndexerApiAdapter + 'static,
{
    pub fn new(
        primary: P,
        secondary: S,
        blockchain: Blockchain,
        protocol: Protocol,
        config: CompareConfig,
        shutdown: ShutdownCoordinator,
    ) -> CompareResult<Self> {
        let comparator: Arc<dyn BlockComparator> =
            Arc::from(comparator_for(blockchain, protocol)?);
        Ok(Self {
            primary: Arc::new(primary),
            secondary: Arc::new(secondary),
            blockchain,
            protocol,
            comparator,
            config,
            shutdown,
            progress: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Number of tasks that have reached a terminal state so far.
    pub fn blocks_progressed(&self) -> u64 {
        self.progress.load(Ordering::SeqCst)
    }

    /// Fetch both endpoints' chain info, validate network identity, and
    /// resolve the height range. Performed once, before any block work.
    pub async fn prepare(&self) -> CompareResult<BlockRange> {
        let primary_info = self.primary.get_node_info().await?;
        let secondary_info = self.secondary.get_node_info().await?;
        self.validate_network(&primary_info, &secondary_info)?;

        let range = resolve_range(
            self.config.start_block,
            self.config.end_block,
            self.blockchain,
            self.protocol,
            primary_info.latest_height,
            secondary_info.latest_height,
        )?;

        info!(
            "initialized comparator for {} {} from block {} to {}",
            self.blockchain, self.protocol, range.start, range.end
        );
        Ok(range)
    }

    fn validate_network(
        &self,
        primary: &ChainInfo,
        secondary: &ChainInfo,
    ) -> CompareResult<()> {
        let expected = self.blockchain.network_name();
        if primary.network != expected || secondary.network != expected {
            return Err(CompareError::Config(format!(
                "endpoints are not on the expected network. Expected: {}, primary: {}, secondary: {}",
                expected, primary.network, secondary.network
            )));
        }
        Ok(())
    }

    /// Run the full comparison: startup validation, range resolution, then
    /// the bounded-concurrency sweep over every height.
    pub async fn run(&self) -> CompareResult<RunSummary> {
        let range = self.prepare().await?;
        self.run_range(range).await
    }

    /// Sweep an already-resolved range.
    pub async fn run_range(&self, range: BlockRange) -> CompareResult<RunSummary> {
        let started = Instant::now();
        let token = self.shutdown.token();

        info!(
            "starting comparison from block {} to {} using protocol {} on {} with {} concurrent workers",
            range.start, range.end, self.protocol, self.blockchain, self.config.workers
        );

        let semaphore = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let mut tasks: JoinSet<TaskOutcome> = JoinSet::new();
        let mut tally = OutcomeTally::default();
        let context = TaskContext {
            primary: self.primary.clone(),
            secondary: self.secondary.clone(),
            comparator: self.comparator.clone(),
            retry: self.config.retry.clone(),
            token: token.clone(),
            protocol: self.protocol,
        };

        // Heights are submitted ascending; admission stops (never reorders)
        // once the shutdown token is observed.
        for height in range.start..=range.end {
            if token.is_cancelled() {
                info!("halting submission at height {} due to shutdown signal", height);
                break;
            }
            let permit = tokio::select! {
                _ = token.cancelled() => {
                    info!("halting submission at height {} due to shutdown signal", height);
                    break;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let task_context = context.clone();
            let progress = self.progress.clone();
            tasks.spawn(async move {
                let outcome = task_context.process_block(height).await;
                drop(permit);
                let done = progress.fetch_add(1, Ordering::SeqCst) + 1;
                if done % 1000 == 0 {
                    info!("progress: {} blocks reached a terminal state", done);
                }
                outcome
            });

            // Reap finished tasks as we go so the set stays small on long runs.
            while let Some(joined) = tasks.try_join_next() {
                tally.record(joined);
            }
        }

        // Join the remainder; a shutdown arriving here falls through to the
        // bounded drain below.
        loop {
            if token.is_cancelled() {
                break;
            }
            tokio::select! {
                _ = token.cancelled() => break,
                joined = tasks.join_next() => match joined {
                    Some(result) => tally.record(result),
                    None => break,
                },
            }
        }

        let interrupted = token.is_cancelled();
        if interrupted && !tasks.is_empty() {
            self.shutdown.begin_drain();
            let drain_timeout = self.shutdown.drain_timeout();
            info!(
                "waiting up to {:?} for {} in-flight tasks to terminate",
                drain_timeout,
                tasks.len()
            );
            let drained = tokio::time::timeout(drain_timeout, async {
                while let Some(joined) = tasks.join_next().await {
                    tally.record(joined);
                }
            })
            .await;
            if drained.is_err() {
                warn!(
                    "drain window elapsed with {} tasks still active, abandoning them",
                    tasks.len()
                );
                tasks.abort_all();
            }
        }
        self.shutdown.mark_stopped();

        let summary = tally.into_summary(range, interrupted, started.elapsed());
        self.log_summary(&summary);
        Ok(summary)
    }

    fn log_summary(&self, summary: &RunSummary) {
        let processed = summary.blocks_processed();
        let avg_secs = if processed > 0 {
            summary.elapsed.as_secs_f64() / processed as f64
        } else {
            0.0
        };
        if summary.interrupted {
            info!("comparison interrupted after {:?}", summary.elapsed);
        } else {
            info!("comparison completed in {:?}", summary.elapsed);
        }
        info!(
            "processed {} blocks ({:.4} seconds/block): {} matched, {} mismatched, {} skipped, {} failed, {} cancelled",
            processed,
            avg_secs,
            summary.matched,
            summary.mismatched,
            summary.skipped,
            summary.failed,
            summary.cancelled
        );
        info!("block range: {}", summary.range);
    }
}

/// Per-task view of the engine: everything a single height needs.
struct TaskContext<P, S> {
    primary: Arc<P>,
    secondary: Arc<S>,
    comparator: Arc<dyn BlockComparator>,
    retry: RetryPolicy,
    token: CancellationToken,
    protocol: Protocol,
}

impl<P, S> Clone for TaskContext<P, S> {
    fn clone(&self) -> Self {
        Self {
            primary: self.primary.clone(),
            secondary: self.secondary.clone(),
            comparator: self.comparator.clone(),
            retry: self.retry.clone(),
            token: self.token.clone(),
            protocol: self.protocol,
        }
    }
}

impl<P, S> TaskContext<P, S>
where
    P: IndexerApiAdapter + 'static,
    S: IndexerApiAdapter + 'static,
{
    /// Compare one block height end to end. Never returns an error: every
    /// failure mode is folded into the task's terminal outcome so one bad
    /// block cannot abort the pool.
    async fn process_block(&self, height: u32) -> TaskOutcome {
        if self.token.is_cancelled() {
            return TaskOutcome::Cancelled;
        }

        // Hash resolution is a single attempt; a failure here skips the
        // block without touching either receipts endpoint.
        let block_hash = tokio::select! {
            _ = self.token.cancelled() => return TaskOutcome::Cancelled,
            resolved = self.primary.get_block_hash(height) => match resolved {
                Ok(hash) => hash,
                Err(err) => {
                    warn!("failed to get block hash for height {}: {}", height, err);
                    return TaskOutcome::Skipped(format!("block hash resolution failed: {}", err));
                }
            },
        };

        let primary_desc = format!("primary {} block {}", self.protocol, height);
        let secondary_desc = format!("secondary {} block {}", self.protocol, height);
        let (primary_fetch, secondary_fetch) = tokio::join!(
            execute_with_retry(&primary_desc, &self.retry, &self.token, || {
                self.primary.fetch_block_receipts(&block_hash)
            }),
            execute_with_retry(&secondary_desc, &self.retry, &self.token, || {
                self.secondary.fetch_block_receipts(&block_hash)
            }),
        );

        let (primary_data, secondary_data) = match (primary_fetch, secondary_fetch) {
            (Ok(primary), Ok(secondary)) => (primary, secondary),
            (Err(CompareError::Cancelled), _) | (_, Err(CompareError::Cancelled)) => {
                debug!("block {} task cancelled during shutdown", height);
                return TaskOutcome::Cancelled;
            }
            (Err(err), _) | (_, Err(err)) => {
                error!("error processing block {}: {}", height, err);
                return TaskOutcome::Failed(err.to_string());
            }
        };

        let result = self
            .comparator
            .compare_block_receipts(primary_data, secondary_data);
        if result.matched {
            debug!("block {} ({}) matched successfully", height, block_hash);
        } else {
            warn!("discrepancies found in block {} ({}):", height, block_hash);
            for discrepancy in &result.discrepancies {
                warn!("  {}", discrepancy.describe(self.comparator.protocol_name()));
            }
        }
        TaskOutcome::Completed(result)
    }
}

#[derive(Default)]
struct OutcomeTally {
    completed: u64,
    matched: u64,
    mismatched: u64,
    skipped: u64,
    failed: u64,
    cancelled: u64,
}

impl OutcomeTally {
    fn record(&mut self, joined: Result<TaskOutcome, JoinError>) {
        match joined {
            Ok(TaskOutcome::Completed(result)) => {
                self.completed += 1;
                if result.matched {
                    self.matched += 1;
                } else {
                    self.mismatched += 1;
                }
            }
            Ok(TaskOutcome::Skipped(_)) => self.skipped += 1,
            Ok(TaskOutcome::Failed(_)) => self.failed += 1,
            Ok(TaskOutcome::Cancelled) => self.cancelled += 1,
            Err(err) if err.is_cancelled() => self.cancelled += 1,
            Err(err) => {
                error!("comparison task terminated unexpectedly: {}", err);
                self.failed += 1;
            }
        }
    }

    fn into_summary(
        self,
        range: BlockRange,
        interrupted: bool,
        elapsed: std::time::Duration,
    ) -> RunSummary {
        RunSummary {
            range,
            completed: self.completed,
            matched: self.matched,
            mismatched: self.mismatched,
            skipped: self.skipped,
            failed: self.failed,
            cancelled: self.cancelled,
            interrupted,
            elapsed,
        }
    }
}
