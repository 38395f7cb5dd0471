//! Common types for ordiff-compare

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Chain metadata reported by a single indexer endpoint.
///
/// Fetched once at startup and immutable for the lifetime of a run. The wire
/// field for the latest fully-indexed height is `ordBlockHeight`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    pub network: String,
    #[serde(rename = "ordBlockHeight")]
    pub latest_height: u32,
}

/// Inclusive range of block heights to compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub start: u32,
    pub end: u32,
}

impl BlockRange {
    /// Number of heights in the range. Callers uphold `end >= start`.
    pub fn block_count(&self) -> u64 {
        (self.end - self.start) as u64 + 1
    }
}

impl fmt::Display for BlockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Bounded exponential-backoff retry policy.
///
/// Attempt `i` (1-indexed) sleeps `backoff_base * backoff_factor^(i-1)`
/// before attempt `i+1`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub backoff_factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_base: Duration::from_secs(1),
            backoff_factor: 2,
        }
    }
}

impl RetryPolicy {
    /// Backoff to sleep after a failed attempt (1-indexed).
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_base * self.backoff_factor.pow(attempt.saturating_sub(1))
    }
}

/// Configuration for a comparison run.
#[derive(Debug, Clone)]
pub struct CompareConfig {
    /// Starting block height override (default: protocol activation height)
    pub start_block: Option<u32>,
    /// Ending block height override (default: latest common indexed height)
    pub end_block: Option<u32>,
    /// Maximum number of concurrently active comparison tasks
    pub workers: usize,
    /// Retry policy applied to each receipt fetch
    pub retry: RetryPolicy,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            start_block: None,
            end_block: None,
            workers: 100,
            retry: RetryPolicy::default(),
        }
    }
}

/// Classification of a single structural difference between two receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscrepancyKind {
    Added,
    Removed,
    Changed,
    MissingOnPrimary,
    MissingOnSecondary,
}

impl fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiscrepancyKind::Added => "added",
            DiscrepancyKind::Removed => "removed",
            DiscrepancyKind::Changed => "changed",
            DiscrepancyKind::MissingOnPrimary => "missing on primary",
            DiscrepancyKind::MissingOnSecondary => "missing on secondary",
        };
        f.write_str(label)
    }
}

/// One structural difference, anchored at a path into the receipt tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discrepancy {
    pub kind: DiscrepancyKind,
    pub path: String,
    pub detail: String,
}

impl Discrepancy {
    /// Protocol-tagged human-readable line for reporting.
    pub fn describe(&self, protocol: &str) -> String {
        format!(
            "{} discrepancy: {} - {}: {}",
            protocol, self.kind, self.path, self.detail
        )
    }
}

/// Verdict for one block: matched iff no discrepancies were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonResult {
    pub matched: bool,
    pub discrepancies: Vec<Discrepancy>,
}

impl ComparisonResult {
    pub fn matching() -> Self {
        Self {
            matched: true,
            discrepancies: Vec::new(),
        }
    }

    pub fn from_discrepancies(discrepancies: Vec<Discrepancy>) -> Self {
        Self {
            matched: discrepancies.is_empty(),
            discrepancies,
        }
    }
}

/// Terminal state of a single per-height comparison task.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    /// Both receipts were fetched and diffed
    Completed(ComparisonResult),
    /// The block was skipped before fetching (e.g. hash resolution failed)
    Skipped(String),
    /// A fetch failed after exhausting retries, or the task errored
    Failed(String),
    /// The task observed the shutdown signal and abandoned its work
    Cancelled,
}

/// Aggregate metrics for a completed (or interrupted) run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub range: BlockRange,
    pub completed: u64,
    pub matched: u64,
    pub mismatched: u64,
    pub skipped: u64,
    pub failed: u64,
    pub cancelled: u64,
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Heights whose task ran to a productive terminal state.
    pub fn blocks_processed(&self) -> u64 {
        self.completed + self.skipped + self.failed
    }
}
