//! Block-range resolution.

use log::info;

use crate::chain::{Blockchain, Protocol};
use crate::error::{CompareError, CompareResult};
use crate::types::BlockRange;

/// Resolve the inclusive height range to compare.
///
/// Start is the user override if given, else the protocol's activation height
/// on the selected chain. End is the user override if given and strictly
/// below the lowest latest height reported by the two endpoints, else that
/// minimum — comparing beyond it would compare against not-yet-indexed data.
pub fn resolve_range(
    start_override: Option<u32>,
    end_override: Option<u32>,
    blockchain: Blockchain,
    protocol: Protocol,
    primary_latest: u32,
    secondary_latest: u32,
) -> CompareResult<BlockRange> {
    let start = start_override.unwrap_or_else(|| protocol.activation_height(blockchain));

    let min_latest = primary_latest.min(secondary_latest);
    let end = match end_override {
        Some(end) if end < min_latest => {
            info!(
                "using specified end block {} (less than latest common block {})",
                end, min_latest
            );
            end
        }
        _ => min_latest,
    };

    if end < start {
        return Err(CompareError::Config(format!(
            "end block {} is less than start block {}. Please check parameters.",
            end, start
        )));
    }

    Ok(BlockRange { start, end })
}
