//! Differential comparison engine for ordinals/BRC20 indexers.
//!
//! This crate walks a range of block heights, fetches the block-receipt
//! artifact for each height from a primary (reference) indexer and a
//! secondary indexer under test, normalizes both payloads per protocol, and
//! reports structural discrepancies between them.
//!
//! The engine is generic over [`IndexerApiAdapter`], so transports (HTTP,
//! in-memory mocks) are pluggable. See [`IndexerComparator`] for the
//! orchestration entry point.

pub mod chain;
pub mod compare;
pub mod diff;
pub mod error;
pub mod protocols;
pub mod range;
pub mod retry;
pub mod shutdown;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

#[cfg(any(test, feature = "test-utils"))]
pub use mock::*;

pub use chain::*;
pub use compare::*;
pub use diff::*;
pub use error::*;
pub use protocols::*;
pub use range::*;
pub use retry::*;
pub use shutdown::*;
pub use traits::*;
pub use types::*;
