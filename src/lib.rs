//! ordiff end-to-end test suite
//!
//! This crate exercises the full comparison engine from `ordiff-compare`
//! against in-memory mock endpoints: matched and mismatched runs,
//! normalization effects, retry exhaustion, and interrupt-driven shutdown.

pub mod tests;

// Re-export the receipt fixture builder for external use
pub use tests::receipt_builder::ReceiptBuilder;
