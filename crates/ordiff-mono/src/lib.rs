//! # ordiff-mono: indexer comparison CLI
//!
//! Monolithic binary wiring the generic comparison engine from
//! `ordiff-compare` to real indexer endpoints over HTTP. It parses the
//! command line, configures logging, registers the interrupt handler, builds
//! one [`adapters::HttpIndexerApi`] per endpoint and drives the full run,
//! mapping the outcome to the process exit code (0 normal, 130 interrupted,
//! 1 fatal).

pub mod adapters;

#[cfg(test)]
mod tests;
