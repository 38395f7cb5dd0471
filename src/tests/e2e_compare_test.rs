//! Full-engine comparison runs over mock endpoints.

use std::time::Duration;

use anyhow::Result;
use ordiff_compare::{
    Blockchain, CompareConfig, CompareError, IndexerComparator, MockIndexerApi, Protocol,
    RetryPolicy, ShutdownCoordinator,
};

use super::receipt_builder::ReceiptBuilder;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn quick_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 2,
        backoff_base: Duration::from_millis(1),
        backoff_factor: 2,
    }
}

fn config_for(start: u32, workers: usize) -> CompareConfig {
    CompareConfig {
        start_block: Some(start),
        end_block: None,
        workers,
        retry: quick_retry(),
    }
}

fn engine(
    primary: MockIndexerApi,
    secondary: MockIndexerApi,
    config: CompareConfig,
) -> IndexerComparator<MockIndexerApi, MockIndexerApi> {
    IndexerComparator::new(
        primary,
        secondary,
        Blockchain::Fractal,
        Protocol::Brc20,
        config,
        ShutdownCoordinator::default(),
    )
    .unwrap()
}

fn standard_transfer() -> serde_json::Value {
    ReceiptBuilder::new()
        .block()
        .transfer("ordi", "100", "bc1qalice", "bc1qbob")
        .build()
}

#[tokio::test]
async fn identical_endpoints_match_over_the_whole_range() -> Result<()> {
    init_logging();
    let primary = MockIndexerApi::new("http://primary", "fractal", 21_009);
    let secondary = MockIndexerApi::new("http://secondary", "fractal", 21_009);
    for height in 21_000..=21_009 {
        primary.add_block(height, standard_transfer());
        secondary.add_block(height, standard_transfer());
    }

    let summary = engine(primary, secondary, config_for(21_000, 4))
        .run()
        .await?;

    assert!(!summary.interrupted);
    assert_eq!(summary.completed, 10);
    assert_eq!(summary.matched, 10);
    assert_eq!(summary.mismatched, 0);
    assert_eq!(summary.range.start, 21_000);
    assert_eq!(summary.range.end, 21_009);
    Ok(())
}

#[tokio::test]
async fn differing_amount_is_reported_as_a_mismatch() -> Result<()> {
    init_logging();
    let primary = MockIndexerApi::new("http://primary", "fractal", 21_001);
    let secondary = MockIndexerApi::new("http://secondary", "fractal", 21_001);
    primary.add_block(21_000, standard_transfer());
    secondary.add_block(21_000, standard_transfer());
    primary.add_block(
        21_001,
        ReceiptBuilder::new()
            .block()
            .transfer("ordi", "100", "bc1qalice", "bc1qbob")
            .build(),
    );
    secondary.add_block(
        21_001,
        ReceiptBuilder::new()
            .block()
            .transfer("ordi", "101", "bc1qalice", "bc1qbob")
            .build(),
    );

    let summary = engine(primary, secondary, config_for(21_000, 2))
        .run()
        .await?;

    assert_eq!(summary.completed, 2);
    assert_eq!(summary.matched, 1);
    assert_eq!(summary.mismatched, 1);
    Ok(())
}

#[tokio::test]
async fn invalid_events_are_invisible_to_the_diff() -> Result<()> {
    init_logging();
    let primary = MockIndexerApi::new("http://primary", "fractal", 21_000);
    let secondary = MockIndexerApi::new("http://secondary", "fractal", 21_000);
    // Primary materializes a rejected event that secondary omits entirely.
    primary.add_block(
        21_000,
        ReceiptBuilder::new()
            .block()
            .transfer("ordi", "100", "bc1qalice", "bc1qbob")
            .invalid_transfer("ordi", "9999", "transfer exceeds balance")
            .build(),
    );
    secondary.add_block(21_000, standard_transfer());

    let summary = engine(primary, secondary, config_for(21_000, 1))
        .run()
        .await?;

    assert_eq!(summary.completed, 1);
    assert_eq!(summary.matched, 1);
    Ok(())
}

#[tokio::test]
async fn receipts_missing_on_one_side_mismatch() -> Result<()> {
    init_logging();
    let primary = MockIndexerApi::new("http://primary", "fractal", 21_000);
    let secondary = MockIndexerApi::new("http://secondary", "fractal", 21_000);
    primary.add_block(21_000, standard_transfer());
    // Secondary knows the hash but has no receipt data for it.
    secondary.add_empty_block(21_000);

    let summary = engine(primary, secondary, config_for(21_000, 1))
        .run()
        .await?;

    assert_eq!(summary.completed, 1);
    assert_eq!(summary.mismatched, 1);
    Ok(())
}

#[tokio::test]
async fn persistent_fetch_failure_fails_only_that_block() -> Result<()> {
    init_logging();
    let primary = MockIndexerApi::new("http://primary", "fractal", 21_002);
    let secondary = MockIndexerApi::new("http://secondary", "fractal", 21_002);
    for height in 21_000..=21_002 {
        primary.add_block(height, standard_transfer());
        secondary.add_block(height, standard_transfer());
    }
    secondary.fail_fetches(&MockIndexerApi::hash_for(21_001), u32::MAX);

    let summary = engine(primary, secondary, config_for(21_000, 3))
        .run()
        .await?;

    assert_eq!(summary.completed, 2);
    assert_eq!(summary.failed, 1);
    assert!(!summary.interrupted);
    Ok(())
}

#[tokio::test]
async fn network_mismatch_aborts_before_block_processing() {
    init_logging();
    let primary = MockIndexerApi::new("http://primary", "fractal", 21_000);
    let secondary = MockIndexerApi::new("http://secondary", "bitcoin", 21_000);
    primary.add_block(21_000, standard_transfer());
    secondary.add_block(21_000, standard_transfer());

    let err = engine(primary.clone(), secondary, config_for(21_000, 1))
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, CompareError::Config(_)));
    assert_eq!(primary.fetch_calls(), 0);
}

#[tokio::test]
async fn end_block_beyond_common_tip_is_clamped() -> Result<()> {
    init_logging();
    let primary = MockIndexerApi::new("http://primary", "fractal", 21_004);
    let secondary = MockIndexerApi::new("http://secondary", "fractal", 21_002);
    for height in 21_000..=21_002 {
        primary.add_block(height, standard_transfer());
        secondary.add_block(height, standard_transfer());
    }

    let config = CompareConfig {
        start_block: Some(21_000),
        end_block: Some(21_050),
        workers: 2,
        retry: quick_retry(),
    };
    let summary = engine(primary, secondary, config).run().await?;

    assert_eq!(summary.range.end, 21_002);
    assert_eq!(summary.completed, 3);
    Ok(())
}
