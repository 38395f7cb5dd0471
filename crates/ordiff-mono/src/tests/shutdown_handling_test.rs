//! Tests for the interrupt-to-shutdown wiring used by the binary.

use std::time::Duration;

use ordiff_compare::{ShutdownCoordinator, ShutdownState};

#[tokio::test]
async fn first_interrupt_requests_shutdown_and_cancels_token() {
    let shutdown = ShutdownCoordinator::default();
    let token = shutdown.token();

    assert!(shutdown.request_shutdown());
    token.cancelled().await;
    assert_eq!(shutdown.state(), ShutdownState::ShutdownRequested);
}

#[tokio::test]
async fn repeated_interrupts_are_ignored_until_stopped() {
    let shutdown = ShutdownCoordinator::default();
    assert!(shutdown.request_shutdown());
    assert!(!shutdown.request_shutdown());
    assert!(!shutdown.request_shutdown());
    assert_eq!(shutdown.state(), ShutdownState::ShutdownRequested);
}

#[tokio::test]
async fn drain_window_bounds_the_wait_for_stuck_tasks() {
    let shutdown = ShutdownCoordinator::new(Duration::from_millis(50));
    shutdown.request_shutdown();
    shutdown.begin_drain();

    // A task that never finishes must not hold the drain past its window.
    let stuck = tokio::spawn(async {
        tokio::time::sleep(Duration::from_secs(30)).await;
    });
    let waited = tokio::time::timeout(shutdown.drain_timeout(), stuck).await;
    assert!(waited.is_err());

    shutdown.mark_stopped();
    assert_eq!(shutdown.state(), ShutdownState::Stopped);
}
