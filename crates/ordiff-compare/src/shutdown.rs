//! Cooperative shutdown coordination.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Lifecycle of a comparison run under shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    ShutdownRequested,
    Draining,
    Stopped,
}

const RUNNING: u8 = 0;
const SHUTDOWN_REQUESTED: u8 = 1;
const DRAINING: u8 = 2;
const STOPPED: u8 = 3;

/// Converts an external interrupt into a cancellation token observed by the
/// scheduler and by every in-flight task.
///
/// The first `request_shutdown` wins; later requests are ignored until the
/// run stops. After the scheduler halts admission it drains in-flight tasks
/// for at most `drain_timeout` before abandoning them.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    state: Arc<AtomicU8>,
    drain_timeout: Duration,
}

impl ShutdownCoordinator {
    pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(drain_timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            state: Arc::new(AtomicU8::new(RUNNING)),
            drain_timeout,
        }
    }

    /// Token handed to the scheduler and every task at creation.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn state(&self) -> ShutdownState {
        match self.state.load(Ordering::SeqCst) {
            RUNNING => ShutdownState::Running,
            SHUTDOWN_REQUESTED => ShutdownState::ShutdownRequested,
            DRAINING => ShutdownState::Draining,
            _ => ShutdownState::Stopped,
        }
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Request a shutdown. Returns true only for the first request; repeat
    /// interrupts before the run stops are ignored.
    pub fn request_shutdown(&self) -> bool {
        let first = self
            .state
            .compare_exchange(RUNNING, SHUTDOWN_REQUESTED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if first {
            self.token.cancel();
        }
        first
    }

    /// Scheduler stopped admitting tasks and is waiting on in-flight ones.
    pub fn begin_drain(&self) {
        let _ = self.state.compare_exchange(
            SHUTDOWN_REQUESTED,
            DRAINING,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }

    /// Run reached its terminal state, whether drained or abandoned.
    pub fn mark_stopped(&self) {
        self.state.store(STOPPED, Ordering::SeqCst);
    }

    pub fn drain_timeout(&self) -> Duration {
        self.drain_timeout
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DRAIN_TIMEOUT)
    }
}
