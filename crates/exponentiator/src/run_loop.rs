//! Fixed-interval driver with exponential backoff on failure.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;

use crate::error::ExponentiatorError;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);
pub const BACKOFF_FLOOR: Duration = Duration::from_secs(1);
pub const BACKOFF_CAP: Duration = Duration::from_secs(600);

/// Retry delay after consecutive failures: `floor * 2^failures`, capped.
#[derive(Debug, Clone)]
pub struct Backoff {
    floor: Duration,
    cap: Duration,
    failures: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(BACKOFF_FLOOR, BACKOFF_CAP)
    }
}

impl Backoff {
    pub fn new(floor: Duration, cap: Duration) -> Self {
        Self {
            floor,
            cap,
            failures: 0,
        }
    }

    /// Delay for the current failure count.
    pub fn current(&self) -> Duration {
        let factor = 2u32.checked_pow(self.failures).unwrap_or(u32::MAX);
        self.floor.saturating_mul(factor).min(self.cap)
    }

    /// Record a failure and return how long to wait before retrying.
    pub fn on_failure(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);
        self.current()
    }

    pub fn on_success(&mut self) {
        self.failures = 0;
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}

/// Runs a cycle forever: `interval` after a success, the backoff delay after
/// a failure. Only the sleep between cycles observes shutdown.
pub struct RunLoop {
    interval: Duration,
    backoff: Backoff,
}

impl RunLoop {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            backoff: Backoff::default(),
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub async fn run<F, Fut>(&mut self, mut cycle: F, mut shutdown: watch::Receiver<bool>)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), ExponentiatorError>>,
    {
        loop {
            if *shutdown.borrow() {
                break;
            }

            let delay = match cycle().await {
                Ok(()) => {
                    self.backoff.on_success();
                    self.interval
                }
                Err(e) => {
                    let delay = self.backoff.on_failure();
                    tracing::error!(
                        error = %e,
                        failures = self.backoff.failures(),
                        retry_in_secs = delay.as_secs(),
                        "Cycle failed, backing off"
                    );
                    delay
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => {
                    tracing::info!("Shutdown requested, stopping run loop");
                    break;
                }
            }
        }
    }
}
