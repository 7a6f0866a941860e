//! Cancellable fixed-rate ticking shared by every monitor loop.

use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// A ticker that races every wait against the shutdown signal.
///
/// The first tick fires one period after creation.
#[derive(Debug)]
pub struct Cadence {
    ticker: Interval,
    shutdown: broadcast::Receiver<()>,
    stopped: bool,
}

impl Cadence {
    pub fn new(period: Duration, shutdown: broadcast::Receiver<()>) -> Self {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            ticker,
            shutdown,
            stopped: false,
        }
    }

    /// Wait for the next tick. Returns `false` once shutdown was signalled.
    pub async fn tick(&mut self) -> bool {
        if self.stopped {
            return false;
        }

        tokio::select! {
            biased;
            _ = self.shutdown.recv() => {
                self.stopped = true;
                false
            }
            _ = self.ticker.tick() => true,
        }
    }

    /// Run `fut` unless shutdown arrives first, in which case it is dropped.
    pub async fn until_shutdown<F: Future>(&mut self, fut: F) -> Option<F::Output> {
        if self.stopped {
            return None;
        }

        tokio::select! {
            biased;
            _ = self.shutdown.recv() => {
                self.stopped = true;
                None
            }
            output = fut => Some(output),
        }
    }
}
