//! Cancellable fixed-period tick.
//! At most one live interval per ticker; starting a live ticker or stopping a dead one
//! is a no-op. A stopped ticker's `tick()` never resolves, so it can sit in a
//! `select!` without firing.

use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    interval: Option<Interval>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Ticker { period, interval: None }
    }

    /// Starts ticking one period from now. Returns `false` if already live.
    pub fn start(&mut self) -> bool {
        if self.interval.is_some() {
            return false;
        }
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.interval = Some(interval);
        true
    }

    /// Returns `false` if it was not running.
    pub fn stop(&mut self) -> bool {
        self.interval.take().is_some()
    }

    #[cfg(test)]
    pub fn is_live(&self) -> bool {
        self.interval.is_some()
    }

    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
