//! Cycle scheduling.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

use podtune_core::Cadence;

/// Paces control cycles according to a [`Cadence`].
///
/// Created just before the first cycle; `wait()` is called after each
/// cycle completes.
pub struct Ticker {
    period: Duration,
    /// Present only for [`Cadence::FixedRate`].
    interval: Option<Interval>,
}

impl Ticker {
    pub fn new(cadence: Cadence, period: Duration) -> Self {
        let interval = match cadence {
            Cadence::FixedDelay => None,
            Cadence::FixedRate => {
                let mut interval = tokio::time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                Some(interval)
            }
        };
        Self { period, interval }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Block until the next cycle may start.
    pub async fn wait(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => tokio::time::sleep(self.period).await,
        }
    }
}
