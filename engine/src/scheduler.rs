//! Periodic tick source for one session.
//!
//! The ticker runs as its own task and pushes generation stamps into a
//! channel that the game loop selects on next to its command channel, so
//! ticks are serialized with every other event.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Handle to the running ticker, if any.
pub struct TickScheduler {
    tick_tx: mpsc::Sender<u64>,
    period: Duration,
    running: Option<(u64, JoinHandle<()>)>,
}

impl TickScheduler {
    pub fn new(tick_tx: mpsc::Sender<u64>, period: Duration) -> Self {
        Self {
            tick_tx,
            period,
            running: None,
        }
    }

    /// Generation of the live ticker.
    pub fn current(&self) -> Option<u64> {
        self.running.as_ref().map(|(generation, _)| *generation)
    }

    /// Make the ticker match what the session wants: stopped for None,
    /// running under exactly that generation for Some.
    pub fn sync(&mut self, wanted: Option<u64>) {
        if self.current() == wanted {
            return;
        }
        self.stop();
        if let Some(generation) = wanted {
            let handle = tokio::spawn(run_ticker(self.tick_tx.clone(), generation, self.period));
            self.running = Some((generation, handle));
            tracing::debug!("Ticker started for generation {}", generation);
        }
    }

    pub fn stop(&mut self) {
        if let Some((generation, handle)) = self.running.take() {
            handle.abort();
            tracing::debug!("Ticker for generation {} stopped", generation);
        }
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_ticker(tick_tx: mpsc::Sender<u64>, generation: u64, period: Duration) {
    // First tick lands one full period after (re)start; paused time is not credited.
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

    loop {
        interval.tick().await;
        if tick_tx.send(generation).await.is_err() {
            break;
        }
    }
}
