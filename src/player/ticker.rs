//! Periodic tick source for simulated playback.
//!
//! A ticker never touches engine state. It only posts a message into the
//! engine mailbox once per period, so every tick is processed in order
//! with every other engine operation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

/// Point-in-time ticker counts reported by engine handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickerCounts {
    pub started: usize,
    pub live: usize,
}

/// Counts of started and cancelled tickers, shared with engine handles.
#[derive(Debug, Default)]
pub struct TickerStats {
    started: AtomicUsize,
    cancelled: AtomicUsize,
}

impl TickerStats {
    /// Tickers spawned over the engine's lifetime.
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Tickers currently alive (0 or 1).
    pub fn live(&self) -> usize {
        self.started() - self.cancelled.load(Ordering::SeqCst)
    }

    pub fn counts(&self) -> TickerCounts {
        TickerCounts {
            started: self.started(),
            live: self.live(),
        }
    }
}

/// A running ticker. Dropping it cancels the task.
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
    stats: Arc<TickerStats>,
}

impl Ticker {
    /// Spawn a ticker posting `make_tick()` every `period`.
    ///
    /// The first tick fires one full period after spawning. The ticker
    /// holds only a weak mailbox sender and exits once the engine is gone.
    pub fn spawn<M, F>(
        period: Duration,
        mailbox: mpsc::WeakSender<M>,
        make_tick: F,
        stats: Arc<TickerStats>,
    ) -> Self
    where
        M: Send + 'static,
        F: Fn() -> M + Send + 'static,
    {
        stats.started.fetch_add(1, Ordering::SeqCst);

        let handle = tokio::spawn(async move {
            let mut timer = interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                timer.tick().await;
                let Some(tx) = mailbox.upgrade() else {
                    break;
                };
                if tx.send(make_tick()).await.is_err() {
                    break;
                }
            }
            tracing::trace!(target: "ticker", "Ticker task exited");
        });

        Self { handle, stats }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
        self.stats.cancelled.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticker_posts_each_period() {
        let (tx, mut rx) = mpsc::channel::<u32>(8);
        let stats = Arc::new(TickerStats::default());
        let _ticker = Ticker::spawn(Duration::from_secs(1), tx.downgrade(), || 7, stats.clone());

        assert_eq!(stats.live(), 1);
        let start = Instant::now();
        assert_eq!(rx.recv().await, Some(7));
        assert_eq!(start.elapsed(), Duration::from_secs(1));
        assert_eq!(rx.recv().await, Some(7));
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (tx, mut rx) = mpsc::channel::<u32>(8);
        let stats = Arc::new(TickerStats::default());
        let ticker = Ticker::spawn(Duration::from_secs(1), tx.downgrade(), || 1, stats.clone());
        drop(ticker);
        assert_eq!(stats.live(), 0);
        assert_eq!(stats.started(), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_exits_when_mailbox_gone() {
        let (tx, rx) = mpsc::channel::<u32>(8);
        let stats = Arc::new(TickerStats::default());
        let ticker = Ticker::spawn(Duration::from_secs(1), tx.downgrade(), || 1, stats);
        drop(tx);
        drop(rx);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(ticker.handle.is_finished());
    }
}
