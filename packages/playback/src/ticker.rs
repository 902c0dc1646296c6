//! Scoped playback timer.
//!
//! A [`Ticker`] exists exactly while playback is running. It posts a
//! [`Command::Tick`] into the controller's queue once per period and is
//! cancelled when dropped, so no tick can be produced after the
//! controller leaves `Playing` or is torn down. Ticks already queued when
//! the ticker is dropped carry a stale generation and are discarded.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::controller::Command;

/// A running playback timer. Dropping it stops the timer.
pub struct Ticker {
    generation: u64,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Starts posting ticks tagged with `generation` every `period`.
    ///
    /// The first tick fires one full period after starting. The timer holds
    /// only a weak sender and stops on its own once the queue is closed.
    #[must_use]
    pub fn start(period: Duration, generation: u64, queue: mpsc::WeakSender<Command>) -> Self {
        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                let Some(tx) = queue.upgrade() else {
                    log::debug!("Playback queue closed; ticker {generation} exiting");
                    break;
                };
                if tx.send(Command::Tick { generation }).await.is_err() {
                    break;
                }
            }
        });

        log::debug!("Started ticker {generation} ({period:?})");
        Self { generation, handle }
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
        log::debug!("Cancelled ticker {}", self.generation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn posts_tagged_ticks() {
        let (tx, mut rx) = mpsc::channel(8);
        let ticker = Ticker::start(Duration::from_millis(5), 7, tx.downgrade());

        let command = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(command, Command::Tick { generation: 7 }));
        drop(ticker);
    }

    #[tokio::test]
    async fn drop_stops_ticks() {
        let (tx, mut rx) = mpsc::channel(8);
        let ticker = Ticker::start(Duration::from_millis(5), 1, tx.downgrade());
        drop(ticker);

        // Drain anything sent before the abort landed, then expect silence.
        tokio::time::sleep(Duration::from_millis(20)).await;
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn exits_when_queue_closes() {
        let (tx, rx) = mpsc::channel::<Command>(8);
        let ticker = Ticker::start(Duration::from_millis(5), 1, tx.downgrade());
        drop(rx);
        drop(tx);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(ticker.handle.is_finished());
    }
}
