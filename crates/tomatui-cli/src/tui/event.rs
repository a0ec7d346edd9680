//! Input and tick events for the TUI loops.
//!
//! [`EventHandler`] runs in its own task: it emits [`TuiEvent::Tick`] at a
//! fixed interval and forwards terminal input, multiplexed with a shutdown
//! signal. Terminal polling happens on the blocking pool so the async
//! runtime never stalls on crossterm.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::trace;

const POLL_TIMEOUT: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// One timer interval elapsed.
    Tick,
    Key(KeyEvent),
    Resize,
}

pub struct EventHandler {
    event_tx: mpsc::Sender<TuiEvent>,
    shutdown_rx: oneshot::Receiver<()>,
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(
        event_tx: mpsc::Sender<TuiEvent>,
        shutdown_rx: oneshot::Receiver<()>,
        tick_rate: Duration,
    ) -> Self {
        Self {
            event_tx,
            shutdown_rx,
            tick_rate,
        }
    }

    /// Run until the shutdown signal fires or the receiver side goes away.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.tick_rate);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
        // The first tick is immediate; the session should not start with a
        // whole interval already elapsed.
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;

                _ = &mut self.shutdown_rx => break,

                _ = ticker.tick() => {
                    if self.event_tx.send(TuiEvent::Tick).await.is_err() {
                        break;
                    }
                }

                polled = async {
                    tokio::time::sleep(POLL_TIMEOUT).await;
                    tokio::task::spawn_blocking(|| poll_terminal(POLL_TIMEOUT)).await
                } => {
                    match polled {
                        Ok(Some(event)) => {
                            if self.event_tx.send(event).await.is_err() {
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(err) => {
                            trace!("terminal poll task failed: {err}");
                            break;
                        }
                    }
                }
            }
        }
    }
}

/// Poll for one terminal event. Failures (e.g. no terminal attached) are
/// treated as "no event".
fn poll_terminal(timeout: Duration) -> Option<TuiEvent> {
    match event::poll(timeout) {
        Ok(true) => match event::read() {
            Ok(CrosstermEvent::Key(key)) => Some(TuiEvent::Key(key)),
            Ok(CrosstermEvent::Resize(..)) => Some(TuiEvent::Resize),
            Ok(_) => None,
            Err(err) => {
                trace!("terminal read failed: {err}");
                None
            }
        },
        Ok(false) => None,
        Err(err) => {
            trace!("terminal poll failed: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_stops_the_handler() {
        let (event_tx, _event_rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(
            EventHandler::new(event_tx, shutdown_rx, Duration::from_millis(20)).run(),
        );

        shutdown_tx.send(()).ok();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("handler did not stop")
            .expect("handler task panicked");
    }

    #[tokio::test]
    async fn ticks_arrive_at_the_configured_rate() {
        let (event_tx, mut event_rx) = mpsc::channel(8);
        let (_shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(EventHandler::new(event_tx, shutdown_rx, Duration::from_millis(10)).run());

        let event = tokio::time::timeout(Duration::from_secs(1), event_rx.recv())
            .await
            .expect("no event within a second");
        assert!(matches!(event, Some(TuiEvent::Tick)));
    }

    #[tokio::test]
    async fn dropping_the_receiver_stops_the_handler() {
        let (event_tx, event_rx) = mpsc::channel(1);
        let (_shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(
            EventHandler::new(event_tx, shutdown_rx, Duration::from_millis(5)).run(),
        );

        drop(event_rx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("handler did not notice the closed channel")
            .expect("handler task panicked");
    }
}
