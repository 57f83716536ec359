//! Cancellable repeating timer that drives countdown refreshes.
//!
//! The callback runs on a background thread every `interval` until it
//! returns `ControlFlow::Break`, the handle is cancelled, or the handle is
//! dropped. Dropping the handle always stops the timer.

use std::ops::ControlFlow;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

pub struct Ticker {
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<u64>>,
}

impl Ticker {
    /// Start ticking. The callback receives the 1-based tick number.
    pub fn start<F>(interval: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(u64) -> ControlFlow<()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<()>();

        let worker = thread::spawn(move || {
            let mut ticks = 0u64;
            loop {
                match rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        ticks += 1;
                        if on_tick(ticks).is_break() {
                            break;
                        }
                    }
                    // explicit cancel or handle dropped
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!(ticks, "ticker stopped");
            ticks
        });

        Self {
            stop: Some(tx),
            worker: Some(worker),
        }
    }

    /// Stop the timer and return how many ticks fired.
    pub fn cancel(mut self) -> u64 {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
        self.join()
    }

    /// Block until the callback breaks out of the loop.
    pub fn wait(mut self) -> u64 {
        self.join()
    }

    fn join(&mut self) -> u64 {
        self.worker
            .take()
            .and_then(|w| w.join().ok())
            .unwrap_or_default()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        // dropping the sender disconnects the channel
        self.stop.take();
        self.join();
    }
}
