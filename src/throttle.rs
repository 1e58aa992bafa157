//! Outbound request gate
//!
//! Every call to PubMed or the AI endpoint passes through one process-wide
//! [`Throttle`] so consecutive calls are spaced by at least a fixed delay.
//! This is a single timestamp behind an async mutex, not a token bucket: the
//! lock is held across the sleep, so waiters are released one at a time in
//! the order they queued (tokio's mutex is FIFO).

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

pub const DEFAULT_DELAY_MS: u64 = 350;

#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_call: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Suspend until `delay` has passed since the previous issuance, then
    /// record the current instant as the new "last call".
    pub async fn wait(&self) {
        let mut last_call = self.last_call.lock().await;

        if let Some(previous) = *last_call {
            let ready_at = previous + self.delay;
            let now = Instant::now();
            if ready_at > now {
                debug!(wait_ms = (ready_at - now).as_millis() as u64, "Throttling outbound request");
                sleep_until(ready_at).await;
            }
        }

        *last_call = Some(Instant::now());
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DELAY_MS))
    }
}
