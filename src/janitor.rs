//! Periodic retirement of expired link requests.
//!
//! Verification consumes the row it examined; the janitor catches requests
//! nobody ever tried to verify. A failed sweep logs and waits for the next
//! tick.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::service::LinkService;

/// Spawn the sweep loop. Abort through the returned handle to stop it.
///
/// The first sweep runs one full interval after spawn.
pub fn spawn(service: LinkService, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval() yields immediately on the first tick.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match service.clean_expired_requests().await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "retired expired link requests"),
                Err(err) => tracing::warn!("link request sweep failed: {err}"),
            }
        }
    })
}
