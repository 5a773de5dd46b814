//! Periodic removal of connections whose client has gone away.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::hub::PresenceHub;

/// Run [`PresenceHub::sweep`] every `interval` until `shutdown` is cancelled.
pub fn spawn_sweeper(
    hub: Arc<PresenceHub>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let removed = hub.sweep();
                    if removed > 0 {
                        debug!(removed, "Swept closed presence connections");
                    }
                }
            }
        }

        debug!("Presence sweeper stopped");
    })
}
