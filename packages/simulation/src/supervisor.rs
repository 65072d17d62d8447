//! Keeps the broadcast loop alive.
//!
//! The loop already survives a panicking tick. The supervisor covers the
//! rest: if the loop task itself dies, the failure is logged and the loop
//! is restarted after [`RESTART_BACKOFF`]. A normal return (shutdown) ends
//! supervision.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::engine::SimulationEngine;

/// Delay before restarting a loop that died.
pub const RESTART_BACKOFF: Duration = Duration::from_secs(1);

/// Spawns `engine.run` under supervision.
///
/// Send `true` on the `shutdown` channel (or drop its sender) to stop the
/// loop after its current tick; the returned handle completes once it
/// has.
pub fn supervise(engine: Arc<SimulationEngine>, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
    supervise_with(
        move |shutdown| {
            let engine = engine.clone();
            async move { engine.run(shutdown).await }
        },
        shutdown,
    )
}

/// Runs the task built by `start` until it returns normally, starting a
/// fresh one after [`RESTART_BACKOFF`] whenever it panics.
fn supervise_with<F, Fut>(start: F, shutdown: watch::Receiver<bool>) -> JoinHandle<()>
where
    F: Fn(watch::Receiver<bool>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut restarts: u32 = 0;
        loop {
            match tokio::spawn(start(shutdown.clone())).await {
                Ok(()) => break,
                Err(e) if e.is_panic() => {
                    restarts += 1;
                    log::error!("Broadcast loop died (restart #{restarts}): {e}");
                }
                Err(e) => {
                    log::error!("Broadcast loop was cancelled: {e}");
                    break;
                }
            }

            if *shutdown.borrow() {
                break;
            }
            tokio::time::sleep(RESTART_BACKOFF).await;
        }
    })
}
