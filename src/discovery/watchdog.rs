//! Inactivity watchdog.

use std::time::Duration;

use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Sending half handed to tasks that report progress.
#[derive(Debug, Clone)]
pub struct Heartbeat(mpsc::Sender<()>);

impl Heartbeat {
    /// Records progress. Never blocks; a full channel already holds a pending beat.
    pub fn beat(&self) {
        let _ = self.0.try_send(());
    }
}

/// Starts a watchdog that cancels `cancel` when no heartbeat arrives within
/// `inactivity`.
///
/// The watchdog stops once every [`Heartbeat`] has been dropped or `cancel` fires.
///
/// # Returns
///
/// The heartbeat sender and a handle resolving to `true` if the watchdog fired.
pub fn spawn_watchdog(
    inactivity: Duration,
    cancel: CancellationToken,
) -> (Heartbeat, JoinHandle<bool>) {
    let (tx, mut rx) = mpsc::channel::<()>(1);

    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return false,
                beat = tokio::time::timeout(inactivity, rx.recv()) => match beat {
                    Ok(Some(())) => continue,
                    Ok(None) => {
                        debug!("Watchdog stopped: no more heartbeat senders");
                        return false;
                    }
                    Err(_) => {
                        warn!(
                            "No progress for {:?}, cancelling discovery",
                            inactivity
                        );
                        cancel.cancel();
                        return true;
                    }
                },
            }
        }
    });

    (Heartbeat(tx), handle)
}
