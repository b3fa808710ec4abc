//! Graceful shutdown handling.

use std::future::Future;
use std::io;

use log::warn;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels `cancel` when Ctrl-C is received.
///
/// Cancelling the token kills a running massdns child; the run then fails
/// with a cancellation error and the binary exits non-zero. If the signal
/// handler cannot be installed the run continues without one.
pub fn shutdown_on_ctrl_c(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(cancel_on_signal(tokio::signal::ctrl_c(), cancel))
}

async fn cancel_on_signal<F>(signal: F, cancel: CancellationToken)
where
    F: Future<Output = io::Result<()>>,
{
    tokio::select! {
        _ = cancel.cancelled() => {}
        result = signal => match result {
            Ok(()) => {
                warn!("Received Ctrl-C, shutting down");
                cancel.cancel();
            }
            Err(e) => {
                warn!("Could not listen for Ctrl-C, continuing without it: {e}");
                cancel.cancelled().await;
            }
        }
    }
}

/// Stops the listener started by [`shutdown_on_ctrl_c`] and waits for it.
pub async fn stop_shutdown_listener(cancel: CancellationToken, listener: JoinHandle<()>) {
    cancel.cancel();
    let _ = listener.await;
}
