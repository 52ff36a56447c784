//! Ctrl-C handling: the first interrupt stops the run after the batch in
//! flight, a second one ends the process without waiting.

use futures_util::{stream, Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Exit status of a process stopped by SIGINT.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Every Ctrl-C the process receives. Ends if the handler cannot be installed.
pub fn ctrl_c_signals() -> impl Stream<Item = ()> {
    stream::unfold((), |()| async {
        tokio::signal::ctrl_c().await.ok().map(|()| ((), ()))
    })
}

/// Cancel `cancel` on the first interrupt, then wait for another.
///
/// Returns `true` when a second interrupt arrives and the caller should exit,
/// `false` if `interrupts` ends first.
pub async fn escalate_interrupts<S>(interrupts: S, cancel: CancellationToken) -> bool
where
    S: Stream<Item = ()>,
{
    let mut interrupts = std::pin::pin!(interrupts);

    if interrupts.next().await.is_none() {
        return false;
    }
    warn!("interrupt received, stopping after the current batch (Ctrl-C again to exit now)");
    cancel.cancel();

    if interrupts.next().await.is_none() {
        return false;
    }
    warn!("second interrupt received, exiting immediately");
    true
}
