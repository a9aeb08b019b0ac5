//! Forwards retrieval snapshots into the action loop.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use refcat_core::RetrievalStream;

use crate::action::{Action, PreviewSlot};

/// Spawn a task that sends the current snapshot of `stream`, then every
/// change, as [`Action::PreviewUpdated`] until cancelled or until the
/// retrieval is dropped.
pub fn spawn_preview_bridge(
    slot: PreviewSlot,
    mut stream: RetrievalStream,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        let _ = action_tx.send(Action::PreviewUpdated {
            slot,
            snapshot: stream.latest(),
        });

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => break,

                next = stream.changed() => {
                    let Some(snapshot) = next else { break };
                    debug!(?slot, phase = %snapshot.phase, "dispatching PreviewUpdated");
                    if action_tx.send(Action::PreviewUpdated { slot, snapshot }).is_err() {
                        break;
                    }
                }
            }
        }

        debug!(?slot, "preview bridge shut down");
    });
}
