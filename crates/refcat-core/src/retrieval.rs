// ── Retrieval hook ──
//
// Per-consumer fetch state for one data-type name: Idle -> Loading ->
// Ready | Degraded. Each instance fetches on its own; there is no shared
// cache between instances.
//
// Every key change bumps `generation` and cancels the previous fetch.
// Every fetch (initial or refresh) also takes a sequence number, so a
// result older than one already applied is dropped even within the same
// generation.

use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures_core::Stream;
use strum::{Display, IntoStaticStr};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::fallback;
use crate::model::{DataPoint, active_only};
use crate::source::CatalogueSource;

// ── Snapshot ────────────────────────────────────────────────────────

/// Where the current data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    /// No data type set, or unmounted.
    Idle,
    /// First fetch for the current key is in flight.
    Loading,
    /// Data came from the catalogue service.
    Ready,
    /// The first fetch failed; data is the fallback snapshot.
    Degraded,
}

/// Observable state of a [`Retrieval`].
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalSnapshot {
    pub data_type: Option<String>,
    pub phase: Phase,
    /// Active points only.
    pub data: Arc<Vec<DataPoint>>,
    pub error: Option<String>,
    pub generation: u64,
}

impl RetrievalSnapshot {
    fn idle() -> Self {
        Self {
            data_type: None,
            phase: Phase::Idle,
            data: Arc::new(Vec::new()),
            error: None,
            generation: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// A fetch for the current key has completed, successfully or not.
    pub fn is_settled(&self) -> bool {
        matches!(self.phase, Phase::Ready | Phase::Degraded)
    }

    pub fn is_degraded(&self) -> bool {
        self.phase == Phase::Degraded
    }
}

// ── Stream ──────────────────────────────────────────────────────────

/// A subscription to one retrieval's state.
pub struct RetrievalStream {
    current: RetrievalSnapshot,
    receiver: watch::Receiver<RetrievalSnapshot>,
}

impl RetrievalStream {
    fn new(receiver: watch::Receiver<RetrievalSnapshot>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> &RetrievalSnapshot {
        &self.current
    }

    /// Latest snapshot (may have changed since creation).
    pub fn latest(&self) -> RetrievalSnapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change. Returns `None` once the retrieval is gone.
    pub async fn changed(&mut self) -> Option<RetrievalSnapshot> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Wait until a fetch for the current key has completed.
    pub async fn settled(&mut self) -> Option<RetrievalSnapshot> {
        let snap = self
            .receiver
            .wait_for(RetrievalSnapshot::is_settled)
            .await
            .ok()?
            .clone();
        self.current = snap.clone();
        Some(snap)
    }

    pub fn into_stream(self) -> RetrievalWatchStream {
        RetrievalWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding every new snapshot.
pub struct RetrievalWatchStream {
    inner: WatchStream<RetrievalSnapshot>,
}

impl Stream for RetrievalWatchStream {
    type Item = RetrievalSnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

// ── Retrieval ───────────────────────────────────────────────────────

/// Fetch state for one consumer.
///
/// Dropping the handle cancels any in-flight fetch and discards late
/// results. Must be created inside a tokio runtime.
pub struct Retrieval<S: CatalogueSource> {
    inner: Arc<RetrievalInner<S>>,
}

struct RetrievalInner<S> {
    source: Arc<S>,
    state: watch::Sender<RetrievalSnapshot>,
    control: Mutex<Control>,
    cancel: CancellationToken,
}

struct Control {
    data_type: Option<String>,
    generation: u64,
    /// Last sequence number handed out.
    issued: u64,
    /// Sequence number of the last applied result in this generation.
    applied: u64,
    /// Cancels fetches of the current generation.
    fetch_cancel: CancellationToken,
}

impl<S: CatalogueSource> Retrieval<S> {
    /// Create an idle retrieval.
    pub fn new(source: Arc<S>) -> Self {
        let (state, _) = watch::channel(RetrievalSnapshot::idle());
        let cancel = CancellationToken::new();
        let fetch_cancel = cancel.child_token();
        Self {
            inner: Arc::new(RetrievalInner {
                source,
                state,
                control: Mutex::new(Control {
                    data_type: None,
                    generation: 0,
                    issued: 0,
                    applied: 0,
                    fetch_cancel,
                }),
                cancel,
            }),
        }
    }

    /// Create and immediately start fetching `data_type`.
    pub fn mount(source: Arc<S>, data_type: impl Into<String>) -> Self {
        let retrieval = Self::new(source);
        retrieval.set_data_type(data_type);
        retrieval
    }

    /// Switch to another data type. Clears data and error, enters Loading,
    /// cancels the previous fetch. Setting the current key again is a no-op.
    pub fn set_data_type(&self, data_type: impl Into<String>) {
        let data_type = data_type.into();
        let mut control = self.inner.lock_control();
        if control.data_type.as_deref() == Some(data_type.as_str()) {
            return;
        }

        control.fetch_cancel.cancel();
        control.fetch_cancel = self.inner.cancel.child_token();
        control.generation += 1;
        control.applied = 0;
        control.issued += 1;
        control.data_type = Some(data_type.clone());

        let generation = control.generation;
        let seq = control.issued;
        let token = control.fetch_cancel.clone();

        debug!(data_type, generation, "retrieval: loading");
        self.inner.state.send_replace(RetrievalSnapshot {
            data_type: Some(data_type.clone()),
            phase: Phase::Loading,
            data: Arc::new(Vec::new()),
            error: None,
            generation,
        });
        drop(control);

        self.spawn_fetch(data_type, generation, seq, token);
    }

    /// Re-run the fetch for the current key without entering Loading.
    /// The previous data stays visible until the result arrives.
    pub fn refresh(&self) {
        let mut control = self.inner.lock_control();
        let Some(data_type) = control.data_type.clone() else {
            return;
        };
        control.issued += 1;
        let generation = control.generation;
        let seq = control.issued;
        let token = control.fetch_cancel.clone();
        drop(control);

        debug!(data_type, generation, seq, "retrieval: refresh");
        self.spawn_fetch(data_type, generation, seq, token);
    }

    /// Tear down: cancel in-flight work and return to Idle.
    pub fn unmount(&self) {
        let mut control = self.inner.lock_control();
        control.fetch_cancel.cancel();
        control.fetch_cancel = self.inner.cancel.child_token();
        control.generation += 1;
        control.data_type = None;
        self.inner.state.send_replace(RetrievalSnapshot {
            generation: control.generation,
            ..RetrievalSnapshot::idle()
        });
        drop(control);
    }

    pub fn snapshot(&self) -> RetrievalSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn data_type(&self) -> Option<String> {
        self.inner.lock_control().data_type.clone()
    }

    pub fn subscribe(&self) -> RetrievalStream {
        RetrievalStream::new(self.inner.state.subscribe())
    }

    fn spawn_fetch(&self, data_type: String, generation: u64, seq: u64, token: CancellationToken) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                () = token.cancelled() => {
                    debug!(data_type, generation, "retrieval: fetch cancelled");
                    return;
                }
                result = inner.source.list_points(&data_type) => result,
            };
            inner.apply(&data_type, generation, seq, result);
        });
    }
}

impl<S: CatalogueSource> Drop for Retrieval<S> {
    fn drop(&mut self) {
        self.inner.cancel.cancel();
    }
}

impl<S> RetrievalInner<S> {
    fn lock_control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply(
        &self,
        data_type: &str,
        generation: u64,
        seq: u64,
        result: Result<Vec<DataPoint>, CoreError>,
    ) {
        let mut control = self.lock_control();
        if control.generation != generation {
            debug!(data_type, generation, "retrieval: discarding stale result");
            return;
        }
        if seq < control.applied {
            debug!(data_type, seq, "retrieval: discarding superseded result");
            return;
        }
        control.applied = seq;

        // Hold the control lock while publishing so a concurrent key change
        // cannot interleave between the check and the send.
        self.state.send_modify(|snap| match result {
            Ok(points) => {
                snap.data = Arc::new(active_only(points));
                snap.error = None;
                snap.phase = Phase::Ready;
            }
            Err(e) if snap.phase == Phase::Loading => {
                warn!(data_type, error = %e, "catalogue unavailable, serving fallback");
                snap.data = Arc::new(fallback::get(data_type));
                snap.error = Some(e.user_message());
                snap.phase = Phase::Degraded;
            }
            Err(e) => {
                warn!(data_type, error = %e, "refresh failed, keeping previous data");
                snap.error = Some(format!("Failed to refresh data: {}", e.user_message()));
            }
        });
        drop(control);
    }
}
