use super::{Error, Inner, Result};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// A registered waiter. Resolves with the redirect URL delivered for its
/// state token.
///
/// Dropping it before it resolves removes the waiter from the broker.
#[must_use = "dropping a pending redirect unregisters it"]
pub struct PendingRedirect {
    state: String,
    generation: u64,
    receiver: oneshot::Receiver<String>,
    inner: Arc<Inner>,
}

impl PendingRedirect {
    pub(super) fn new(
        state: String,
        generation: u64,
        receiver: oneshot::Receiver<String>,
        inner: Arc<Inner>,
    ) -> Self {
        Self { state, generation, receiver, inner }
    }
    pub fn state(&self) -> &str {
        &self.state
    }
}

impl Future for PendingRedirect {
    type Output = Result<String>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        Pin::new(&mut this.receiver)
            .poll(cx)
            .map(|received| received.map_err(|_| Error::Abandoned(this.state.clone())))
    }
}

impl Drop for PendingRedirect {
    fn drop(&mut self) {
        // after a delivery the entry is already gone; a successor's entry is
        // left alone because its generation differs
        if self.inner.remove_if_current(&self.state, self.generation) {
            tracing::debug!(state = %self.state, "waiter dropped before delivery, removed");
        }
    }
}

impl std::fmt::Debug for PendingRedirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRedirect")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
