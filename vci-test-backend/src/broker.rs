//! Correlation of authorization redirects with the flows waiting for them.
//!
//! A flow registers the `state` token it put into the authorization request
//! and awaits the returned [`PendingRedirect`]. When the hosting environment
//! receives the redirect it calls [`RedirectBroker::deliver`], which hands
//! the URL to the one waiter registered under that token.
//!
//! ```no_run
//! # async fn run(broker: vci_test_backend::RedirectBroker) -> vci_test_backend::Result<()> {
//! let pending = broker.register("abc123")?;
//! // ... open the authorization URL carrying `state=abc123` ...
//! let url = pending.await?;
//! # Ok(())
//! # }
//! ```
mod pending;

pub use self::pending::PendingRedirect;
use crate::types::CallbackParams;
use crate::utils::generate_nonce;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("a waiter is already pending for state {0:?}")]
    AlreadyPending(String),
    #[error("waiter for state {0:?} was abandoned")]
    Abandoned(String),
    #[error("timed out waiting for redirect with state {0:?}")]
    Timeout(String),
}

pub type Result<T> = core::result::Result<T, Error>;

/// What to do when a token that already has a pending waiter is registered
/// again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Install the new waiter. The replaced one resolves with
    /// [`Error::Abandoned`].
    #[default]
    Replace,
    /// Fail the new registration with [`Error::AlreadyPending`].
    Reject,
}

struct Waiter {
    generation: u64,
    sender: oneshot::Sender<String>,
}

#[derive(Default)]
struct Waiters {
    next_generation: u64,
    entries: HashMap<String, Waiter>,
}

struct Inner {
    waiters: Mutex<Waiters>,
    policy: DuplicatePolicy,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Waiters> {
        // the map is never left half-updated, so a poisoned lock is still usable
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }
    /// Removes the entry for `state` only if it is still the one installed
    /// under `generation`.
    fn remove_if_current(&self, state: &str, generation: u64) -> bool {
        let mut waiters = self.lock();
        match waiters.entries.get(state) {
            Some(waiter) if waiter.generation == generation => {
                waiters.entries.remove(state);
                true
            }
            _ => false,
        }
    }
}

/// Shared handle; clones refer to the same set of waiters.
#[derive(Clone)]
pub struct RedirectBroker {
    inner: Arc<Inner>,
}

impl RedirectBroker {
    pub fn new() -> Self {
        Self::with_policy(DuplicatePolicy::default())
    }
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self { inner: Arc::new(Inner { waiters: Mutex::new(Waiters::default()), policy }) }
    }
    pub fn policy(&self) -> DuplicatePolicy {
        self.inner.policy
    }
    /// Installs a waiter for `state`.
    ///
    /// Registration takes effect immediately, so the redirect may be
    /// triggered before the returned future is first polled. Dropping the
    /// future unresolved removes the waiter again.
    pub fn register(&self, state: impl Into<String>) -> Result<PendingRedirect> {
        let state = state.into();
        let (sender, receiver) = oneshot::channel();
        let mut waiters = self.inner.lock();
        let generation = waiters.next_generation;
        waiters.next_generation += 1;
        match waiters.entries.entry(state.clone()) {
            Entry::Occupied(mut occupied) => match self.inner.policy {
                DuplicatePolicy::Reject => {
                    tracing::warn!(state = %state, "rejected duplicate registration");
                    return Err(Error::AlreadyPending(state));
                }
                DuplicatePolicy::Replace => {
                    // dropping the previous sender wakes its waiter with `Abandoned`
                    occupied.insert(Waiter { generation, sender });
                    tracing::warn!(state = %state, "replaced pending waiter");
                }
            },
            Entry::Vacant(vacant) => {
                vacant.insert(Waiter { generation, sender });
                tracing::debug!(state = %state, "registered waiter");
            }
        }
        drop(waiters);
        Ok(PendingRedirect::new(state, generation, receiver, Arc::clone(&self.inner)))
    }
    /// Waits for the redirect carrying `state` and returns its URL.
    pub async fn register_wait(&self, state: impl Into<String>) -> Result<String> {
        self.register(state)?.await
    }
    /// Like [`register_wait`](Self::register_wait), giving up after `timeout`.
    pub async fn register_wait_timeout(
        &self,
        state: impl Into<String>,
        timeout: Duration,
    ) -> Result<String> {
        let pending = self.register(state)?;
        let state = pending.state().to_string();
        // on expiry the pending future is dropped, which removes the waiter
        tokio::time::timeout(timeout, pending).await.map_err(|_| Error::Timeout(state))?
    }
    /// Registers a waiter under a freshly generated random token.
    pub fn register_new(&self) -> Result<(String, PendingRedirect)> {
        let state = generate_nonce();
        let pending = self.register(state.clone())?;
        Ok((state, pending))
    }
    /// Hands `url` to the waiter registered for its `state` parameter.
    ///
    /// Returns `false` if no waiter was woken. Redirects without a matching
    /// waiter are dropped; they are neither queued nor reported as errors.
    pub fn deliver(&self, url: impl Into<String>) -> bool {
        let url = url.into();
        let state = CallbackParams::state_from_url(&url);
        let waiter = self.inner.lock().entries.remove(&state);
        let Some(waiter) = waiter else {
            tracing::debug!(state = %state, "no waiter for redirect, dropped");
            return false;
        };
        match waiter.sender.send(url) {
            Ok(()) => {
                tracing::debug!(state = %state, "delivered redirect");
                true
            }
            Err(_) => {
                // the waiter was dropped between removal and send
                tracing::debug!(state = %state, "waiter gone before delivery");
                false
            }
        }
    }
    /// Abandons the waiter for `state`, if any.
    pub fn cancel(&self, state: &str) -> bool {
        let removed = self.inner.lock().entries.remove(state).is_some();
        if removed {
            tracing::debug!(state = %state, "cancelled waiter");
        }
        removed
    }
    /// Abandons every pending waiter.
    pub fn clear(&self) {
        let drained = std::mem::take(&mut self.inner.lock().entries);
        if !drained.is_empty() {
            tracing::debug!(count = drained.len(), "abandoned all waiters");
        }
    }
    pub fn is_pending(&self, state: &str) -> bool {
        self.inner.lock().entries.contains_key(state)
    }
    pub fn pending_count(&self) -> usize {
        self.inner.lock().entries.len()
    }
}

impl Default for RedirectBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RedirectBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectBroker")
            .field("policy", &self.inner.policy)
            .field("pending", &self.pending_count())
            .finish()
    }
}
