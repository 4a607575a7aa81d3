use crate::registry::IdentifierRegistry;
use branchy_core::{BranchyError, BranchyResult, Command};
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::future::IntoFuture;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{oneshot, watch};

pub type ItemId = u64;

/// Type-erased execution of one command
pub(crate) type Job = BoxFuture<'static, Finished>;

/// A command that has run but whose result has not reached its handle yet.
///
/// The drain loop delivers only after the item is settled and its identifier
/// released, so a woken caller never observes the item still running.
pub(crate) struct Finished {
    succeeded: bool,
    deliver: Box<dyn FnOnce() + Send>,
}

impl Finished {
    pub(crate) fn undeliverable() -> Self {
        Self {
            succeeded: false,
            deliver: Box::new(|| {}),
        }
    }

    pub(crate) fn state(&self) -> ItemState {
        if self.succeeded {
            ItemState::Succeeded
        } else {
            ItemState::Failed
        }
    }

    pub(crate) fn deliver(self) {
        (self.deliver)()
    }
}

/// Lifecycle of a queue item.
///
/// `Queued -> Canceled` or `Queued -> Running -> Succeeded | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Queued,
    Canceled,
    Running,
    Succeeded,
    Failed,
}

impl ItemState {
    pub fn is_started(self) -> bool {
        matches!(self, Self::Running | Self::Succeeded | Self::Failed)
    }

    pub fn is_canceled(self) -> bool {
        self == Self::Canceled
    }

    /// Terminal: canceled, or started and resolved
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Canceled | Self::Succeeded | Self::Failed)
    }
}

/// Scheduling wrapper around one submitted command
pub struct QueueItem {
    id: ItemId,
    identifier: String,
    retention: Duration,
    description: String,
    state: watch::Sender<ItemState>,
    job: Mutex<Option<Job>>,
    registry: Weak<IdentifierRegistry>,
}

impl QueueItem {
    pub(crate) fn new(
        id: ItemId,
        identifier: String,
        retention: Duration,
        description: String,
        job: Job,
        registry: Weak<IdentifierRegistry>,
    ) -> Self {
        let (state, _) = watch::channel(ItemState::Queued);
        Self {
            id,
            identifier,
            retention,
            description,
            state,
            job: Mutex::new(Some(job)),
            registry,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn state(&self) -> ItemState {
        *self.state.borrow()
    }

    pub fn is_canceled(&self) -> bool {
        self.state().is_canceled()
    }

    pub fn is_started(&self) -> bool {
        self.state().is_started()
    }

    /// Cancel the item if it has not started yet.
    ///
    /// Drops the wrapped command and frees the identifier immediately, without
    /// waiting for any retention window. Returns `false` once the item has
    /// started or if it was already canceled.
    pub fn cancel(&self) -> bool {
        let canceled = self.state.send_if_modified(|state| {
            if *state == ItemState::Queued {
                *state = ItemState::Canceled;
                true
            } else {
                false
            }
        });
        if !canceled {
            return false;
        }

        self.job.lock().take();
        if let Some(registry) = self.registry.upgrade() {
            registry.release(self.id, &self.identifier);
        }
        tracing::debug!("Canceled queue item #{} ({})", self.id, self.description);
        true
    }

    /// Wait until the item is canceled or has finished running
    pub async fn settled(&self) -> ItemState {
        let mut rx = self.state.subscribe();
        let settled = match rx.wait_for(|state| state.is_settled()).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        };
        settled
    }

    /// `Queued -> Running`. Fails if the item was canceled first.
    pub(crate) fn try_start(&self) -> bool {
        self.state.send_if_modified(|state| {
            if *state == ItemState::Queued {
                *state = ItemState::Running;
                true
            } else {
                false
            }
        })
    }

    /// Run the wrapped command to completion.
    ///
    /// Errors and panics inside the command are captured into the item's
    /// result; nothing escapes to the caller.
    pub(crate) async fn execute_now(&self) -> Finished {
        debug_assert_eq!(self.state(), ItemState::Running);
        let job = self.job.lock().take();
        match job {
            Some(job) => job.await,
            None => {
                tracing::error!("Queue item #{} started without a command", self.id);
                Finished::undeliverable()
            }
        }
    }

    pub(crate) fn settle(&self, outcome: ItemState) {
        debug_assert!(outcome == ItemState::Succeeded || outcome == ItemState::Failed);
        self.state.send_replace(outcome);
    }
}

impl fmt::Debug for QueueItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueItem")
            .field("id", &self.id)
            .field("identifier", &self.identifier)
            .field("retention", &self.retention)
            .field("description", &self.description)
            .field("state", &self.state())
            .finish()
    }
}

/// Erase a command into a job whose typed result is sent over a oneshot on delivery
pub(crate) fn wrap<C: Command>(command: C) -> (Job, oneshot::Receiver<BranchyResult<C::Output>>) {
    let (tx, rx) = oneshot::channel();
    let job = async move {
        let result = match AssertUnwindSafe(command.run()).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(BranchyError::Panicked {
                command: command.description(),
                message: panic_message(payload.as_ref()),
            }),
        };
        let succeeded = result.is_ok();
        if let Err(e) = &result {
            tracing::warn!("{}", e);
        }
        Finished {
            succeeded,
            deliver: Box::new(move || {
                // The handle may have been dropped; the outcome is still recorded on the item.
                let _ = tx.send(result);
            }),
        }
    };
    (Box::pin(job), rx)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Caller's handle on a submitted item and its typed result
pub struct QueueItemHandle<T> {
    item: Arc<QueueItem>,
    result: oneshot::Receiver<BranchyResult<T>>,
}

impl<T> QueueItemHandle<T> {
    pub(crate) fn new(item: Arc<QueueItem>, result: oneshot::Receiver<BranchyResult<T>>) -> Self {
        Self { item, result }
    }

    pub fn id(&self) -> ItemId {
        self.item.id()
    }

    pub fn identifier(&self) -> &str {
        self.item.identifier()
    }

    pub fn state(&self) -> ItemState {
        self.item.state()
    }

    pub fn cancel(&self) -> bool {
        self.item.cancel()
    }

    pub fn item(&self) -> &Arc<QueueItem> {
        &self.item
    }

    /// Wait for the command's outcome.
    ///
    /// A canceled item never produces a value; awaiting it yields
    /// `BranchyError::Canceled`.
    pub async fn result(self) -> BranchyResult<T> {
        let id = self.item.id();
        self.result
            .await
            .unwrap_or_else(|_| Err(BranchyError::Canceled { id }))
    }
}

impl<T: Send + 'static> IntoFuture for QueueItemHandle<T> {
    type Output = BranchyResult<T>;
    type IntoFuture = BoxFuture<'static, BranchyResult<T>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.result())
    }
}

impl<T> fmt::Debug for QueueItemHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueItemHandle")
            .field("item", &self.item)
            .finish()
    }
}
