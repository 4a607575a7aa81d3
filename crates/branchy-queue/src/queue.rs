use crate::item::{self, ItemId, ItemState, QueueItem, QueueItemHandle};
use crate::options::SubmitOptions;
use crate::registry::IdentifierRegistry;
use branchy_core::{BranchyResult, Command};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;

/// Runs submitted commands one at a time, in submission order.
///
/// A single drain task executes the pending items; it is started on demand
/// and exits when the queue empties or the queue is paused. Route every
/// mutating operation against one repository through the same queue: it is
/// the only thing keeping those operations from racing.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct CommandQueue {
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<QueueState>,
    registry: Arc<IdentifierRegistry>,
    /// `true` while open
    gate: watch::Sender<bool>,
    runtime: Handle,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<Arc<QueueItem>>,
    current: Option<Arc<QueueItem>>,
    draining: bool,
    last_id: ItemId,
}

impl CommandQueue {
    /// Create a queue whose drain loop and retention timers run on the
    /// current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new() -> Self {
        Self::with_runtime(Handle::current())
    }

    pub fn with_runtime(runtime: Handle) -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState::default()),
                registry: Arc::new(IdentifierRegistry::default()),
                gate,
                runtime,
            }),
        }
    }

    /// Enqueue a command.
    ///
    /// Returns `None` when `options.reject_if_duplicate` is set and an item
    /// with the same identifier is pending, running, or still retained.
    pub fn submit<C: Command>(
        &self,
        command: C,
        options: SubmitOptions,
    ) -> Option<QueueItemHandle<C::Output>> {
        let description = command.description();
        let (job, result) = item::wrap(command);

        let item = {
            let mut state = self.shared.state.lock();
            if options.reject_if_duplicate {
                if let Some(identifier) = options.identifier.as_deref() {
                    if self.shared.registry.contains(identifier) {
                        tracing::debug!(
                            "Rejected duplicate '{}' for identifier '{}'",
                            description,
                            identifier
                        );
                        return None;
                    }
                }
            }
            self.shared.push(&mut state, description, job, options)
        };
        Some(self.shared.started(item, result))
    }

    /// Enqueue a command regardless of duplicates.
    ///
    /// `options.reject_if_duplicate` is ignored; the identifier is still
    /// registered, so later rejecting submissions see this item.
    pub fn enqueue<C: Command>(
        &self,
        command: C,
        options: SubmitOptions,
    ) -> QueueItemHandle<C::Output> {
        let description = command.description();
        let (job, result) = item::wrap(command);
        let item = {
            let mut state = self.shared.state.lock();
            self.shared.push(&mut state, description, job, options)
        };
        self.shared.started(item, result)
    }

    /// Submit and hand back the eventual result, or `None` if rejected as a duplicate
    pub fn process<C: Command>(
        &self,
        command: C,
        options: SubmitOptions,
    ) -> Option<impl Future<Output = BranchyResult<C::Output>> + Send + 'static> {
        self.submit(command, options).map(QueueItemHandle::result)
    }

    /// Stop starting new items. The running item, if any, completes normally.
    pub fn pause(&self) {
        if self.shared.gate.send_replace(false) {
            tracing::debug!("Command queue paused");
        }
    }

    pub fn resume(&self) {
        if !self.shared.gate.send_replace(true) {
            tracing::debug!("Command queue resumed");
        }
        self.shared.ensure_draining();
    }

    /// Cancel every pending item. The running item cannot be canceled.
    ///
    /// Returns the number of items this call canceled.
    pub fn cancel_all(&self) -> usize {
        let pending: Vec<_> = self.shared.state.lock().pending.drain(..).collect();
        let canceled = pending.iter().filter(|item| item.cancel()).count();
        if canceled > 0 {
            tracing::debug!("Canceled {} pending command(s)", canceled);
        }
        canceled
    }

    /// Wait for the running item and then every pending item present at the
    /// time of the call, in queue order.
    ///
    /// Failed items count as done; read each item's own handle for its
    /// outcome. Canceled items are skipped. With `stop_at_pause`, returns as
    /// soon as the next item is held back by a paused queue; otherwise waits
    /// through the pause.
    pub async fn wait_all(&self, stop_at_pause: bool) {
        let items: Vec<Arc<QueueItem>> = {
            let state = self.shared.state.lock();
            state
                .current
                .iter()
                .chain(state.pending.iter())
                .filter(|item| !item.is_canceled())
                .cloned()
                .collect()
        };

        for item in items {
            if stop_at_pause {
                tokio::select! {
                    _ = item.settled() => {}
                    _ = self.shared.held_by_pause(&item) => {
                        tracing::debug!("Stopped waiting at paused item #{}", item.id());
                        return;
                    }
                }
            } else {
                item.settled().await;
            }
        }
    }

    /// Cancel everything pending, reopen the gate, and wait for the running
    /// item. Nothing is pending or running afterwards.
    pub async fn dispose(&self) {
        self.cancel_all();
        self.resume();
        self.wait_all(false).await;
        tracing::debug!("Command queue disposed");
    }

    /// An item is executing right now
    pub fn is_running(&self) -> bool {
        self.shared.state.lock().current.is_some()
    }

    pub fn is_paused(&self) -> bool {
        !*self.shared.gate.borrow()
    }

    /// Pending items that have not been canceled
    pub fn pending_count(&self) -> usize {
        self.shared
            .state
            .lock()
            .pending
            .iter()
            .filter(|item| !item.is_canceled())
            .count()
    }

    pub fn current_item(&self) -> Option<Arc<QueueItem>> {
        self.shared.state.lock().current.clone()
    }

    pub fn contains_identifier(&self, identifier: &str) -> bool {
        self.shared.registry.contains(identifier)
    }

    pub fn items_with(&self, identifier: &str) -> Vec<Arc<QueueItem>> {
        self.shared.registry.items_with(identifier)
    }
}

impl Shared {
    fn is_open(&self) -> bool {
        *self.gate.borrow()
    }

    /// Register a new item and append it to the pending list
    fn push(
        &self,
        state: &mut QueueState,
        description: String,
        job: item::Job,
        options: SubmitOptions,
    ) -> Arc<QueueItem> {
        state.last_id += 1;
        let id = state.last_id;
        let identifier = options
            .identifier
            .unwrap_or_else(|| default_identifier(id));
        let item = Arc::new(QueueItem::new(
            id,
            identifier,
            options.retention,
            description,
            job,
            Arc::downgrade(&self.registry),
        ));
        self.registry.register(&item);
        state.pending.push_back(Arc::clone(&item));
        item
    }

    /// Kick the drain loop for a freshly pushed item and wrap it for the caller
    fn started<T>(
        self: &Arc<Self>,
        item: Arc<QueueItem>,
        result: tokio::sync::oneshot::Receiver<BranchyResult<T>>,
    ) -> QueueItemHandle<T> {
        tracing::debug!(
            "Queued #{} '{}' as '{}'",
            item.id(),
            item.description(),
            item.identifier()
        );
        self.ensure_draining();
        QueueItemHandle::new(item, result)
    }

    fn ensure_draining(self: &Arc<Self>) {
        {
            let mut state = self.state.lock();
            if state.draining || state.pending.is_empty() || !self.is_open() {
                return;
            }
            state.draining = true;
        }
        let shared = Arc::clone(self);
        self.runtime.spawn(async move { shared.drain().await });
    }

    async fn drain(self: Arc<Self>) {
        tracing::debug!("Drain loop started");
        while let Some(item) = self.next_item() {
            tracing::debug!("Running #{} '{}'", item.id(), item.description());
            let finished = item.execute_now().await;
            let outcome = finished.state();
            self.state.lock().current = None;
            self.release(&item);
            item.settle(outcome);
            tracing::debug!("Finished #{} with {:?}", item.id(), outcome);
            finished.deliver();
        }
        tracing::debug!("Drain loop stopped");
    }

    /// Pop the next runnable item and mark it started, or stop draining.
    ///
    /// Checking the gate and starting the item happen under one lock so a
    /// concurrent pause or cancel either precedes the start or sees it.
    fn next_item(&self) -> Option<Arc<QueueItem>> {
        let mut state = self.state.lock();
        loop {
            if !self.is_open() {
                state.draining = false;
                return None;
            }
            let Some(item) = state.pending.pop_front() else {
                state.draining = false;
                return None;
            };
            if item.try_start() {
                state.current = Some(Arc::clone(&item));
                return Some(item);
            }
        }
    }

    /// Free the item's identifier now, or once its retention has elapsed
    fn release(&self, item: &QueueItem) {
        let retention = item.retention();
        if retention.is_zero() {
            self.registry.release(item.id(), item.identifier());
            return;
        }

        let registry = Arc::clone(&self.registry);
        let id = item.id();
        let identifier = item.identifier().to_string();
        self.runtime.spawn(async move {
            tokio::time::sleep(retention).await;
            registry.release(id, &identifier);
            tracing::debug!("Released identifier '{}' of #{}", identifier, id);
        });
    }

    /// Resolves once `item` cannot start until the queue is resumed
    async fn held_by_pause(&self, item: &QueueItem) {
        let mut gate = self.gate.subscribe();
        if gate.wait_for(|open| !*open).await.is_ok() {
            let _state = self.state.lock();
            if item.state() == ItemState::Queued {
                return;
            }
        }
        std::future::pending::<()>().await
    }
}

fn default_identifier(id: ItemId) -> String {
    format!("#{}", id)
}
