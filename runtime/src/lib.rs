//! # EventPulse Runtime
//!
//! Runtime implementation for the EventPulse client.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Executes effect descriptions and feeds actions back to reducers
//! - **Cancellation Registry**: Tracks running effects by [`EffectId`] so a view
//!   can abort its in-flight work when it is left
//!
//! ## Example
//!
//! ```ignore
//! use eventpulse_runtime::Store;
//!
//! let store = Store::new(AppState::default(), AppReducer::new(), environment);
//!
//! // Send an action
//! let mut handle = store.send(AppAction::Navigate(Route::Events)).await?;
//! handle.wait().await;
//!
//! // Read state
//! let count = store.state(|s| s.catalog.visible_events().len()).await;
//! ```

use eventpulse_core::effect::{Effect, EffectId};
use eventpulse_core::reducer::Reducer;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Metric names and descriptions for observability
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for terminal action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::AbortHandle;

/// Number of effect-produced actions buffered for slow observers
const BROADCAST_CAPACITY: usize = 16;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects an action
/// started. An effect counts as complete once it has fed its resulting action
/// back through the reducer, or once it was cancelled.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(AppAction::Navigate(Route::Events)).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // The catalog fetch has resolved and its result is in the state
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new handle and the tracking context that feeds it
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: tx,
        };

        (handle, tracking)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                // Every tracker is gone, so nothing can still be running
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all
    /// effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements effect counter on drop
///
/// Runs on completion, panic, and abort alike.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Internal: running tasks grouped by cancellation id
#[derive(Default)]
struct CancellationRegistry {
    tasks: Mutex<HashMap<EffectId, Vec<AbortHandle>>>,
}

impl CancellationRegistry {
    /// Record `handle` under every id in `scopes`
    fn register(&self, scopes: &[EffectId], handle: &AbortHandle) {
        if scopes.is_empty() {
            return;
        }
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        for id in scopes {
            let entry = tasks.entry(id.clone()).or_default();
            entry.retain(|task| !task.is_finished());
            entry.push(handle.clone());
        }
    }

    /// Abort every task under `id`, returning how many were still running
    fn cancel(&self, id: &EffectId) -> usize {
        let handles = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .unwrap_or_default();

        handles
            .into_iter()
            .filter(|task| !task.is_finished())
            .map(|task| task.abort())
            .count()
    }

    /// Number of unfinished tasks under `id`
    fn running(&self, id: &EffectId) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map_or(0, |tasks| tasks.iter().filter(|task| !task.is_finished()).count())
    }
}

/// Store module - The runtime for reducers
///
/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, CancellationRegistry, DecrementGuard,
        Duration, Effect, EffectHandle, EffectId, EffectTracking, Ordering, Reducer, RwLock,
        StoreError, BROADCAST_CAPACITY,
    };
    use tokio::sync::broadcast;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. Reducer (view logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop and cancellation)
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        cancellations: Arc<CancellationRegistry>,
        /// Action broadcast channel for observing actions produced by effects.
        ///
        /// All actions produced by effects (e.g., from `Effect::Future`) are
        /// broadcast to observers, which lets callers wait for the response
        /// to a request without polling state.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            let (action_broadcast, _) = broadcast::channel(BROADCAST_CAPACITY);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                cancellations: Arc::new(CancellationRegistry::default()),
                action_broadcast,
            }
        }

        /// Initiate graceful shutdown of the store
        ///
        /// This method:
        /// 1. Sets the shutdown flag (rejecting new actions)
        /// 2. Waits for pending effects to complete (with timeout)
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);

            self.shutdown.store(true, Ordering::Release);

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(20);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(
                        pending_effects = pending,
                        "Shutdown timeout: {} effects still running", pending
                    );
                    metrics::counter!("store.shutdown.timeout").increment(1);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tracing::debug!(
                    pending_effects = pending,
                    elapsed_ms = start.elapsed().as_millis(),
                    "Waiting for effects to complete"
                );

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Executes returned effects asynchronously, in order
        /// 4. Effects may produce more actions (feedback loop)
        ///
        /// `send()` returns after starting effect execution, not completion.
        /// Use the returned [`EffectHandle`] to wait.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        ///
        /// # Panics
        ///
        /// If the reducer panics, the panic will propagate.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError>
        where
            R: Clone,
            E: Clone,
        {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            tracing::debug!("Processing action");
            metrics::counter!("store.commands.total").increment(1);

            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;

                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };

            for effect in effects {
                self.execute_effect_internal(effect, &tracking, &[]);
            }

            Ok(handle)
        }

        /// Send an action and wait for a matching result action
        ///
        /// Subscribes to the action broadcast BEFORE sending, then returns the
        /// first effect-produced action matching `predicate`. The action has
        /// already been reduced when it is returned.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: Timeout expired before matching action received
        /// - [`StoreError::ChannelClosed`]: Action broadcast channel closed
        /// - [`StoreError::ShutdownInProgress`]: Store is shutting down
        ///
        /// # Example
        ///
        /// ```ignore
        /// let result = store.send_and_wait_for(
        ///     AppAction::Detail(DetailAction::BookTickets),
        ///     |a| matches!(a, AppAction::Detail(DetailAction::BookingCompleted(_))),
        ///     Duration::from_secs(10),
        /// ).await?;
        /// ```
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            R: Clone,
            E: Clone,
            F: Fn(&A) -> bool,
        {
            // Subscribe BEFORE sending to avoid race condition
            let mut rx = self.action_broadcast.subscribe();

            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(
                                skipped,
                                "Action observer lagged, {} actions skipped",
                                skipped
                            );
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to all actions produced by effects
        ///
        /// Actions are broadcast after the reducer has handled them. Actions
        /// sent directly through `send` are not broadcast.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let route = store.state(|s| s.route.clone()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Abort every running effect registered under `id`
        ///
        /// Returns the number of tasks that were still running.
        pub fn cancel(&self, id: &EffectId) -> usize {
            let cancelled = self.cancellations.cancel(id);
            if cancelled > 0 {
                tracing::debug!(effect_id = %id, cancelled, "Cancelled running effects");
                metrics::counter!("store.effects.cancelled")
                    .increment(u64::try_from(cancelled).unwrap_or(u64::MAX));
            }
            cancelled
        }

        /// Number of effects still running under `id`
        #[must_use]
        pub fn running_effects(&self, id: &EffectId) -> usize {
            self.cancellations.running(id)
        }

        /// Spawn a tracked task, registering it under the active cancellation scopes
        fn spawn_tracked<F>(&self, tracking: &EffectTracking, scopes: &[EffectId], task: F)
        where
            F: std::future::Future<Output = ()> + Send + 'static,
        {
            tracking.increment();
            self.pending_effects.fetch_add(1, Ordering::SeqCst);

            let guard = DecrementGuard(tracking.clone());
            let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

            let join = tokio::spawn(async move {
                let _guard = guard;
                let _pending_guard = pending_guard;
                task.await;
            });

            self.cancellations.register(scopes, &join.abort_handle());
        }

        /// Feed an effect-produced action back into the store, then broadcast it
        async fn feed_back(&self, action: A)
        where
            R: Clone,
            E: Clone,
        {
            if let Err(error) = self.send(action.clone()).await {
                tracing::debug!(error = %error, "Dropped effect action");
                return;
            }
            let _ = self.action_broadcast.send(action);
        }

        /// Execute an effect with tracking
        ///
        /// # Effect Types
        ///
        /// - `None`: No-op
        /// - `Future`: Executes async computation, sends resulting action if `Some`
        /// - `Delay`: Waits for duration, then sends action
        /// - `Cancellable`: Executes the inner effect under an extra cancellation id
        /// - `Cancel`: Aborts every task registered under the id
        ///
        /// Effect failures never halt the store: a panicking effect task is
        /// isolated by tokio and its guards still release the counters.
        fn execute_effect_internal(
            &self,
            effect: Effect<A>,
            tracking: &EffectTracking,
            scopes: &[EffectId],
        ) where
            R: Clone,
            E: Clone,
        {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);

                    let store = self.clone();
                    self.spawn_tracked(tracking, scopes, async move {
                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action, sending to store");
                            store.feed_back(action).await;
                        } else {
                            tracing::trace!("Effect::Future completed with no action");
                        }
                    });
                },
                Effect::Delay { duration, action } => {
                    tracing::trace!("Executing Effect::Delay (duration: {:?})", duration);
                    metrics::counter!("store.effects.executed", "type" => "delay").increment(1);

                    let store = self.clone();
                    self.spawn_tracked(tracking, scopes, async move {
                        tokio::time::sleep(duration).await;
                        tracing::trace!("Effect::Delay completed, sending action");
                        store.feed_back(*action).await;
                    });
                },
                Effect::Cancellable {
                    id,
                    cancel_in_flight,
                    effect,
                } => {
                    tracing::trace!(effect_id = %id, cancel_in_flight, "Executing Effect::Cancellable");

                    if cancel_in_flight {
                        self.cancel(&id);
                    }

                    let mut nested = scopes.to_vec();
                    nested.push(id);
                    self.execute_effect_internal(*effect, tracking, &nested);
                },
                Effect::Cancel(id) => {
                    tracing::trace!(effect_id = %id, "Executing Effect::Cancel");
                    metrics::counter!("store.effects.executed", "type" => "cancel").increment(1);
                    self.cancel(&id);
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                cancellations: Arc::clone(&self.cancellations),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
