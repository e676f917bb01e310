//! # Task List Runtime
//!
//! The Store owns one aggregate: it applies actions through a reducer,
//! publishes a snapshot after each one, and runs the timers reducers ask for.
//!
//! ## Example
//!
//! ```ignore
//! use tasklist_runtime::Store;
//!
//! let store = Store::new(TaskListState::new(), TaskListReducer::new(), env);
//!
//! store.send(TaskAction::AddTask { raw_text: "Buy milk".into() }).await?;
//! let count = store.state(|s| s.tasks.len()).await;
//!
//! let mut snapshots = store.subscribe();
//! snapshots.changed().await?;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tasklist_core::{effect::Effect, reducer::Reducer};
use tokio::sync::{RwLock, watch};

/// Metric names and descriptions for the Store
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Timers were still winding down when the shutdown timeout elapsed
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),
    }
}

pub use error::StoreError;

/// Keeps the running-effects count accurate even if an effect task panics
struct RunningEffect(Arc<AtomicUsize>);

impl RunningEffect {
    fn start(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for RunningEffect {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Resolves once `stopping` reports true
async fn stop_requested(mut stopping: watch::Receiver<bool>) {
    loop {
        let stop = *stopping.borrow_and_update();
        if stop {
            return;
        }
        if stopping.changed().await.is_err() {
            // Sender gone: nobody can request a stop any more
            std::future::pending::<()>().await;
        }
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        Arc, AtomicUsize, Duration, Effect, Ordering, Reducer, RunningEffect, RwLock, StoreError,
        stop_requested, watch,
    };
    use crate::metrics::names;

    /// Runtime coordinator for a reducer
    ///
    /// Holds the state behind a `RwLock`, the reducer and its environment,
    /// a `watch` channel of snapshots, and the shutdown signal that stops
    /// pending timers. Cloning is cheap and yields a handle to the same state.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        /// `true` once shutdown starts; delay tasks watch it to stop early
        stopping: Arc<watch::Sender<bool>>,
        running_effects: Arc<AtomicUsize>,
        /// Published while the write lock is held, so observers see
        /// snapshots in the order actions were applied.
        snapshots: Arc<watch::Sender<S>>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        A: Send + 'static,
        S: Clone + Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        /// Create a store holding `initial_state`
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            let (snapshots, _) = watch::channel(initial_state.clone());
            let (stopping, _) = watch::channel(false);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                stopping: Arc::new(stopping),
                running_effects: Arc::new(AtomicUsize::new(0)),
                snapshots: Arc::new(snapshots),
            }
        }

        /// Number of effects (timers) currently running
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.running_effects.load(Ordering::Acquire)
        }

        /// Whether shutdown has been initiated
        #[must_use]
        pub fn is_shutting_down(&self) -> bool {
            *self.stopping.borrow()
        }

        /// Stop accepting actions and cancel pending timers
        ///
        /// A cancelled timer never delivers its action. Returns once every
        /// timer task has exited, or when `timeout` expires.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if effect tasks are still
        /// running after `timeout`.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating shutdown");
            metrics::counter!(names::SHUTDOWN_INITIATED).increment(1);

            self.stopping.send_replace(true);

            let start = tokio::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects();
                if pending == 0 {
                    tracing::info!("Shutdown complete");
                    metrics::counter!(names::SHUTDOWN_COMPLETED).increment(1);
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(pending_effects = pending, "Shutdown timed out");
                    metrics::counter!(names::SHUTDOWN_TIMEOUT).increment(1);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Apply `action` and start the effects it returns
        ///
        /// Returns once the state has changed and the snapshot is published;
        /// timers keep running in the background.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            self.send_and_inspect(action, |_| ()).await
        }

        /// Apply `action` and read the resulting state atomically
        ///
        /// `inspect` runs under the write lock that applied the action, so
        /// it sees exactly this action's transition and never a later one.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        ///
        /// # Example
        ///
        /// ```ignore
        /// let outcome = store
        ///     .send_and_inspect(TaskAction::ToggleTask { id }, |s| s.last_outcome.clone())
        ///     .await?;
        /// ```
        pub async fn send_and_inspect<F, T>(&self, action: A, inspect: F) -> Result<T, StoreError>
        where
            F: FnOnce(&S) -> T + Send,
        {
            if self.is_shutting_down() {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!(names::SHUTDOWN_REJECTED).increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            metrics::counter!(names::COMMANDS_TOTAL).increment(1);

            let (effects, inspected) = {
                let mut state = self.state.write().await;

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                metrics::histogram!(names::REDUCER_DURATION)
                    .record(start.elapsed().as_secs_f64());

                // Effect counts stay far below 2^52
                #[allow(clippy::cast_precision_loss)]
                metrics::histogram!(names::EFFECTS_COUNT).record(effects.len() as f64);
                tracing::trace!(effects = effects.len(), "Reducer completed");

                self.snapshots.send_replace(state.clone());
                (effects, inspect(&state))
            };

            for effect in effects {
                self.execute(effect);
            }

            Ok(inspected)
        }

        /// Subscribe to state snapshots
        ///
        /// `changed()` resolves after the next processed action. Slow
        /// observers skip intermediate snapshots but never see a partially
        /// applied one.
        #[must_use]
        pub fn subscribe(&self) -> watch::Receiver<S> {
            self.snapshots.subscribe()
        }

        /// Clone of the latest published snapshot
        #[must_use]
        pub fn snapshot(&self) -> S {
            self.snapshots.borrow().clone()
        }

        /// Read current state via a closure
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        fn execute(&self, effect: Effect<A>) {
            match effect {
                Effect::None => {},
                Effect::Delay { duration, action } => {
                    metrics::counter!(names::EFFECTS_EXECUTED, "type" => "delay").increment(1);
                    tracing::trace!(?duration, "Scheduling delayed action");

                    let running = RunningEffect::start(&self.running_effects);
                    let stop = stop_requested(self.stopping.subscribe());
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _running = running;
                        tokio::select! {
                            () = tokio::time::sleep(duration) => {
                                if let Err(error) = store.send(*action).await {
                                    tracing::debug!(%error, "Dropped delayed action");
                                }
                            },
                            () = stop => {
                                tracing::debug!("Delayed action cancelled by shutdown");
                                metrics::counter!(names::EFFECTS_CANCELLED).increment(1);
                            },
                        }
                    });
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
                stopping: Arc::clone(&self.stopping),
                running_effects: Arc::clone(&self.running_effects),
                snapshots: Arc::clone(&self.snapshots),
            }
        }
    }
}

pub use store::Store;
