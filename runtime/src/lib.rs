//! # Stask Runtime
//!
//! Runtime implementation for the Stask to-do list manager.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling, plus the file-backed key-value store used by the
//! binary.
//!
//! ## Core Components
//!
//! - **Store**: Owns state, runs the reducer, executes effects in order
//! - **Feedback loop**: Actions produced by effects are reduced before `send` returns
//! - **`FileStore`**: JSON document on disk implementing `KeyValueStore`
//!
//! ## Example
//!
//! ```ignore
//! use stask_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action; its effects have finished when this returns
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use stask_core::{effect::Effect, reducer::Reducer};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// File-backed key-value store
pub mod file_store;

/// Metric descriptions for the Store runtime
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Effects kept feeding actions back past the configured limit
        ///
        /// State changes made before the limit was reached are kept.
        #[error("Feedback limit of {0} actions exceeded in a single send")]
        FeedbackLimitExceeded(usize),
    }
}

pub use error::StoreError;
pub use file_store::FileStore;
pub use store::Store;

/// Configuration for Store behavior
///
/// # Example
///
/// ```
/// use stask_runtime::StoreConfig;
///
/// let config = StoreConfig::default().with_feedback_limit(8);
/// assert_eq!(config.feedback_limit, 8);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum number of actions reduced by a single `send`, including the
    /// initial action and every action fed back by effects
    pub feedback_limit: usize,
}

impl StoreConfig {
    /// Set the feedback limit
    #[must_use]
    pub const fn with_feedback_limit(mut self, limit: usize) -> Self {
        self.feedback_limit = limit;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { feedback_limit: 64 }
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{Arc, Effect, Mutex, Reducer, RwLock, StoreConfig, StoreError, VecDeque};
    use crate::metrics::names;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` so readers can take snapshots)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Dispatch is serialized: one `send` runs its reducer, awaits each of
    /// its effects in order, and reduces every fed-back action before the
    /// next `send` starts. Writes issued by effects therefore happen in
    /// dispatch order.
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
        dispatch: Mutex<()>,
        config: StoreConfig,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses [`StoreConfig::default`].
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig,
        ) -> Self {
            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                dispatch: Mutex::new(()),
                config,
            }
        }

        /// Send an action to the store
        ///
        /// Runs the reducer, then executes the returned effects to completion.
        /// Actions produced by `Effect::Future` are queued and reduced in turn
        /// before this returns.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::FeedbackLimitExceeded`] if more than
        /// `feedback_limit` actions are reduced during this call.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            let _dispatch = self.dispatch.lock().await;

            let mut queue = VecDeque::from([action]);
            let mut reduced = 0usize;

            while let Some(action) = queue.pop_front() {
                if reduced == self.config.feedback_limit {
                    tracing::error!(
                        limit = self.config.feedback_limit,
                        "Feedback limit exceeded, dropping remaining actions"
                    );
                    return Err(StoreError::FeedbackLimitExceeded(self.config.feedback_limit));
                }
                reduced += 1;

                tracing::debug!("Processing action");
                metrics::counter!(names::COMMANDS_TOTAL).increment(1);

                let effects = {
                    let mut state = self.state.write().await;
                    tracing::trace!("Acquired write lock on state");

                    let span = tracing::debug_span!("reducer_execution");
                    let _enter = span.enter();

                    let start = std::time::Instant::now();
                    let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                    metrics::histogram!(names::REDUCER_DURATION)
                        .record(start.elapsed().as_secs_f64());

                    tracing::trace!("Reducer completed, returned {} effects", effects.len());
                    effects
                };

                let mut pending: VecDeque<Effect<A>> = effects.into_iter().collect();
                while let Some(effect) = pending.pop_front() {
                    match effect {
                        Effect::None => {
                            tracing::trace!("Executing Effect::None (no-op)");
                            metrics::counter!(names::EFFECTS_EXECUTED, "type" => "none")
                                .increment(1);
                        },
                        Effect::Sequential(effects) => {
                            tracing::trace!(
                                "Executing Effect::Sequential with {} effects",
                                effects.len()
                            );
                            metrics::counter!(names::EFFECTS_EXECUTED, "type" => "sequential")
                                .increment(1);
                            for effect in effects.into_iter().rev() {
                                pending.push_front(effect);
                            }
                        },
                        Effect::Future(fut) => {
                            tracing::trace!("Executing Effect::Future");
                            metrics::counter!(names::EFFECTS_EXECUTED, "type" => "future")
                                .increment(1);
                            if let Some(action) = fut.await {
                                tracing::trace!("Effect::Future produced an action, queueing it");
                                queue.push_back(action);
                            } else {
                                tracing::trace!("Effect::Future completed with no action");
                            }
                        },
                    }
                }
            }

            tracing::debug!(reduced, "Action processing completed");
            Ok(())
        }

        /// Read current state via a closure
        ///
        /// Access state through a closure to ensure the lock is released promptly:
        ///
        /// ```ignore
        /// let count = store.state(|s| s.todos.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use stask_core::SmallVec;
    use stask_core::smallvec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug, Default)]
    struct TestState {
        value: i32,
        log: Vec<&'static str>,
    }

    #[derive(Clone, Debug)]
    enum TestAction {
        Increment,
        IncrementThenEcho,
        Echo,
        Chain,
        Loop,
    }

    #[derive(Clone, Default)]
    struct TestEnv {
        futures_run: Arc<AtomicUsize>,
    }

    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut TestState,
            action: TestAction,
            env: &TestEnv,
        ) -> SmallVec<[Effect<TestAction>; 4]> {
            match action {
                TestAction::Increment => {
                    state.value += 1;
                    smallvec![Effect::None]
                },
                TestAction::IncrementThenEcho => {
                    state.value += 1;
                    let counter = Arc::clone(&env.futures_run);
                    smallvec![Effect::future(async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Some(TestAction::Echo)
                    })]
                },
                TestAction::Echo => {
                    state.log.push("echo");
                    SmallVec::new()
                },
                TestAction::Chain => {
                    state.log.push("chain");
                    smallvec![Effect::chain(vec![
                        Effect::future(async { Some(TestAction::Increment) }),
                        Effect::None,
                        Effect::future(async { Some(TestAction::Echo) }),
                    ])]
                },
                TestAction::Loop => {
                    state.value += 1;
                    smallvec![Effect::future(async { Some(TestAction::Loop) })]
                },
            }
        }
    }

    #[tokio::test]
    async fn send_applies_reducer() {
        let store = Store::new(TestState::default(), TestReducer, TestEnv::default());
        store.send(TestAction::Increment).await.unwrap();
        store.send(TestAction::Increment).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 2);
    }

    #[tokio::test]
    async fn feedback_actions_are_reduced_before_send_returns() {
        let env = TestEnv::default();
        let store = Store::new(TestState::default(), TestReducer, env.clone());

        store.send(TestAction::IncrementThenEcho).await.unwrap();

        assert_eq!(env.futures_run.load(Ordering::SeqCst), 1);
        let (value, log) = store.state(|s| (s.value, s.log.clone())).await;
        assert_eq!(value, 1);
        assert_eq!(log, vec!["echo"]);
    }

    #[tokio::test]
    async fn sequential_effects_feed_back_in_order() {
        let store = Store::new(TestState::default(), TestReducer, TestEnv::default());
        store.send(TestAction::Chain).await.unwrap();

        let (value, log) = store.state(|s| (s.value, s.log.clone())).await;
        assert_eq!(value, 1);
        assert_eq!(log, vec!["chain", "echo"]);
    }

    #[tokio::test]
    async fn runaway_feedback_is_bounded() {
        let store = Store::with_config(
            TestState::default(),
            TestReducer,
            TestEnv::default(),
            StoreConfig::default().with_feedback_limit(5),
        );

        let result = store.send(TestAction::Loop).await;

        assert_eq!(result, Err(StoreError::FeedbackLimitExceeded(5)));
        assert_eq!(store.state(|s| s.value).await, 5);
    }
}
