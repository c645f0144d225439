//! # EventPulse Core
//!
//! Core traits and types for the EventPulse booking client.
//!
//! Every view of the client is a small state machine built from the same
//! pieces:
//!
//! - **State**: What a view currently shows (loaded events, messages, inputs)
//! - **Action**: Every input a view reacts to (user intents, API responses)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Description of a side effect (HTTP call, delay, cancellation)
//! - **Environment**: Injected dependencies (API client, session, clock)
//!
//! ## Principles
//!
//! - Functional core, imperative shell
//! - Unidirectional data flow
//! - Explicit effects (no hidden I/O inside reducers)
//! - Dependency injection via the environment
//!
//! ## Example
//!
//! ```ignore
//! use eventpulse_core::*;
//!
//! impl Reducer for CatalogReducer {
//!     type State = CatalogState;
//!     type Action = CatalogAction;
//!     type Environment = CatalogEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CatalogState,
//!         action: CatalogAction,
//!         env: &CatalogEnvironment,
//!     ) -> SmallVec<[Effect<CatalogAction>; 4]> {
//!         // View logic goes here
//!         smallvec![Effect::None]
//!     }
//! }
//! ```

// Re-export commonly used types
pub use smallvec::{smallvec, SmallVec};

/// Declarative macros for building effects
pub mod effect_macros;

/// Reducer module - The core trait for view logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They hold all branching logic of a view and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for view logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The view state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for DetailReducer {
    ///     type State = DetailState;
    ///     type Action = DetailAction;
    ///     type Environment = DetailEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut DetailState,
    ///         action: DetailAction,
    ///         env: &DetailEnvironment,
    ///     ) -> SmallVec<[Effect<DetailAction>; 4]> {
    ///         match action {
    ///             DetailAction::QuantityChanged(input) => {
    ///                 state.quantity = Quantity::from_input(&input);
    ///                 smallvec![Effect::None]
    ///             }
    ///             _ => smallvec![Effect::None],
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action against the current state
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// Effects to be executed by the runtime. Most actions produce zero or
        /// one effect, so a `SmallVec` avoids heap allocation.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable and cancellable.
pub mod effect {
    use serde::{Deserialize, Serialize};
    use std::fmt;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::time::Duration;

    /// Identifier grouping effects so they can be cancelled together.
    ///
    /// Views tag every effect they start with their lifetime id (for example
    /// `"catalog"`), so leaving the view can abort whatever is still running.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EffectId(String);

    impl EffectId {
        /// Create a new effect id
        #[must_use]
        pub fn new(id: impl Into<String>) -> Self {
            Self(id.into())
        }

        /// Borrow the id as a string slice
        #[must_use]
        pub fn as_str(&self) -> &str {
            &self.0
        }
    }

    impl fmt::Display for EffectId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<&str> for EffectId {
        fn from(id: &str) -> Self {
            Self::new(id)
        }
    }

    /// Shared action transformer used by [`Effect::map`].
    type Mapper<A, B> = Arc<dyn Fn(A) -> B + Send + Sync>;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what
    /// should happen, returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Delayed action (redirects, timeouts)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

        /// Run `effect` under a cancellation id
        ///
        /// Every task the inner effect spawns is registered under `id`, so a
        /// later [`Effect::Cancel`] with the same id aborts it.
        Cancellable {
            /// Cancellation group
            id: EffectId,
            /// Abort effects already running under `id` before starting this one
            cancel_in_flight: bool,
            /// The wrapped effect
            effect: Box<Effect<Action>>,
        },

        /// Abort every running effect registered under the id
        Cancel(EffectId),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> fmt::Debug for Effect<Action>
    where
        Action: fmt::Debug,
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Cancellable {
                    id,
                    cancel_in_flight,
                    effect,
                } => f
                    .debug_struct("Effect::Cancellable")
                    .field("id", id)
                    .field("cancel_in_flight", cancel_in_flight)
                    .field("effect", effect)
                    .finish(),
                Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Returns true for [`Effect::None`]
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }

        /// Tag this effect with a cancellation id
        #[must_use]
        pub fn cancellable(self, id: impl Into<EffectId>) -> Effect<Action> {
            Effect::Cancellable {
                id: id.into(),
                cancel_in_flight: false,
                effect: Box::new(self),
            }
        }

        /// Tag this effect with a cancellation id, aborting earlier effects
        /// still running under the same id
        #[must_use]
        pub fn cancel_in_flight(self, id: impl Into<EffectId>) -> Effect<Action> {
            Effect::Cancellable {
                id: id.into(),
                cancel_in_flight: true,
                effect: Box::new(self),
            }
        }

        /// Transform the actions this effect produces
        ///
        /// Used by parent reducers to lift a child view's effects into the
        /// parent action type.
        ///
        /// # Example
        ///
        /// ```
        /// use eventpulse_core::effect::Effect;
        /// use std::time::Duration;
        ///
        /// #[derive(Debug, PartialEq)]
        /// enum Child { Tick }
        /// #[derive(Debug, PartialEq)]
        /// enum Parent { Child(Child) }
        ///
        /// let effect = Effect::Delay {
        ///     duration: Duration::from_millis(5),
        ///     action: Box::new(Child::Tick),
        /// };
        ///
        /// match effect.map(Parent::Child) {
        ///     Effect::Delay { action, .. } => assert_eq!(*action, Parent::Child(Child::Tick)),
        ///     _ => unreachable!(),
        /// }
        /// ```
        #[must_use]
        pub fn map<B, F>(self, f: F) -> Effect<B>
        where
            F: Fn(Action) -> B + Send + Sync + 'static,
            Action: 'static,
            B: 'static,
        {
            let mapper: Mapper<Action, B> = Arc::new(f);
            self.map_with(&mapper)
        }

        fn map_with<B>(self, f: &Mapper<Action, B>) -> Effect<B>
        where
            Action: 'static,
            B: 'static,
        {
            match self {
                Effect::None => Effect::None,
                Effect::Delay { duration, action } => Effect::Delay {
                    duration,
                    action: Box::new((**f)(*action)),
                },
                Effect::Future(fut) => {
                    let f = Arc::clone(f);
                    Effect::Future(Box::pin(async move { fut.await.map(|action| (*f)(action)) }))
                },
                Effect::Cancellable {
                    id,
                    cancel_in_flight,
                    effect,
                } => Effect::Cancellable {
                    id,
                    cancel_in_flight,
                    effect: Box::new(effect.map_with(f)),
                },
                Effect::Cancel(id) => Effect::Cancel(id),
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
