//! # EventPulse Testing
//!
//! Testing utilities and helpers for EventPulse reducers.
//!
//! This crate provides:
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - Assertion helpers for returned effects
//! - [`collect_actions`], which runs an effect tree inline and gathers the
//!   actions it produces
//! - Deterministic time ([`FixedClock`]) and test tracing setup
//!
//! ## Example
//!
//! ```ignore
//! use eventpulse_testing::{collect_actions, ReducerTest};
//!
//! #[tokio::test]
//! async fn test_catalog_fetch() {
//!     let mut state = CatalogState::default();
//!     let effects = CatalogReducer.reduce(&mut state, CatalogAction::Activate, &env);
//!
//!     let actions = collect_actions(effects).await;
//!     assert!(matches!(actions[0], CatalogAction::EventsLoaded(Ok(_))));
//! }
//! ```

use chrono::{DateTime, Utc};
use eventpulse_core::effect::Effect;
use eventpulse_core::environment::Clock;
use std::future::Future;
use std::pin::Pin;


pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use eventpulse_testing::mocks::FixedClock;
    /// use eventpulse_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse, which cannot happen.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock};

type CollectFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Run effects inline and return the actions they produce, in order
///
/// Futures are awaited one after another. Delays return their action
/// immediately without sleeping. `Cancellable` wrappers are unwrapped and
/// `Cancel` effects produce nothing, since there is nothing running to abort.
pub async fn collect_actions<A, I>(effects: I) -> Vec<A>
where
    A: Send + 'static,
    I: IntoIterator<Item = Effect<A>>,
{
    let mut actions = Vec::new();
    for effect in effects {
        collect_into(effect, &mut actions).await;
    }
    actions
}

fn collect_into<A>(effect: Effect<A>, out: &mut Vec<A>) -> CollectFuture<'_>
where
    A: Send + 'static,
{
    Box::pin(async move {
        match effect {
            Effect::None | Effect::Cancel(_) => {},
            Effect::Future(fut) => {
                if let Some(action) = fut.await {
                    out.push(action);
                }
            },
            Effect::Delay { action, .. } => out.push(*action),
            Effect::Cancellable { effect, .. } => collect_into(*effect, out).await,
        }
    })
}

/// Install a tracing subscriber that writes through the test harness
///
/// Honors `RUST_LOG`. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum TestAction {
        Loaded(u32),
        Redirect,
    }

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[tokio::test]
    async fn test_collect_actions_walks_nested_effects() {
        let effects = vec![
            Effect::Future(Box::pin(async { Some(TestAction::Loaded(1)) })).cancellable("view"),
            Effect::Cancel("other".into()),
            Effect::Future(Box::pin(async { None })),
            Effect::Delay {
                duration: Duration::from_secs(60),
                action: Box::new(TestAction::Redirect),
            }
            .cancellable("view"),
        ];

        let actions = collect_actions(effects).await;
        assert_eq!(actions, vec![TestAction::Loaded(1), TestAction::Redirect]);
    }

    #[tokio::test]
    async fn test_collect_actions_empty() {
        let actions = collect_actions(Vec::<Effect<TestAction>>::new()).await;
        assert!(actions.is_empty());
    }

    #[test]
    fn test_init_test_tracing_twice() {
        init_test_tracing();
        init_test_tracing();
    }
}
