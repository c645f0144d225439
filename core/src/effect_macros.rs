//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when reducers describe async work and
//! scheduled actions.

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use eventpulse_core::async_effect;
///
/// let api = Arc::clone(&env.api);
/// async_effect! {
///     let result = api.list_events().await;
///     Some(CatalogAction::EventsLoaded(result))
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use eventpulse_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(2),
///     action: DetailAction::RedirectElapsed
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::effect::Effect;
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Loaded { count: usize },
        RedirectElapsed,
    }

    #[tokio::test]
    async fn test_async_effect_macro() {
        let count = 3;
        let effect = async_effect! {
            Some(TestAction::Loaded { count })
        };

        let Effect::Future(fut) = effect else {
            unreachable!("async_effect! must build a Future effect");
        };
        assert_eq!(fut.await, Some(TestAction::Loaded { count: 3 }));
    }

    #[test]
    fn test_delay_macro() {
        let effect = delay! {
            duration: Duration::from_secs(2),
            action: TestAction::RedirectElapsed
        };

        match effect {
            Effect::Delay { duration, action } => {
                assert_eq!(duration, Duration::from_secs(2));
                assert_eq!(*action, TestAction::RedirectElapsed);
            },
            other => unreachable!("unexpected effect {other:?}"),
        }
    }
}
