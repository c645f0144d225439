//! Home view: hero with a browse action and a strip of featured events.

use super::ViewEnvironment;
use crate::error::ApiResult;
use crate::loadable::Loadable;
use crate::routes::Route;
use crate::types::{Event, EventId};
use eventpulse_core::{async_effect, effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::sync::Arc;

/// Cancellation id for everything the home view starts
pub const LIFETIME: &str = "home";

/// Home view state
#[derive(Debug, Clone, Default)]
pub struct HomeState {
    /// Featured events
    pub featured: Loadable<Vec<Event>>,
    /// Navigation requested by the view, drained by the app shell
    pub redirect: Option<Route>,
}

impl HomeState {
    /// Events to show in the featured strip
    ///
    /// A failed fetch shows an empty strip rather than an error.
    #[must_use]
    pub fn featured_events(&self) -> &[Event] {
        self.featured.loaded().map(Vec::as_slice).unwrap_or_default()
    }
}

/// Home view actions
#[derive(Debug, Clone)]
pub enum HomeAction {
    /// View shown: fetch events for the featured strip
    Activate,
    /// Event list fetch finished
    FeaturedLoaded(ApiResult<Vec<Event>>),
    /// "Browse Events" pressed
    BrowseEvents,
    /// "View Details" chosen on a featured card
    ViewDetails(EventId),
}

/// Home view reducer
#[derive(Debug, Clone, Copy, Default)]
pub struct HomeReducer;

impl Reducer for HomeReducer {
    type State = HomeState;
    type Action = HomeAction;
    type Environment = ViewEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            HomeAction::Activate => {
                state.featured = Loadable::Pending;
                let api = Arc::clone(&env.api);
                smallvec![
                    async_effect! {
                        Some(HomeAction::FeaturedLoaded(api.list_events().await))
                    }
                    .cancel_in_flight(LIFETIME)
                ]
            },
            HomeAction::FeaturedLoaded(Ok(mut events)) => {
                events.truncate(env.featured_count);
                state.featured = Loadable::Loaded(events);
                SmallVec::new()
            },
            HomeAction::FeaturedLoaded(Err(error)) => {
                tracing::error!(error = %error, "Error fetching featured events");
                state.featured = Loadable::Failed(error);
                SmallVec::new()
            },
            HomeAction::BrowseEvents => {
                state.redirect = Some(Route::Events);
                SmallVec::new()
            },
            HomeAction::ViewDetails(id) => {
                state.redirect = Some(Route::EventDetail(id));
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockEventApi;
    use crate::error::ApiError;
    use crate::features::fixtures::{anonymous, env, sample_events};
    use eventpulse_testing::{assertions, ReducerTest};

    #[test]
    fn test_activate_fetches_under_lifetime() {
        ReducerTest::new(HomeReducer)
            .with_env(env(&MockEventApi::new(), anonymous()))
            .given_state(HomeState::default())
            .when_action(HomeAction::Activate)
            .then_state(|state| assert!(state.featured.is_pending()))
            .then_effects(|effects| {
                assertions::assert_has_future_effect(effects);
                assertions::assert_cancellable(effects, LIFETIME);
            })
            .run();
    }

    #[test]
    fn test_featured_keeps_first_three() {
        ReducerTest::new(HomeReducer)
            .with_env(env(&MockEventApi::new(), anonymous()))
            .given_state(HomeState::default())
            .when_action(HomeAction::FeaturedLoaded(Ok(sample_events())))
            .then_state(|state| {
                let ids: Vec<&str> = state.featured_events().iter().map(|e| e.id.as_str()).collect();
                assert_eq!(ids, vec!["1", "2", "3"]);
            })
            .run();
    }

    #[test]
    fn test_featured_count_is_configurable() {
        let mut env = env(&MockEventApi::new(), anonymous());
        env.featured_count = 1;

        ReducerTest::new(HomeReducer)
            .with_env(env)
            .given_state(HomeState::default())
            .when_action(HomeAction::FeaturedLoaded(Ok(sample_events())))
            .then_state(|state| assert_eq!(state.featured_events().len(), 1))
            .run();
    }

    #[test]
    fn test_failure_shows_empty_strip() {
        ReducerTest::new(HomeReducer)
            .with_env(env(&MockEventApi::new(), anonymous()))
            .given_state(HomeState::default())
            .when_action(HomeAction::FeaturedLoaded(Err(ApiError::Request("down".into()))))
            .then_state(|state| {
                assert!(state.featured_events().is_empty());
                assert!(!state.featured.is_pending());
            })
            .run();
    }

    #[test]
    fn test_navigation_actions() {
        let env = env(&MockEventApi::new(), anonymous());
        let mut state = HomeState::default();

        let _ = HomeReducer.reduce(&mut state, HomeAction::BrowseEvents, &env);
        assert_eq!(state.redirect.take(), Some(Route::Events));

        let _ = HomeReducer.reduce(&mut state, HomeAction::ViewDetails("3".into()), &env);
        assert_eq!(state.redirect, Some(Route::EventDetail(EventId::new("3"))));
    }
}
