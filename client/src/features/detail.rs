//! Event detail and booking view.
//!
//! Fetches a single event, collects a ticket quantity and submits bookings.
//! Booking requires a session; anonymous users are sent to the login page
//! without any request being made.

use super::ViewEnvironment;
use crate::error::ApiResult;
use crate::loadable::Loadable;
use crate::routes::Route;
use crate::types::{BookingRequest, Event, EventId, Quantity};
use chrono::{DateTime, Utc};
use eventpulse_core::{async_effect, delay, effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::sync::Arc;

/// Cancellation id for everything the detail view starts
pub const LIFETIME: &str = "detail";

/// Cancellation id for the event fetch; a newer fetch replaces an older one
pub const FETCH: &str = "detail.fetch";

/// Message shown when the event cannot be fetched
pub const FETCH_ERROR: &str = "Failed to fetch event details";

/// Message shown after a successful booking
pub const BOOKING_SUCCESS: &str = "Tickets booked successfully!";

/// Message shown when a booking fails
pub const BOOKING_ERROR: &str = "Failed to book tickets";

/// What the detail view is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailStatus {
    /// Fetch in flight
    Loading,
    /// Fetch failed; the event is treated as missing
    NotFound,
    /// Event loaded, booking form available
    Ready,
}

/// Detail view state
#[derive(Debug, Clone, Default)]
pub struct DetailState {
    /// The event this view was activated for
    pub event_id: Option<EventId>,
    /// The event, as fetched
    pub event: Loadable<Event>,
    /// Tickets to book
    pub quantity: Quantity,
    /// Inline error message
    pub error: Option<String>,
    /// Inline success message
    pub success: Option<String>,
    /// When the event was last fetched
    pub fetched_at: Option<DateTime<Utc>>,
    /// Navigation requested by the view, drained by the app shell
    pub redirect: Option<Route>,
}

impl DetailState {
    /// Current view status
    #[must_use]
    pub const fn status(&self) -> DetailStatus {
        match self.event {
            Loadable::Pending => DetailStatus::Loading,
            Loadable::Failed(_) => DetailStatus::NotFound,
            Loadable::Loaded(_) => DetailStatus::Ready,
        }
    }

    /// Suggested upper bound for the quantity input
    ///
    /// Availability is a snapshot from the last fetch and is not enforced;
    /// the server decides whether a booking fits.
    #[must_use]
    pub fn max_quantity(&self) -> Option<u32> {
        self.event.loaded().map(|event| event.total_tickets)
    }
}

/// Detail view actions
#[derive(Debug, Clone)]
pub enum DetailAction {
    /// View shown for `id` (or the route id changed)
    Activate(EventId),
    /// Event fetch finished
    EventLoaded {
        /// The id the fetch was made for
        id: EventId,
        /// Fetch outcome
        result: ApiResult<Event>,
    },
    /// Quantity input edited
    QuantityChanged(String),
    /// "Book Tickets" pressed
    BookTickets,
    /// Booking request finished
    BookingCompleted(ApiResult<()>),
    /// Post-booking redirect delay elapsed
    RedirectElapsed,
}

/// Detail view reducer
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailReducer;

impl DetailReducer {
    fn book(
        state: &mut DetailState,
        env: &ViewEnvironment,
    ) -> SmallVec<[Effect<DetailAction>; 4]> {
        let Some(user) = env.session.current_user() else {
            tracing::info!("Booking requires a session, redirecting to login");
            state.redirect = Some(Route::Login);
            return SmallVec::new();
        };

        let Some(event) = state.event.loaded() else {
            tracing::warn!(status = ?state.status(), "Ignoring booking: event not loaded");
            return SmallVec::new();
        };

        let request = BookingRequest {
            event_id: event.id.clone(),
            quantity: state.quantity,
        };
        state.error = None;
        state.success = None;
        tracing::info!(
            user = %user.email,
            event_id = %request.event_id,
            quantity = request.quantity.get(),
            "Booking tickets"
        );

        let api = Arc::clone(&env.api);
        let booking = async_effect! {
            Some(DetailAction::BookingCompleted(api.book_tickets(request).await))
        };
        smallvec![booking.cancellable(LIFETIME)]
    }
}

impl Reducer for DetailReducer {
    type State = DetailState;
    type Action = DetailAction;
    type Environment = ViewEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            DetailAction::Activate(id) => {
                *state = DetailState {
                    event_id: Some(id.clone()),
                    ..DetailState::default()
                };

                let api = Arc::clone(&env.api);
                let fetch = async_effect! {
                    let result = api.get_event(&id).await;
                    Some(DetailAction::EventLoaded { id, result })
                };
                smallvec![fetch.cancel_in_flight(FETCH).cancellable(LIFETIME)]
            },
            DetailAction::EventLoaded { id, result } => {
                if state.event_id.as_ref() != Some(&id) {
                    tracing::debug!(event_id = %id, "Dropping stale event response");
                    return SmallVec::new();
                }

                state.fetched_at = Some(env.clock.now());
                if let Err(error) = &result {
                    tracing::error!(event_id = %id, error = %error, "Error fetching event");
                    state.error = Some(FETCH_ERROR.to_string());
                }
                state.event = result.into();
                SmallVec::new()
            },
            DetailAction::QuantityChanged(text) => {
                state.quantity = Quantity::from_input(&text);
                SmallVec::new()
            },
            DetailAction::BookTickets => Self::book(state, env),
            DetailAction::BookingCompleted(Ok(())) => {
                tracing::info!("Booking confirmed");
                state.success = Some(BOOKING_SUCCESS.to_string());
                smallvec![
                    delay! {
                        duration: env.redirect_delay,
                        action: DetailAction::RedirectElapsed
                    }
                    .cancellable(LIFETIME)
                ]
            },
            DetailAction::BookingCompleted(Err(error)) => {
                tracing::error!(error = %error, "Error booking tickets");
                state.error = Some(BOOKING_ERROR.to_string());
                SmallVec::new()
            },
            DetailAction::RedirectElapsed => {
                state.redirect = Some(Route::Dashboard);
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use crate::api::MockEventApi;
    use crate::error::ApiError;
    use crate::features::fixtures::{anonymous, env, sample_events, signed_in};
    use eventpulse_testing::{assertions, collect_actions, ReducerTest};
    use std::time::Duration;

    fn loaded(id: &str) -> Vec<DetailAction> {
        let event = sample_events()
            .into_iter()
            .find(|e| e.id.as_str() == id)
            .unwrap();
        vec![
            DetailAction::Activate(EventId::new(id)),
            DetailAction::EventLoaded {
                id: EventId::new(id),
                result: Ok(event),
            },
        ]
    }

    #[tokio::test]
    async fn test_activate_fetches_event() {
        let api = MockEventApi::with_events(sample_events());
        let env = env(&api, anonymous());
        let mut state = DetailState::default();

        let effects = DetailReducer.reduce(&mut state, DetailAction::Activate("2".into()), &env);
        assert_eq!(state.status(), DetailStatus::Loading);
        assertions::assert_cancellable(&effects, LIFETIME);
        assertions::assert_cancellable(&effects, FETCH);

        let actions = collect_actions(effects).await;
        assert_eq!(api.get_calls(), 1);
        assert!(matches!(
            &actions[..],
            [DetailAction::EventLoaded { id, result: Ok(event) }] if id.as_str() == "2" && event.title == "Rock Fest"
        ));
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let env = env(&MockEventApi::new(), anonymous());

        ReducerTest::new(DetailReducer)
            .with_env(env)
            .given_state(DetailState::default())
            .given_actions(vec![DetailAction::Activate("404".into())])
            .when_action(DetailAction::EventLoaded {
                id: "404".into(),
                result: Err(ApiError::NotFound),
            })
            .then_state(|state| {
                assert_eq!(state.status(), DetailStatus::NotFound);
                assert_eq!(state.error.as_deref(), Some(FETCH_ERROR));
            })
            .run();
    }

    #[test]
    fn test_stale_response_is_ignored() {
        let env = env(&MockEventApi::new(), anonymous());
        let stale = sample_events().remove(0);

        ReducerTest::new(DetailReducer)
            .with_env(env)
            .given_state(DetailState::default())
            .given_actions(vec![DetailAction::Activate("2".into())])
            .when_action(DetailAction::EventLoaded {
                id: "1".into(),
                result: Ok(stale),
            })
            .then_state(|state| {
                assert_eq!(state.status(), DetailStatus::Loading);
                assert_eq!(state.event_id, Some(EventId::new("2")));
            })
            .run();
    }

    #[test]
    fn test_quantity_input_coercion() {
        let env = env(&MockEventApi::new(), anonymous());
        let mut state = DetailState::default();

        for (input, expected) in [("abc", 1), ("-5", 1), ("0", 1), ("3", 3), ("7 seats", 7)] {
            let effects =
                DetailReducer.reduce(&mut state, DetailAction::QuantityChanged(input.into()), &env);
            assertions::assert_no_effects(&effects);
            assert_eq!(state.quantity.get(), expected, "input {input:?}");
        }
    }

    #[test]
    fn test_book_without_session_redirects_to_login() {
        let api = MockEventApi::with_events(sample_events());
        let env = env(&api, anonymous());

        ReducerTest::new(DetailReducer)
            .with_env(env)
            .given_state(DetailState::default())
            .given_actions(loaded("1"))
            .when_action(DetailAction::BookTickets)
            .then_state(|state| {
                assert_eq!(state.redirect, Some(Route::Login));
            })
            .then_effects(assertions::assert_no_async_effects)
            .run();

        assert_eq!(api.booking_calls(), 0);
    }

    #[tokio::test]
    async fn test_book_sends_one_request_with_quantity() {
        let api = MockEventApi::with_events(sample_events());
        let env = env(&api, signed_in(false));
        let mut state = DetailState::default();
        for action in loaded("1") {
            let _ = DetailReducer.reduce(&mut state, action, &env);
        }
        let _ = DetailReducer.reduce(&mut state, DetailAction::QuantityChanged("3".into()), &env);
        state.error = Some(BOOKING_ERROR.to_string());

        let effects = DetailReducer.reduce(&mut state, DetailAction::BookTickets, &env);
        assert_eq!(state.error, None);
        assertions::assert_effects_count(&effects, 1);
        assertions::assert_cancellable(&effects, LIFETIME);

        let actions = collect_actions(effects).await;
        assert!(matches!(&actions[..], [DetailAction::BookingCompleted(Ok(()))]));
        assert_eq!(
            api.bookings(),
            vec![BookingRequest {
                event_id: EventId::new("1"),
                quantity: Quantity::new(3),
            }]
        );
    }

    #[test]
    fn test_book_before_load_is_ignored() {
        let api = MockEventApi::with_events(sample_events());
        let env = env(&api, signed_in(false));

        ReducerTest::new(DetailReducer)
            .with_env(env)
            .given_state(DetailState::default())
            .given_actions(vec![DetailAction::Activate("1".into())])
            .when_action(DetailAction::BookTickets)
            .then_state(|state| {
                assert_eq!(state.redirect, None);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_booking_success_schedules_dashboard_redirect() {
        let env = env(&MockEventApi::new(), signed_in(false));

        ReducerTest::new(DetailReducer)
            .with_env(env)
            .given_state(DetailState::default())
            .given_actions(loaded("1"))
            .when_action(DetailAction::BookingCompleted(Ok(())))
            .then_state(|state| {
                assert_eq!(state.success.as_deref(), Some(BOOKING_SUCCESS));
                assert_eq!(state.redirect, None);
            })
            .then_effects(|effects| {
                let (duration, action) = assertions::assert_has_delay_effect(effects);
                assert_eq!(duration, Duration::from_millis(2000));
                assert!(matches!(action, DetailAction::RedirectElapsed));
                assertions::assert_cancellable(effects, LIFETIME);
            })
            .run();
    }

    #[test]
    fn test_booking_failure_shows_error_without_redirect() {
        let env = env(&MockEventApi::new(), signed_in(false));

        ReducerTest::new(DetailReducer)
            .with_env(env)
            .given_state(DetailState::default())
            .given_actions(loaded("1"))
            .when_action(DetailAction::BookingCompleted(Err(ApiError::Status {
                status: 409,
                message: "sold out".into(),
            })))
            .then_state(|state| {
                assert_eq!(state.error.as_deref(), Some(BOOKING_ERROR));
                assert_eq!(state.success, None);
                assert_eq!(state.status(), DetailStatus::Ready);
            })
            .then_effects(|effects| assert!(assertions::find_delay(effects).is_none()))
            .run();
    }

    #[test]
    fn test_redirect_elapsed_requests_dashboard() {
        let env = env(&MockEventApi::new(), signed_in(false));

        ReducerTest::new(DetailReducer)
            .with_env(env)
            .given_state(DetailState::default())
            .when_action(DetailAction::RedirectElapsed)
            .then_state(|state| assert_eq!(state.redirect, Some(Route::Dashboard)))
            .run();
    }

    #[test]
    fn test_max_quantity_is_advisory() {
        let env = env(&MockEventApi::new(), signed_in(false));
        let mut state = DetailState::default();
        for action in loaded("1") {
            let _ = DetailReducer.reduce(&mut state, action, &env);
        }
        let _ = DetailReducer.reduce(&mut state, DetailAction::QuantityChanged("500".into()), &env);

        assert_eq!(state.max_quantity(), Some(100));
        assert_eq!(state.quantity.get(), 500);
    }
}
