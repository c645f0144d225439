//! Event catalog view: all events with client-side search.

use super::ViewEnvironment;
use crate::error::ApiResult;
use crate::loadable::Loadable;
use crate::routes::Route;
use crate::types::{Event, EventId};
use chrono::{DateTime, Utc};
use eventpulse_core::{async_effect, effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::sync::Arc;

/// Cancellation id for everything the catalog view starts
pub const LIFETIME: &str = "catalog";

/// Message shown when the event list cannot be fetched
pub const FETCH_ERROR: &str = "Failed to fetch events";

/// Events whose title, description or location contain `filter`, ignoring case
///
/// Keeps the input order. An empty filter returns every event.
#[must_use]
pub fn filter_events<'a>(events: &'a [Event], filter: &str) -> Vec<&'a Event> {
    let needle = filter.to_lowercase();
    events.iter().filter(|event| event.matches(&needle)).collect()
}

/// Catalog view state
#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    /// All events, as fetched
    pub events: Loadable<Vec<Event>>,
    /// Current search text
    pub search: String,
    /// Inline error message
    pub error: Option<String>,
    /// When the list was last fetched
    pub fetched_at: Option<DateTime<Utc>>,
    /// Navigation requested by the view, drained by the app shell
    pub redirect: Option<Route>,
}

impl CatalogState {
    /// Events matching the current search text
    ///
    /// Empty unless the list has loaded.
    #[must_use]
    pub fn visible_events(&self) -> Vec<&Event> {
        self.events
            .loaded()
            .map(|events| filter_events(events, &self.search))
            .unwrap_or_default()
    }
}

/// Catalog view actions
#[derive(Debug, Clone)]
pub enum CatalogAction {
    /// View shown: fetch the event list
    Activate,
    /// Event list fetch finished
    EventsLoaded(ApiResult<Vec<Event>>),
    /// Search text edited
    SearchChanged(String),
    /// "View Details" chosen on a card
    ViewDetails(EventId),
}

/// Catalog view reducer
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogReducer;

impl Reducer for CatalogReducer {
    type State = CatalogState;
    type Action = CatalogAction;
    type Environment = ViewEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CatalogAction::Activate => {
                *state = CatalogState::default();

                let api = Arc::clone(&env.api);
                let fetch = async_effect! {
                    Some(CatalogAction::EventsLoaded(api.list_events().await))
                };
                smallvec![fetch.cancel_in_flight(LIFETIME)]
            },
            CatalogAction::EventsLoaded(result) => {
                state.fetched_at = Some(env.clock.now());
                match &result {
                    Ok(events) => {
                        tracing::debug!(count = events.len(), "Catalog loaded");
                        state.error = None;
                    },
                    Err(error) => {
                        tracing::error!(error = %error, "Error fetching events");
                        state.error = Some(FETCH_ERROR.to_string());
                    },
                }
                state.events = result.into();
                SmallVec::new()
            },
            CatalogAction::SearchChanged(text) => {
                state.search = text;
                SmallVec::new()
            },
            CatalogAction::ViewDetails(id) => {
                state.redirect = Some(Route::EventDetail(id));
                SmallVec::new()
            },
        }
    }
}
