//! The client's views.
//!
//! Each view is a reducer over its own state. Views never navigate
//! directly: they leave the requested [`Route`](crate::routes::Route) in
//! their state's `redirect` slot and the app shell applies it.
//!
//! Every effect a view starts runs under the view's lifetime id, so the app
//! shell can abort it with a single `Effect::Cancel` when the view is left.

use crate::api::SharedEventApi;
use crate::config::Config;
use crate::session::SessionContext;
use eventpulse_core::environment::Clock;
use std::sync::Arc;
use std::time::Duration;

pub mod catalog;
pub mod detail;
pub mod home;
pub mod navbar;

/// Environment dependencies shared by all views
#[derive(Clone)]
pub struct ViewEnvironment {
    /// Clock for fetch timestamps
    pub clock: Arc<dyn Clock>,
    /// Backend access
    pub api: SharedEventApi,
    /// Current session
    pub session: SessionContext,
    /// Delay before redirecting after a successful booking
    pub redirect_delay: Duration,
    /// Number of featured events on the home view
    pub featured_count: usize,
}

impl ViewEnvironment {
    /// Creates a new `ViewEnvironment` with default view settings
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, api: SharedEventApi, session: SessionContext) -> Self {
        let defaults = Config::default();
        Self {
            clock,
            api,
            session,
            redirect_delay: defaults.redirect_delay,
            featured_count: defaults.featured_count,
        }
    }

    /// Apply the view settings from `config`
    #[must_use]
    pub const fn with_config(mut self, config: &Config) -> Self {
        self.redirect_delay = config.redirect_delay;
        self.featured_count = config.featured_count;
        self
    }
}

impl std::fmt::Debug for ViewEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewEnvironment")
            .field("redirect_delay", &self.redirect_delay)
            .field("featured_count", &self.featured_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::ViewEnvironment;
    use crate::api::MockEventApi;
    use crate::session::{InMemorySessionProvider, SessionContext};
    use crate::types::{Event, EventId, User};
    use chrono::{TimeZone, Utc};
    use eventpulse_testing::test_clock;
    use std::sync::Arc;

    pub fn event(id: &str, title: &str, description: &str, location: &str) -> Event {
        Event {
            id: EventId::new(id),
            title: title.to_string(),
            description: description.to_string(),
            date: Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).single().unwrap_or_default(),
            location: location.to_string(),
            total_tickets: 100,
            price: 25.0,
            image_url: None,
        }
    }

    pub fn sample_events() -> Vec<Event> {
        vec![
            event("1", "Jazz Night", "Smooth tunes all evening", "Blue Hall"),
            event("2", "Rock Fest", "Loud guitars", "Stadium"),
            event("3", "Poetry Slam", "Spoken word", "Library Cafe"),
            event("4", "Food Fair", "Street food from everywhere", "Riverside"),
        ]
    }

    pub fn env(api: &MockEventApi, session: SessionContext) -> ViewEnvironment {
        ViewEnvironment::new(Arc::new(test_clock()), Arc::new(api.clone()), session)
    }

    pub fn anonymous() -> SessionContext {
        InMemorySessionProvider::anonymous().into_context()
    }

    pub fn signed_in(is_admin: bool) -> SessionContext {
        InMemorySessionProvider::signed_in(User::new("fan@example.com", is_admin)).into_context()
    }
}
