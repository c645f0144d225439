//! Scripted event API for tests and offline demos

use super::{ApiFuture, EventApi};
use crate::error::{ApiError, ApiResult};
use crate::types::{BookingRequest, Event, EventId};
use futures::FutureExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct MockState {
    events: Vec<Event>,
    list_failure: Option<ApiError>,
    booking_failure: Option<ApiError>,
    latency: Duration,
    bookings: Vec<BookingRequest>,
}

/// In-memory [`EventApi`] with call counters
///
/// Clones share state, so a test can keep one handle while the view
/// environment owns another.
///
/// # Example
///
/// ```ignore
/// let api = MockEventApi::with_events(vec![jazz_night()]);
/// let env = DetailEnvironment::new(Arc::new(api.clone()), session, clock);
/// // ... drive the view ...
/// assert_eq!(api.booking_calls(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockEventApi {
    state: Arc<Mutex<MockState>>,
    list_calls: Arc<AtomicUsize>,
    get_calls: Arc<AtomicUsize>,
    booking_calls: Arc<AtomicUsize>,
}

impl MockEventApi {
    /// An API serving no events
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An API serving `events`
    #[must_use]
    pub fn with_events(events: Vec<Event>) -> Self {
        let api = Self::default();
        api.lock().events = events;
        api
    }

    /// Make `list_events` fail with `error`
    #[must_use]
    pub fn failing_list(self, error: ApiError) -> Self {
        self.lock().list_failure = Some(error);
        self
    }

    /// Make `book_tickets` fail with `error`
    #[must_use]
    pub fn failing_bookings(self, error: ApiError) -> Self {
        self.lock().booking_failure = Some(error);
        self
    }

    /// Delay every response by `latency`
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = latency;
        self
    }

    /// Number of `list_events` calls so far
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `get_event` calls so far
    #[must_use]
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// Number of `book_tickets` calls so far, successful or not
    #[must_use]
    pub fn booking_calls(&self) -> usize {
        self.booking_calls.load(Ordering::SeqCst)
    }

    /// Bookings that succeeded, in order
    #[must_use]
    pub fn bookings(&self) -> Vec<BookingRequest> {
        self.lock().bookings.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn respond<T: Send + 'static>(&self, result: ApiResult<T>) -> ApiFuture<T> {
        let latency = self.lock().latency;
        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            result
        }
        .boxed()
    }
}

impl EventApi for MockEventApi {
    fn list_events(&self) -> ApiFuture<Vec<Event>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let result = {
            let state = self.lock();
            state
                .list_failure
                .clone()
                .map_or_else(|| Ok(state.events.clone()), Err)
        };
        self.respond(result)
    }

    fn get_event(&self, id: &EventId) -> ApiFuture<Event> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let result = self
            .lock()
            .events
            .iter()
            .find(|event| &event.id == id)
            .cloned()
            .ok_or(ApiError::NotFound);
        self.respond(result)
    }

    fn book_tickets(&self, request: BookingRequest) -> ApiFuture<()> {
        self.booking_calls.fetch_add(1, Ordering::SeqCst);
        let result = {
            let mut state = self.lock();
            match state.booking_failure.clone() {
                Some(error) => Err(error),
                None => {
                    state.bookings.push(request);
                    Ok(())
                },
            }
        };
        self.respond(result)
    }
}
