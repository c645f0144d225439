//! Event API abstraction.
//!
//! Views talk to the backend only through [`EventApi`], injected via their
//! environment. [`HttpEventApi`] is the production implementation;
//! [`MockEventApi`] serves scripted responses for tests and demos.

use crate::error::ApiResult;
use crate::types::{BookingRequest, Event, EventId};
use futures::future::BoxFuture;
use std::sync::Arc;

mod http;
mod mock;

pub use http::HttpEventApi;
pub use mock::MockEventApi;

/// Boxed future returned by [`EventApi`] calls
pub type ApiFuture<T> = BoxFuture<'static, ApiResult<T>>;

/// Shared API handle held by view environments
pub type SharedEventApi = Arc<dyn EventApi>;

/// Operations the client needs from the booking backend
///
/// Returned futures own everything they need, so they can be moved into
/// effects that outlive the reducer call.
pub trait EventApi: Send + Sync {
    /// `GET /event`
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or an
    /// unparseable body.
    fn list_events(&self) -> ApiFuture<Vec<Event>>;

    /// `GET /event/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`](crate::error::ApiError::NotFound) for
    /// unknown ids, otherwise as [`EventApi::list_events`].
    fn get_event(&self, id: &EventId) -> ApiFuture<Event>;

    /// `POST /ticket`; any 2xx response is success and the body is ignored
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx status.
    fn book_tickets(&self, request: BookingRequest) -> ApiFuture<()>;
}
