//! HTTP implementation of the event API

use super::{ApiFuture, EventApi};
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::types::{BookingRequest, Event, EventId};
use eventpulse_runtime::metrics::ApiMetrics;
use futures::FutureExt;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::Instrument;

/// Event API client over HTTP
#[derive(Clone, Debug)]
pub struct HttpEventApi {
    client: Client,
    api_url: String,
}

impl HttpEventApi {
    /// Create a client for `api_url` with no request timeout
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_url: config.api_url.clone(),
        })
    }

    /// The base URL requests are sent to
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Resolve `segments` below the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| ApiError::Request(format!("invalid API URL {}: {e}", self.api_url)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Request(format!("API URL cannot have a path: {}", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Map a non-success response to an error, reading the body for context
async fn check_status(response: Response) -> ApiResult<Response> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound),
        status => {
            let message = response.text().await.unwrap_or_default();
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        },
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Run a request future, recording metrics and logging failures
async fn observed<T, F>(endpoint: &'static str, request: F) -> ApiResult<T>
where
    F: std::future::Future<Output = ApiResult<T>>,
{
    let start = Instant::now();
    let result = request.await;
    ApiMetrics::record_request(endpoint, start.elapsed(), result.is_ok());

    match &result {
        Ok(_) => tracing::debug!(endpoint, elapsed_ms = start.elapsed().as_millis(), "Request succeeded"),
        Err(error) => tracing::warn!(endpoint, error = %error, "Request failed"),
    }

    result
}

impl EventApi for HttpEventApi {
    fn list_events(&self) -> ApiFuture<Vec<Event>> {
        let request = self.endpoint(&["event"]).map(|url| self.client.get(url));
        let span = tracing::info_span!("api.list_events");

        observed("list_events", async move {
            let response = check_status(request?.send().await?).await?;
            decode(response).await
        })
        .instrument(span)
        .boxed()
    }

    fn get_event(&self, id: &EventId) -> ApiFuture<Event> {
        let request = self
            .endpoint(&["event", id.as_str()])
            .map(|url| self.client.get(url));
        let span = tracing::info_span!("api.get_event", event_id = %id);

        observed("get_event", async move {
            let response = check_status(request?.send().await?).await?;
            decode(response).await
        })
        .instrument(span)
        .boxed()
    }

    fn book_tickets(&self, booking: BookingRequest) -> ApiFuture<()> {
        let span = tracing::info_span!(
            "api.book_tickets",
            event_id = %booking.event_id,
            quantity = booking.quantity.get()
        );
        let request = self
            .endpoint(&["ticket"])
            .map(|url| self.client.post(url).json(&booking));

        observed("book_tickets", async move {
            check_status(request?.send().await?).await?;
            Ok(())
        })
        .instrument(span)
        .boxed()
    }
}
