//! # EventPulse Client
//!
//! A ticket booking client built on the EventPulse reducer/store runtime.
//!
//! The client lists events, shows an event detail and booking form, and
//! reflects the session in a navigation bar. Each view is a [`Reducer`]
//! over its own state; HTTP calls, delays and logout are effects executed
//! by the [`Store`](eventpulse_runtime::Store).
//!
//! ## Architecture
//!
//! - [`api`]: the backend contract ([`api::EventApi`]) with HTTP and mock implementations
//! - [`session`]: the injected session provider
//! - [`features`]: home, catalog, detail and navigation bar views
//! - [`app`]: the shell that routes between views and cancels a departing
//!   view's effects
//! - [`render`]: plain-text rendering for the terminal front end
//!
//! ## Example
//!
//! ```no_run
//! use eventpulse_client::api::HttpEventApi;
//! use eventpulse_client::app::{AppAction, AppReducer, AppState};
//! use eventpulse_client::features::ViewEnvironment;
//! use eventpulse_client::routes::Route;
//! use eventpulse_client::session::InMemorySessionProvider;
//! use eventpulse_core::environment::SystemClock;
//! use eventpulse_runtime::Store;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = ViewEnvironment::new(
//!     Arc::new(SystemClock),
//!     Arc::new(HttpEventApi::new("http://localhost:8081/api")),
//!     InMemorySessionProvider::anonymous().into_context(),
//! );
//! let store = Store::new(AppState::default(), AppReducer::new(), env);
//!
//! let mut handle = store.send(AppAction::Navigate(Route::Events)).await?;
//! handle.wait_with_timeout(Duration::from_secs(10)).await?;
//!
//! let titles = store
//!     .state(|s| s.catalog.visible_events().iter().map(|e| e.title.clone()).collect::<Vec<_>>())
//!     .await;
//! # Ok(())
//! # }
//! ```
//!
//! [`Reducer`]: eventpulse_core::reducer::Reducer

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod features;
pub mod loadable;
pub mod render;
pub mod routes;
pub mod session;
pub mod types;

pub use app::{AppAction, AppReducer, AppState};
pub use config::Config;
pub use error::{ApiError, ConfigError};
pub use routes::Route;
