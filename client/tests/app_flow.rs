//! End-to-end view flows through the store runtime with a scripted API

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use chrono::{TimeZone, Utc};
use eventpulse_client::api::MockEventApi;
use eventpulse_client::app::{AppAction, AppReducer, AppState};
use eventpulse_client::features::catalog::CatalogAction;
use eventpulse_client::features::detail::{self, DetailAction, DetailStatus};
use eventpulse_client::features::ViewEnvironment;
use eventpulse_client::loadable::Loadable;
use eventpulse_client::session::{InMemorySessionProvider, SessionContext};
use eventpulse_client::types::{Event, EventId, Quantity, User};
use eventpulse_client::{ApiError, Route};
use eventpulse_core::effect::EffectId;
use eventpulse_runtime::Store;
use eventpulse_testing::{init_test_tracing, test_clock};
use std::sync::Arc;
use std::time::Duration;

type AppStore = Store<AppState, AppAction, ViewEnvironment, AppReducer>;

const SETTLE: Duration = Duration::from_secs(2);

fn event(id: &str, title: &str) -> Event {
    Event {
        id: EventId::new(id),
        title: title.to_string(),
        description: format!("{title} description"),
        date: Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0).unwrap(),
        location: "Town Hall".to_string(),
        total_tickets: 40,
        price: 15.0,
        image_url: None,
    }
}

fn catalog() -> Vec<Event> {
    vec![
        event("1", "Jazz Night"),
        event("2", "Rock Fest"),
        event("3", "Poetry Slam"),
        event("4", "Food Fair"),
    ]
}

fn store(api: &MockEventApi, session: SessionContext) -> AppStore {
    init_test_tracing();
    let mut env = ViewEnvironment::new(Arc::new(test_clock()), Arc::new(api.clone()), session);
    env.redirect_delay = Duration::from_millis(50);
    Store::new(AppState::default(), AppReducer::new(), env)
}

fn fan() -> SessionContext {
    InMemorySessionProvider::signed_in(User::new("fan@example.com", false)).into_context()
}

async fn navigate(store: &AppStore, route: Route) {
    let mut handle = store.send(AppAction::Navigate(route)).await.unwrap();
    handle.wait_with_timeout(SETTLE).await.unwrap();
}

async fn book(store: &AppStore) {
    let mut handle = store.send(AppAction::Detail(DetailAction::BookTickets)).await.unwrap();
    handle.wait_with_timeout(SETTLE).await.unwrap();
}

async fn wait_for_route(store: &AppStore, route: &Route) {
    tokio::time::timeout(SETTLE, async {
        while store.state(|s| &s.route != route).await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("never reached {route}"));
}

#[tokio::test]
async fn test_home_shows_first_three_events() {
    let api = MockEventApi::with_events(catalog());
    let store = store(&api, fan());

    navigate(&store, Route::Home).await;

    let titles = store
        .state(|s| s.home.featured_events().iter().map(|e| e.title.clone()).collect::<Vec<_>>())
        .await;
    assert_eq!(titles, vec!["Jazz Night", "Rock Fest", "Poetry Slam"]);
}

#[tokio::test]
async fn test_catalog_search_filters_loaded_events() {
    let api = MockEventApi::with_events(catalog());
    let store = store(&api, fan());

    navigate(&store, Route::Events).await;
    store
        .send(AppAction::Catalog(CatalogAction::SearchChanged("FEST".into())))
        .await
        .unwrap();

    let visible = store
        .state(|s| s.catalog.visible_events().iter().map(|e| e.id.clone()).collect::<Vec<_>>())
        .await;
    assert_eq!(visible, vec![EventId::new("2")]);
    assert_eq!(api.list_calls(), 1);
}

#[tokio::test]
async fn test_returning_to_catalog_clears_search() {
    let api = MockEventApi::with_events(catalog());
    let store = store(&api, fan());

    navigate(&store, Route::Events).await;
    store
        .send(AppAction::Catalog(CatalogAction::SearchChanged("jazz".into())))
        .await
        .unwrap();
    navigate(&store, Route::Home).await;
    navigate(&store, Route::Events).await;

    let (search, visible) = store
        .state(|s| (s.catalog.search.clone(), s.catalog.visible_events().len()))
        .await;
    assert_eq!(search, "");
    assert_eq!(visible, 4);
}

#[tokio::test]
async fn test_catalog_fetch_failure_shows_error() {
    let api = MockEventApi::with_events(catalog()).failing_list(ApiError::Request("offline".into()));
    let store = store(&api, fan());

    navigate(&store, Route::Events).await;

    let (error, visible) = store
        .state(|s| (s.catalog.error.clone(), s.catalog.visible_events().len()))
        .await;
    assert_eq!(error.as_deref(), Some("Failed to fetch events"));
    assert_eq!(visible, 0);
}

#[tokio::test]
async fn test_booking_success_then_dashboard() {
    let api = MockEventApi::with_events(catalog());
    let store = store(&api, fan());

    navigate(&store, Route::EventDetail("2".into())).await;
    store
        .send(AppAction::Detail(DetailAction::QuantityChanged("3".into())))
        .await
        .unwrap();

    book(&store).await;

    let success = store.state(|s| s.detail.success.clone()).await;
    assert_eq!(success.as_deref(), Some("Tickets booked successfully!"));

    wait_for_route(&store, &Route::Dashboard).await;

    let bookings = api.bookings();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].event_id, EventId::new("2"));
    assert_eq!(bookings[0].quantity, Quantity::new(3));
}

#[tokio::test]
async fn test_booking_failure_stays_on_detail() {
    let api = MockEventApi::with_events(catalog())
        .failing_bookings(ApiError::Status {
            status: 409,
            message: "sold out".into(),
        });
    let store = store(&api, fan());

    navigate(&store, Route::EventDetail("1".into())).await;
    book(&store).await;

    tokio::time::sleep(Duration::from_millis(120)).await;

    let (route, error, success) = store
        .state(|s| (s.route.clone(), s.detail.error.clone(), s.detail.success.clone()))
        .await;
    assert_eq!(route, Route::EventDetail(EventId::new("1")));
    assert_eq!(error.as_deref(), Some("Failed to book tickets"));
    assert_eq!(success, None);
    assert_eq!(api.booking_calls(), 1);
}

#[tokio::test]
async fn test_anonymous_booking_redirects_to_login() {
    let api = MockEventApi::with_events(catalog());
    let store = store(&api, InMemorySessionProvider::anonymous().into_context());

    navigate(&store, Route::EventDetail("1".into())).await;
    store.send(AppAction::Detail(DetailAction::BookTickets)).await.unwrap();

    assert_eq!(store.state(|s| s.route.clone()).await, Route::Login);
    assert_eq!(api.booking_calls(), 0);
}

#[tokio::test]
async fn test_unknown_event_is_not_found() {
    let api = MockEventApi::with_events(catalog());
    let store = store(&api, fan());

    navigate(&store, Route::EventDetail("999".into())).await;

    let (status, error) = store
        .state(|s| (s.detail.status(), s.detail.error.clone()))
        .await;
    assert_eq!(status, DetailStatus::NotFound);
    assert_eq!(error.as_deref(), Some("Failed to fetch event details"));
}

#[tokio::test]
async fn test_leaving_detail_cancels_fetch() {
    let api = MockEventApi::with_events(catalog()).with_latency(Duration::from_millis(100));
    let store = store(&api, fan());

    store
        .send(AppAction::Navigate(Route::EventDetail("1".into())))
        .await
        .unwrap();
    assert_eq!(store.running_effects(&EffectId::new(detail::LIFETIME)), 1);

    navigate(&store, Route::Events).await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(store.running_effects(&EffectId::new(detail::LIFETIME)), 0);
    let detail = store.state(|s| s.detail.clone()).await;
    assert!(matches!(detail.event, Loadable::Pending));
    assert_eq!(detail.error, None);
}

#[tokio::test]
async fn test_leaving_detail_cancels_pending_redirect() {
    let api = MockEventApi::with_events(catalog());
    let store = store(&api, fan());

    navigate(&store, Route::EventDetail("3".into())).await;
    book(&store).await;

    // Leave before the redirect delay elapses
    navigate(&store, Route::Home).await;
    tokio::time::sleep(Duration::from_millis(120)).await;

    assert_eq!(store.state(|s| s.route.clone()).await, Route::Home);
    assert_eq!(api.bookings().len(), 1);
}

#[tokio::test]
async fn test_switching_event_ignores_stale_response() {
    let api = MockEventApi::with_events(catalog()).with_latency(Duration::from_millis(50));
    let store = store(&api, fan());

    store
        .send(AppAction::Navigate(Route::EventDetail("1".into())))
        .await
        .unwrap();
    navigate(&store, Route::EventDetail("4".into())).await;

    let loaded = store
        .state(|s| s.detail.event.loaded().map(|e| e.id.clone()))
        .await;
    assert_eq!(loaded, Some(EventId::new("4")));
    assert_eq!(store.running_effects(&EffectId::new(detail::FETCH)), 0);
}
