//! Plain-text rendering of view states for the terminal.

use crate::app::AppState;
use crate::features::catalog::CatalogState;
use crate::features::detail::{DetailState, DetailStatus};
use crate::features::home::HomeState;
use crate::features::navbar::{NavItem, NavTarget};
use crate::loadable::Loadable;
use crate::routes::Route;
use crate::types::Event;
use std::fmt::Write;

fn card(out: &mut String, event: &Event) {
    let _ = writeln!(out, "[{}] {}", event.id, event.title);
    if !event.description.is_empty() {
        let _ = writeln!(out, "    {}", event.description);
    }
    let _ = writeln!(out, "    Date: {}", event.date.format("%Y-%m-%d"));
    let _ = writeln!(out, "    Location: {}", event.location);
    let _ = writeln!(out, "    Price: ${}", event.price);
}

/// Render the catalog view
#[must_use]
pub fn catalog(state: &CatalogState) -> String {
    let mut out = String::from("Available Events\n");
    if !state.search.is_empty() {
        let _ = writeln!(out, "Search: {}", state.search);
    }
    if state.events.is_pending() {
        out.push_str("Loading...\n");
        return out;
    }
    if let Some(error) = &state.error {
        let _ = writeln!(out, "Error: {error}");
    }
    for event in state.visible_events() {
        card(&mut out, event);
        let _ = writeln!(out, "    Available Tickets: {}", event.total_tickets);
    }
    out
}

/// Render the detail view
#[must_use]
pub fn detail(state: &DetailState) -> String {
    let mut out = String::new();
    match (state.status(), &state.event) {
        (DetailStatus::Loading, _) => out.push_str("Loading...\n"),
        (DetailStatus::Ready, Loadable::Loaded(event)) => {
            card(&mut out, event);
            let _ = writeln!(out, "    Available Tickets: {}", event.total_tickets);
            let _ = writeln!(out, "Quantity: {}", state.quantity);
        },
        _ => out.push_str("Event not found\n"),
    }
    if let Some(error) = &state.error {
        let _ = writeln!(out, "Error: {error}");
    }
    if let Some(success) = &state.success {
        let _ = writeln!(out, "{success}");
    }
    out
}

/// Render the home view
#[must_use]
pub fn home(state: &HomeState) -> String {
    let mut out = String::from(
        "Welcome to Ticket Booking\nBook tickets for the best events in town\n\nFeatured Events\n",
    );
    if state.featured.is_pending() {
        out.push_str("Loading...\n");
    }
    for event in state.featured_events() {
        card(&mut out, event);
    }
    out
}

/// Render the navigation bar and the view for the current route
///
/// Routes the client has no view for are shown as a hand-off line.
#[must_use]
pub fn current_view(state: &AppState) -> String {
    let body = match &state.route {
        Route::Home => home(&state.home),
        Route::Events => catalog(&state.catalog),
        Route::EventDetail(_) => detail(&state.detail),
        external => format!("Continue at {external}\n"),
    };
    format!("{}\n\n{body}", navbar(&state.navbar.items))
}

/// Render navigation items on one line
#[must_use]
pub fn navbar(items: &[NavItem]) -> String {
    items
        .iter()
        .map(|item| match &item.target {
            NavTarget::Route(route) => format!("{} ({route})", item.label),
            NavTarget::Logout => item.label.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
