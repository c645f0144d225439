//! Navigation bar: links that follow the session state, plus logout.

use super::ViewEnvironment;
use crate::routes::Route;
use crate::session::SessionProvider;
use crate::types::User;
use eventpulse_core::{async_effect, effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::sync::Arc;

/// Brand label, linking home
pub const BRAND: &str = "Ticket Booking";

/// What a navigation item does when chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavTarget {
    /// Go to a route
    Route(Route),
    /// End the session
    Logout,
}

/// One entry of the navigation bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    /// Button text
    pub label: &'static str,
    /// Action on selection
    pub target: NavTarget,
}

impl NavItem {
    const fn link(label: &'static str, route: Route) -> Self {
        Self {
            label,
            target: NavTarget::Route(route),
        }
    }
}

/// Navigation items for a user, brand first
#[must_use]
pub fn items_for(user: Option<&User>) -> Vec<NavItem> {
    let mut items = vec![
        NavItem::link(BRAND, Route::Home),
        NavItem::link("Events", Route::Events),
    ];

    match user {
        Some(user) => {
            items.push(NavItem::link("Dashboard", Route::Dashboard));
            if user.is_admin {
                items.push(NavItem::link("Admin", Route::Admin));
            }
            items.push(NavItem {
                label: "Logout",
                target: NavTarget::Logout,
            });
        },
        None => {
            items.push(NavItem::link("Login", Route::Login));
            items.push(NavItem::link("Register", Route::Register));
        },
    }

    items
}

/// Navigation items for the current session
#[must_use]
pub fn items(session: &dyn SessionProvider) -> Vec<NavItem> {
    items_for(session.current_user().as_ref())
}

/// Navigation bar state
#[derive(Debug, Clone, Default)]
pub struct NavbarState {
    /// Items as of the last refresh
    pub items: Vec<NavItem>,
    /// Navigation requested by the bar, drained by the app shell
    pub redirect: Option<Route>,
}

/// Navigation bar actions
#[derive(Debug, Clone)]
pub enum NavbarAction {
    /// Re-read the session and rebuild the items
    Refresh,
    /// A link was chosen
    Navigate(Route),
    /// "Logout" chosen
    Logout,
    /// The session provider finished logging out
    LoggedOut,
}

/// Navigation bar reducer
#[derive(Debug, Clone, Copy, Default)]
pub struct NavbarReducer;

impl Reducer for NavbarReducer {
    type State = NavbarState;
    type Action = NavbarAction;
    type Environment = ViewEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            NavbarAction::Refresh => {
                state.items = items(env.session.as_ref());
                SmallVec::new()
            },
            NavbarAction::Navigate(route) => {
                state.redirect = Some(route);
                SmallVec::new()
            },
            NavbarAction::Logout => {
                let session = Arc::clone(&env.session);
                smallvec![async_effect! {
                    session.logout();
                    Some(NavbarAction::LoggedOut)
                }]
            },
            NavbarAction::LoggedOut => {
                state.items = items(env.session.as_ref());
                state.redirect = Some(Route::Login);
                SmallVec::new()
            },
        }
    }
}
