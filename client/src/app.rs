//! App shell: routes between views and owns their lifetimes.
//!
//! Only the view matching the current route receives actions. Leaving a
//! view cancels everything it started, so a late response or a pending
//! redirect never lands in a view the user has already left.

use crate::features::catalog::{self, CatalogAction, CatalogReducer, CatalogState};
use crate::features::detail::{self, DetailAction, DetailReducer, DetailState};
use crate::features::home::{self, HomeAction, HomeReducer, HomeState};
use crate::features::navbar::{NavbarAction, NavbarReducer, NavbarState};
use crate::features::ViewEnvironment;
use crate::routes::Route;
use eventpulse_core::effect::{Effect, EffectId};
use eventpulse_core::{reducer::Reducer, SmallVec};

/// Environment for the app shell
pub type AppEnvironment = ViewEnvironment;

/// Whole-client state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Current route
    pub route: Route,
    /// Routes navigated away from, oldest first
    pub history: Vec<Route>,
    /// Home view
    pub home: HomeState,
    /// Catalog view
    pub catalog: CatalogState,
    /// Detail view
    pub detail: DetailState,
    /// Navigation bar
    pub navbar: NavbarState,
}

/// Whole-client actions
#[derive(Debug, Clone)]
pub enum AppAction {
    /// Go to a route
    Navigate(Route),
    /// Home view action
    Home(HomeAction),
    /// Catalog view action
    Catalog(CatalogAction),
    /// Detail view action
    Detail(DetailAction),
    /// Navigation bar action
    Navbar(NavbarAction),
}

type Effects = SmallVec<[Effect<AppAction>; 4]>;

/// Cancellation id of the view rendering `route`, if the client owns one
#[must_use]
pub const fn lifetime(route: &Route) -> Option<&'static str> {
    match route {
        Route::Home => Some(home::LIFETIME),
        Route::Events => Some(catalog::LIFETIME),
        Route::EventDetail(_) => Some(detail::LIFETIME),
        Route::Login | Route::Register | Route::Dashboard | Route::Admin => None,
    }
}

/// App shell reducer
#[derive(Debug, Clone, Copy, Default)]
pub struct AppReducer;

impl AppReducer {
    /// Create a new app reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn navigate(state: &mut AppState, route: Route, env: &AppEnvironment) -> Effects {
        let mut effects = Effects::new();

        if let Some(id) = lifetime(&state.route) {
            tracing::debug!(from = %state.route, to = %route, "Leaving view");
            effects.push(Effect::Cancel(EffectId::new(id)));
        }

        tracing::info!(route = %route, "Navigating");
        let previous = std::mem::replace(&mut state.route, route.clone());
        state.history.push(previous);

        let _ = NavbarReducer.reduce(&mut state.navbar, NavbarAction::Refresh, env);

        match route {
            Route::Home => {
                effects.extend(Self::home(state, HomeAction::Activate, env));
            },
            Route::Events => {
                effects.extend(Self::catalog(state, CatalogAction::Activate, env));
            },
            Route::EventDetail(id) => {
                effects.extend(Self::detail(state, DetailAction::Activate(id), env));
            },
            Route::Login | Route::Register | Route::Dashboard | Route::Admin => {},
        }

        effects
    }

    fn home(state: &mut AppState, action: HomeAction, env: &AppEnvironment) -> Effects {
        let mut effects: Effects = HomeReducer
            .reduce(&mut state.home, action, env)
            .into_iter()
            .map(|effect| effect.map(AppAction::Home))
            .collect();
        if let Some(route) = state.home.redirect.take() {
            effects.extend(Self::navigate(state, route, env));
        }
        effects
    }

    fn catalog(state: &mut AppState, action: CatalogAction, env: &AppEnvironment) -> Effects {
        let mut effects: Effects = CatalogReducer
            .reduce(&mut state.catalog, action, env)
            .into_iter()
            .map(|effect| effect.map(AppAction::Catalog))
            .collect();
        if let Some(route) = state.catalog.redirect.take() {
            effects.extend(Self::navigate(state, route, env));
        }
        effects
    }

    fn detail(state: &mut AppState, action: DetailAction, env: &AppEnvironment) -> Effects {
        let mut effects: Effects = DetailReducer
            .reduce(&mut state.detail, action, env)
            .into_iter()
            .map(|effect| effect.map(AppAction::Detail))
            .collect();
        if let Some(route) = state.detail.redirect.take() {
            effects.extend(Self::navigate(state, route, env));
        }
        effects
    }

    fn navbar(state: &mut AppState, action: NavbarAction, env: &AppEnvironment) -> Effects {
        let mut effects: Effects = NavbarReducer
            .reduce(&mut state.navbar, action, env)
            .into_iter()
            .map(|effect| effect.map(AppAction::Navbar))
            .collect();
        if let Some(route) = state.navbar.redirect.take() {
            effects.extend(Self::navigate(state, route, env));
        }
        effects
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AppAction::Navigate(route) => Self::navigate(state, route, env),
            AppAction::Home(action) if state.route == Route::Home => Self::home(state, action, env),
            AppAction::Catalog(action) if state.route == Route::Events => {
                Self::catalog(state, action, env)
            },
            AppAction::Detail(action) if matches!(state.route, Route::EventDetail(_)) => {
                Self::detail(state, action, env)
            },
            AppAction::Navbar(action) => Self::navbar(state, action, env),
            inactive => {
                tracing::debug!(route = %state.route, action = ?inactive, "Dropping action for inactive view");
                SmallVec::new()
            },
        }
    }
}
