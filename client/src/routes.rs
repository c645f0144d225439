//! Client routes and their paths.

use crate::error::RouteParseError;
use crate::types::EventId;
use std::fmt;
use std::str::FromStr;

/// A place the client can navigate to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    /// `/`
    #[default]
    Home,
    /// `/events`
    Events,
    /// `/events/{id}`
    EventDetail(EventId),
    /// `/login`
    Login,
    /// `/register`
    Register,
    /// `/dashboard`
    Dashboard,
    /// `/admin`
    Admin,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("/"),
            Self::Events => f.write_str("/events"),
            Self::EventDetail(id) => write!(f, "/events/{id}"),
            Self::Login => f.write_str("/login"),
            Self::Register => f.write_str("/register"),
            Self::Dashboard => f.write_str("/dashboard"),
            Self::Admin => f.write_str("/admin"),
        }
    }
}

impl FromStr for Route {
    type Err = RouteParseError;

    /// Parse a path, ignoring any query string, fragment and trailing slash
    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let bare = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');

        let route = match bare {
            "" => Self::Home,
            "/events" => Self::Events,
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/dashboard" => Self::Dashboard,
            "/admin" => Self::Admin,
            other => match other.strip_prefix("/events/") {
                Some(id) if !id.is_empty() && !id.contains('/') => {
                    Self::EventDetail(EventId::new(id))
                },
                _ => return Err(RouteParseError(path.to_string())),
            },
        };

        Ok(route)
    }
}
