//! Session access for the views.
//!
//! The session itself is owned by an external authentication provider. Views
//! read it through [`SessionProvider`]; only the navigation bar asks it to
//! log out.

use crate::types::User;
use std::sync::{Arc, PoisonError, RwLock};

/// Source of the current user identity
pub trait SessionProvider: Send + Sync {
    /// The signed-in user, or `None` when anonymous
    fn current_user(&self) -> Option<User>;

    /// End the session
    fn logout(&self);
}

/// Session handle injected into every view environment
pub type SessionContext = Arc<dyn SessionProvider>;

/// Process-local session, used by the CLI and in tests
#[derive(Debug, Default)]
pub struct InMemorySessionProvider {
    user: RwLock<Option<User>>,
}

impl InMemorySessionProvider {
    /// An anonymous session
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session already signed in as `user`
    #[must_use]
    pub fn signed_in(user: User) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }

    /// Wrap in a [`SessionContext`]
    #[must_use]
    pub fn into_context(self) -> SessionContext {
        Arc::new(self)
    }
}

impl SessionProvider for InMemorySessionProvider {
    fn current_user(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn logout(&self) {
        if let Some(user) = self
            .user
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            tracing::info!(email = %user.email, "Signed out");
        }
    }
}
