//! Session gate.
//!
//! Answers "is there an authenticated user" for the cart and checkout
//! pages. Session state is an asynchronous observation published by the
//! session service; while it is still resolving, gated pages render a
//! neutral loading state and take no action. Once resolved without a user,
//! the gate yields a redirect to the login page carrying the original path
//! so the user returns after authenticating. The decision re-runs on every
//! session change, so a logout on a gated page triggers the same redirect.

use tokio::sync::watch;

use crate::models::CurrentUser;

/// Session state as reported by the session service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// The authenticated user, if any.
    pub user: Option<CurrentUser>,
    /// True until the first resolution completes.
    pub is_loading: bool,
}

impl SessionState {
    /// State before the session service has answered.
    #[must_use]
    pub const fn resolving() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }

    /// Resolved state.
    #[must_use]
    pub const fn resolved(user: Option<CurrentUser>) -> Self {
        Self {
            user,
            is_loading: false,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::resolving()
    }
}

/// Outcome of evaluating the gate for a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Session still resolving; render a loading skeleton, do nothing.
    Pending,
    /// Authenticated; proceed.
    Allow(CurrentUser),
    /// Not authenticated; redirect to the contained login target.
    RedirectToLogin(String),
}

/// Observer side of the session channel.
///
/// Cheap to clone; every gated page holds one and re-evaluates
/// [`SessionGate::decide`] whenever [`SessionGate::changed`] fires.
#[derive(Debug, Clone)]
pub struct SessionGate {
    state: watch::Receiver<SessionState>,
}

impl SessionGate {
    /// Create a session channel: the sender belongs to whoever polls the
    /// session service, the gate to the pages that depend on it.
    #[must_use]
    pub fn channel() -> (watch::Sender<SessionState>, Self) {
        let (tx, rx) = watch::channel(SessionState::resolving());
        (tx, Self { state: rx })
    }

    /// The current user, if the session has resolved with one.
    #[must_use]
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.state.borrow().user.clone()
    }

    /// True while the session service has not yet answered.
    #[must_use]
    pub fn is_resolving(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Evaluate the gate for a page at `path`.
    #[must_use]
    pub fn decide(&self, path: &str) -> GateDecision {
        let state = self.state.borrow();
        if state.is_loading {
            return GateDecision::Pending;
        }
        match &state.user {
            Some(user) => GateDecision::Allow(user.clone()),
            None => GateDecision::RedirectToLogin(login_redirect_target(path)),
        }
    }

    /// Wait for the next session change.
    ///
    /// # Errors
    ///
    /// Returns an error if the session publisher has been dropped.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.state.changed().await
    }
}

/// Login target carrying the original path as a `redirect` parameter.
#[must_use]
pub fn login_redirect_target(path: &str) -> String {
    format!("/login?redirect={}", urlencoding::encode(path))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use digivault_core::{Email, UserId};

    fn user() -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            email: Email::parse("buyer@example.com").unwrap(),
        }
    }

    #[test]
    fn test_pending_while_resolving() {
        let (_tx, gate) = SessionGate::channel();
        assert!(gate.is_resolving());
        assert_eq!(gate.decide("/checkout"), GateDecision::Pending);
    }

    #[test]
    fn test_allow_with_user() {
        let (tx, gate) = SessionGate::channel();
        tx.send(SessionState::resolved(Some(user()))).unwrap();
        assert_eq!(gate.decide("/checkout"), GateDecision::Allow(user()));
        assert_eq!(gate.current_user(), Some(user()));
    }

    #[test]
    fn test_redirect_without_user() {
        let (tx, gate) = SessionGate::channel();
        tx.send(SessionState::resolved(None)).unwrap();
        assert_eq!(
            gate.decide("/checkout"),
            GateDecision::RedirectToLogin("/login?redirect=%2Fcheckout".to_string())
        );
    }

    #[test]
    fn test_logout_flips_decision() {
        let (tx, gate) = SessionGate::channel();
        tx.send(SessionState::resolved(Some(user()))).unwrap();
        assert!(matches!(gate.decide("/cart"), GateDecision::Allow(_)));

        tx.send(SessionState::resolved(None)).unwrap();
        assert!(matches!(
            gate.decide("/cart"),
            GateDecision::RedirectToLogin(_)
        ));
    }

    #[test]
    fn test_redirect_encodes_query() {
        let target = login_redirect_target("/checkout?products=1,2");
        assert_eq!(target, "/login?redirect=%2Fcheckout%3Fproducts%3D1%2C2");
    }

    #[tokio::test]
    async fn test_changed_fires_on_update() {
        let (tx, mut gate) = SessionGate::channel();
        tx.send(SessionState::resolved(None)).unwrap();
        gate.changed().await.unwrap();
        assert!(!gate.is_resolving());
    }
}
