//! Role-based gate in front of console screens.
//!
//! A guard is a pure function of `(allowed roles, session)`. It never
//! navigates by itself; callers act on the returned [`GuardDecision`] and
//! re-evaluate whenever the session changes (see
//! [`SessionManager::subscribe`](crate::session::SessionManager::subscribe)).

use shared::types::{Role, RoleSet};

use crate::navigation::Route;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// The initial session check is still running. Show a neutral indicator.
    Loading,
    Render,
    Redirect(Route),
}

/// Gate for a subtree of screens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteGuard {
    allowed: Option<RoleSet>,
}

impl RouteGuard {
    /// Admit any authenticated user.
    pub fn authenticated() -> Self {
        Self { allowed: None }
    }

    /// Admit authenticated users whose role is in `roles`.
    pub fn allow(roles: RoleSet) -> Self {
        Self {
            allowed: Some(roles),
        }
    }

    pub fn allowed(&self) -> Option<&RoleSet> {
        self.allowed.as_ref()
    }

    pub fn evaluate(&self, session: &Session) -> GuardDecision {
        if session.loading {
            return GuardDecision::Loading;
        }

        let Some(user) = session.current_user.as_ref() else {
            return GuardDecision::Redirect(Route::Login);
        };

        match &self.allowed {
            Some(roles) if !roles.contains(user.rol) => {
                GuardDecision::Redirect(fallback_route(user.rol))
            }
            _ => GuardDecision::Render,
        }
    }
}

/// Where a user rejected by a role gate is sent.
///
/// Precedence: no web presence → login; employee → employee home; any admin
/// variant → admin home; anything else → login.
pub fn fallback_route(role: Role) -> Route {
    if !role.has_web_presence() {
        return Route::Login;
    }
    match role {
        Role::Employee => Route::EmployeeDashboard,
        r if r.is_admin() => Route::AdminDashboard,
        _ => Route::Login,
    }
}

/// Evaluate nested guards, outermost first.
///
/// An inner guard is only consulted once every outer guard renders, so a
/// stricter inner gate redirects on its own terms without re-running the
/// outer gate's redirect.
pub fn evaluate_chain(guards: &[RouteGuard], session: &Session) -> GuardDecision {
    for guard in guards {
        match guard.evaluate(session) {
            GuardDecision::Render => continue,
            other => return other,
        }
    }
    GuardDecision::Render
}

/// Decide what happens when `route` is requested in the current session.
pub fn evaluate_route(route: Route, session: &Session) -> GuardDecision {
    if route.is_public() {
        return GuardDecision::Render;
    }
    evaluate_chain(&route.guards(), session)
}
