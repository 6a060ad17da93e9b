//! Console screens, their paths, and where navigation requests go.

use std::fmt;
use std::sync::Mutex;

use shared::types::{Role, RoleSet};
use tracing::debug;

use crate::guard::RouteGuard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
    AdminDashboard,
    AdminParkings,
    AdminParkingNew,
    AdminParkingDetail(i64),
    AdminParkingEdit(i64),
    AdminUsers,
    AdminReports,
    AdminTariffs,
    EmployeeDashboard,
    EmployeeSpaces,
    EmployeeReservations,
    EmployeePayments,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".into(),
            Self::Register => "/register".into(),
            Self::ForgotPassword => "/forgot-password".into(),
            Self::ResetPassword => "/reset-password".into(),
            Self::AdminDashboard => "/admin/dashboard".into(),
            Self::AdminParkings => "/admin/parkings".into(),
            Self::AdminParkingNew => "/admin/parkings/new".into(),
            Self::AdminParkingDetail(id) => format!("/admin/parkings/{}", id),
            Self::AdminParkingEdit(id) => format!("/admin/parkings/edit/{}", id),
            Self::AdminUsers => "/admin/usuarios".into(),
            Self::AdminReports => "/admin/reportes".into(),
            Self::AdminTariffs => "/admin/tarifas".into(),
            Self::EmployeeDashboard => "/employee/dashboard".into(),
            Self::EmployeeSpaces => "/employee/espacios".into(),
            Self::EmployeeReservations => "/employee/reservas".into(),
            Self::EmployeePayments => "/employee/pagos".into(),
        }
    }

    /// Resolve a path. `/`, unknown paths and malformed ids land on the login
    /// screen. Query strings and fragments are ignored.
    pub fn resolve(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["forgot-password"] => Self::ForgotPassword,
            ["reset-password"] => Self::ResetPassword,
            ["admin", "dashboard"] => Self::AdminDashboard,
            ["admin", "parkings"] => Self::AdminParkings,
            ["admin", "parkings", "new"] => Self::AdminParkingNew,
            ["admin", "parkings", "edit", id] => id
                .parse()
                .map(Self::AdminParkingEdit)
                .unwrap_or(Self::Login),
            ["admin", "parkings", id] => id
                .parse()
                .map(Self::AdminParkingDetail)
                .unwrap_or(Self::Login),
            ["admin", "usuarios"] => Self::AdminUsers,
            ["admin", "reportes"] => Self::AdminReports,
            ["admin", "tarifas"] => Self::AdminTariffs,
            ["employee", "dashboard"] => Self::EmployeeDashboard,
            ["employee", "espacios"] => Self::EmployeeSpaces,
            ["employee", "reservas"] => Self::EmployeeReservations,
            ["employee", "pagos"] => Self::EmployeePayments,
            _ => Self::Login,
        }
    }

    /// Landing screen per role. Roles without a web presence have none.
    pub fn home_for(role: Role) -> Option<Self> {
        match role {
            Role::AdminGeneral | Role::AdminParking | Role::Admin => Some(Self::AdminDashboard),
            Role::Employee => Some(Self::EmployeeDashboard),
            Role::Customer | Role::Unknown => None,
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Self::Login | Self::Register | Self::ForgotPassword | Self::ResetPassword
        )
    }

    /// Guards wrapping this screen, outermost first.
    pub fn guards(&self) -> Vec<RouteGuard> {
        // `Admin` is the legacy spelling of a general administrator.
        let admins = || {
            RouteGuard::allow(RoleSet::from([
                Role::AdminGeneral,
                Role::AdminParking,
                Role::Admin,
            ]))
        };
        let employees = || RouteGuard::allow(RoleSet::from([Role::Employee]));

        match self {
            Self::Login | Self::Register | Self::ForgotPassword | Self::ResetPassword => vec![],
            // User management is restricted further than the rest of the admin area.
            Self::AdminUsers => vec![
                admins(),
                RouteGuard::allow(RoleSet::from([Role::AdminGeneral, Role::Admin])),
            ],
            Self::AdminDashboard
            | Self::AdminParkings
            | Self::AdminParkingNew
            | Self::AdminParkingDetail(_)
            | Self::AdminParkingEdit(_)
            | Self::AdminReports
            | Self::AdminTariffs => vec![admins()],
            Self::EmployeeDashboard
            | Self::EmployeeSpaces
            | Self::EmployeeReservations
            | Self::EmployeePayments => vec![employees()],
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

/// Receiver of navigation requests issued by the session manager.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// In-memory navigation history. The last entry is the current location.
#[derive(Debug, Default)]
pub struct History {
    entries: Mutex<Vec<Route>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(route: Route) -> Self {
        Self {
            entries: Mutex::new(vec![route]),
        }
    }

    pub fn current(&self) -> Option<Route> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .copied()
    }

    pub fn entries(&self) -> Vec<Route> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Navigator for History {
    fn navigate(&self, route: Route) {
        debug!("Navigating to {}", route);
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(route);
    }
}
