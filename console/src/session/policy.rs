use shared::types::{Role, RoleSet};

use crate::navigation::Route;

/// Which roles may hold a session in this application.
///
/// A role outside the set is an authentication failure here even when the
/// credential itself is valid: customers, for instance, belong to the mobile
/// app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionPolicy {
    admitted: RoleSet,
}

impl AdmissionPolicy {
    pub fn new(admitted: RoleSet) -> Self {
        Self { admitted }
    }

    /// The home screen a user with `role` lands on, or `None` when the role
    /// is not admitted. A role without a home screen is never admitted.
    pub fn landing(&self, role: Role) -> Option<Route> {
        if !self.admitted.contains(role) {
            return None;
        }
        Route::home_for(role)
    }

    pub fn admits(&self, role: Role) -> bool {
        self.landing(role).is_some()
    }

    pub fn admitted(&self) -> &RoleSet {
        &self.admitted
    }
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self::new(RoleSet::console_default())
    }
}
