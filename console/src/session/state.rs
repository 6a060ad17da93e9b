use shared::types::{Role, User};

/// Client-side view of the current identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// `Some` only while a valid credential is stored and the backend
    /// resolved it to an admitted user.
    pub current_user: Option<User>,
    /// True until the start-up credential check completes.
    pub loading: bool,
    /// Last user-facing error, cleared by the next operation or `clear_error`.
    pub error: Option<String>,
}

impl Session {
    /// State before the start-up check has run.
    pub fn starting() -> Self {
        Self {
            current_user: None,
            loading: true,
            error: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.current_user.as_ref().map(|u| u.rol)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::starting()
    }
}
