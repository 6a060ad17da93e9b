//! Who is logged in.
//!
//! [`SessionManager`] is the single owner of the session state and the only
//! writer of the stored credential. Everything else observes it through
//! [`SessionManager::snapshot`] or [`SessionManager::subscribe`].

mod manager;
mod policy;
mod state;

pub use manager::{AuthBackend, SessionManager};
pub use policy::AdmissionPolicy;
pub use state::Session;
