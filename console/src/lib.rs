//! Session and access control for the parking management console.
//!
//! [`session::SessionManager`] owns the login state and the stored
//! credential, [`guard`] decides per screen whether to render, wait or
//! redirect, and [`api`] talks to the backend.

pub mod api;
pub mod error;
pub mod guard;
pub mod navigation;
pub mod session;
pub mod token_store;

pub use error::{ApiError, SessionError, TokenStoreError};
pub use guard::{GuardDecision, RouteGuard};
pub use navigation::{History, Navigator, Route};
pub use session::{AdmissionPolicy, AuthBackend, Session, SessionManager};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
