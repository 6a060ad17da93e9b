use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use shared::types::{
    CredentialClaims, LoginData, LoginGrant, RegistrationData, ResetPasswordData, User,
};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::policy::AdmissionPolicy;
use super::state::Session;
use crate::error::{ApiError, SessionError};
use crate::guard::{self, GuardDecision};
use crate::navigation::{Navigator, Route};
use crate::token_store::TokenStore;

const LOGIN_FALLBACK: &str = "Could not sign in";
const REGISTER_FALLBACK: &str = "Could not register";
const FORGOT_FALLBACK: &str = "Could not send the recovery email";
const RESET_FALLBACK: &str = "Could not reset the password";

/// The authentication endpoints the session manager depends on.
///
/// Implemented by [`AuthApi`](crate::api::AuthApi) over HTTP; tests supply
/// their own.
pub trait AuthBackend: Send + Sync {
    /// Exchange credentials for a normalised `{token, user}` grant.
    fn login(
        &self,
        credentials: &LoginData,
    ) -> impl Future<Output = Result<LoginGrant, ApiError>> + Send;

    fn register(
        &self,
        data: &RegistrationData,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;

    /// Resolve `token` to its user.
    fn current_user(&self, token: &str) -> impl Future<Output = Result<User, ApiError>> + Send;

    fn forgot_password(&self, email: &str) -> impl Future<Output = Result<Value, ApiError>> + Send;

    /// Called only with data that already passed
    /// [`ResetPasswordData::validate`].
    fn reset_password(
        &self,
        data: &ResetPasswordData,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;
}

/// Owner of the session state and the stored credential.
///
/// Overlapping calls are sequenced by a request generation: `login` and
/// `logout` start a new generation, and any response belonging to an older
/// one is dropped without touching the state or the credential. Commits take
/// the generation lock, so a commit and a newer `login`/`logout` never
/// interleave.
pub struct SessionManager<B> {
    backend: B,
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    policy: AdmissionPolicy,
    state: watch::Sender<Session>,
    generation: Mutex<u64>,
    initialized: AtomicBool,
}

impl<B: AuthBackend> SessionManager<B> {
    pub fn new(
        backend: B,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
        policy: AdmissionPolicy,
    ) -> Self {
        let (state, _) = watch::channel(Session::starting());
        Self {
            backend,
            store,
            navigator,
            policy,
            state,
            generation: Mutex::new(0),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // -------------------------------------------------------------------------
    // Observation
    // -------------------------------------------------------------------------

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver notified on every session change. Guards should re-evaluate
    /// on each notification.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().current_user.clone()
    }

    /// Run the route's guards against the current session.
    pub fn authorize(&self, route: Route) -> GuardDecision {
        guard::evaluate_route(route, &self.state.borrow())
    }

    // -------------------------------------------------------------------------
    // Start-up
    // -------------------------------------------------------------------------

    /// Restore the session from the stored credential.
    ///
    /// Runs once; later calls return the current snapshot untouched. Always
    /// clears `loading`, whatever the outcome. A credential that is missing,
    /// undecodable, expired, rejected by the backend or held by a role that
    /// is not admitted leaves the session logged out and is purged, without
    /// a user-facing error.
    pub async fn initialize(&self) -> Session {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!("Session already initialized");
            return self.snapshot();
        }

        let generation = *self.lock_generation();
        let restored = self.restore(generation).await;

        {
            let current = self.lock_generation();
            let fresh = *current == generation;
            self.state.send_modify(|s| {
                if fresh {
                    s.current_user = restored;
                } else {
                    debug!("Discarding start-up check overtaken by a newer request");
                }
                s.loading = false;
            });
        }

        self.snapshot()
    }

    async fn restore(&self, generation: u64) -> Option<User> {
        let token = match self.store.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                info!("No stored credential");
                return None;
            }
            Err(e) => {
                error!("Failed to read stored credential: {}", e);
                self.purge_if_current(generation);
                return None;
            }
        };

        let claims = match CredentialClaims::decode_unverified(&token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!("Stored credential is malformed: {}", e);
                self.purge_if_current(generation);
                return None;
            }
        };

        let now = unix_now();
        if claims.is_expired_at(now) {
            info!("Stored credential expired at {}", claims.exp);
            self.purge_if_current(generation);
            return None;
        }

        match self.backend.current_user(&token).await {
            Ok(user) if self.policy.admits(user.rol) => {
                info!(
                    "Session restored: {} (credential valid for {}s)",
                    user,
                    claims.remaining_secs(now)
                );
                Some(user)
            }
            Ok(user) => {
                warn!("Stored credential belongs to a role without console access: {}", user.rol);
                self.purge_if_current(generation);
                None
            }
            Err(e) => {
                warn!("Could not resolve stored credential: {}", e);
                self.purge_if_current(generation);
                None
            }
        }
    }

    // -------------------------------------------------------------------------
    // Login / logout
    // -------------------------------------------------------------------------

    /// Sign in and land on the role's home screen.
    ///
    /// A role outside the admission policy purges the credential, leaves the
    /// session logged out, records a user-facing error and fails without
    /// navigating. A response overtaken by a newer `login` or `logout` fails
    /// with [`SessionError::Superseded`] and changes nothing.
    pub async fn login(&self, credentials: &LoginData) -> Result<User, SessionError> {
        let generation = self.begin();
        self.set_error(None);
        info!("Signing in {}", credentials.email);

        let grant = match self.backend.login(credentials).await {
            Ok(grant) => grant,
            Err(e) => {
                warn!("Login failed for {}: {}", credentials.email, e);
                let err = SessionError::from_api(e, LOGIN_FALLBACK);
                return Err(self.fail(generation, err));
            }
        };

        let user = grant.user.clone();
        let committed = self.commit(generation, || match self.policy.landing(user.rol) {
            None => {
                warn!("Role {} has no console access; discarding credential", user.rol);
                self.discard_credential();
                let err = SessionError::RoleNotPermitted(user.rol);
                let message = err.to_string();
                self.state.send_modify(|s| {
                    s.current_user = None;
                    s.error = Some(message);
                });
                Err(err)
            }
            Some(home) => {
                if let Err(e) = self.store.save(&grant.token) {
                    error!("Failed to store credential: {}", e);
                    self.discard_credential();
                    let err = SessionError::Storage(e);
                    let message = err.to_string();
                    self.state.send_modify(|s| {
                        s.current_user = None;
                        s.error = Some(message);
                    });
                    return Err(err);
                }
                self.state.send_modify(|s| {
                    s.current_user = Some(grant.user.clone());
                    s.error = None;
                });
                Ok(home)
            }
        });

        match committed {
            None => {
                debug!("Discarding stale login response for {}", credentials.email);
                Err(SessionError::Superseded)
            }
            Some(Err(e)) => Err(e),
            Some(Ok(home)) => {
                info!("Signed in: {}", user);
                self.navigator.navigate(home);
                Ok(user)
            }
        }
    }

    /// Drop the session and go to the login screen. Safe to call repeatedly.
    pub fn logout(&self) {
        {
            let mut generation = self.lock_generation();
            *generation += 1;
            self.discard_credential();
            self.state
                .send_if_modified(|s| s.current_user.take().is_some());
        }
        info!("Logged out");
        self.navigator.navigate(Route::Login);
    }

    // -------------------------------------------------------------------------
    // Account operations (no session change)
    // -------------------------------------------------------------------------

    /// Create an account. Does not sign anyone in.
    pub async fn register(&self, data: &RegistrationData) -> Result<Value, SessionError> {
        self.set_error(None);

        if let Err(e) = data.validate() {
            debug!("Registration form rejected: {}", e.to_code());
            let err = SessionError::InvalidRegistration(e);
            self.set_error(Some(err.to_string()));
            return Err(err);
        }

        let result = self.backend.register(data).await;
        if result.is_ok() {
            info!("Registered {} as {}", data.email, data.rol);
        }
        self.surface(result, REGISTER_FALLBACK)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<Value, SessionError> {
        self.set_error(None);
        let result = self.backend.forgot_password(email).await;
        self.surface(result, FORGOT_FALLBACK)
    }

    /// Set a new password from a recovery link. A missing token, a short
    /// password or a mismatched confirmation is rejected before any request.
    pub async fn reset_password(&self, data: &ResetPasswordData) -> Result<Value, SessionError> {
        self.set_error(None);

        if let Err(e) = data.validate() {
            debug!("Reset form rejected: {}", e.to_code());
            let err = SessionError::InvalidReset(e);
            self.set_error(Some(err.to_string()));
            return Err(err);
        }

        let result = self.backend.reset_password(data).await;
        self.surface(result, RESET_FALLBACK)
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn lock_generation(&self) -> MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self) -> u64 {
        let mut generation = self.lock_generation();
        *generation += 1;
        *generation
    }

    /// Run `f` under the generation lock if `generation` is still current.
    fn commit<R>(&self, generation: u64, f: impl FnOnce() -> R) -> Option<R> {
        let current = self.lock_generation();
        if *current != generation {
            return None;
        }
        let result = f();
        drop(current);
        Some(result)
    }

    fn fail(&self, generation: u64, err: SessionError) -> SessionError {
        let message = err.to_string();
        self.commit(generation, || self.set_error(Some(message)));
        err
    }

    fn surface(
        &self,
        result: Result<Value, ApiError>,
        fallback: &str,
    ) -> Result<Value, SessionError> {
        result.map_err(|e| {
            warn!("{}: {}", fallback, e);
            let err = SessionError::from_api(e, fallback);
            self.set_error(Some(err.to_string()));
            err
        })
    }

    fn set_error(&self, error: Option<String>) {
        self.state.send_if_modified(|s| {
            if s.error == error {
                return false;
            }
            s.error = error;
            true
        });
    }

    fn purge_if_current(&self, generation: u64) {
        if self.commit(generation, || self.discard_credential()).is_none() {
            debug!("Keeping credential written by a newer request");
        }
    }

    fn discard_credential(&self) {
        if let Err(e) = self.store.clear() {
            error!("Failed to remove stored credential: {}", e);
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
