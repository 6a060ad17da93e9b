use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tokio::sync::Notify;

use console::{
    AdmissionPolicy, ApiError, AuthBackend, History, MemoryTokenStore, Navigator, Route,
    SessionError, SessionManager, TokenStore, TokenStoreError,
};
use shared::types::{
    LoginData, LoginGrant, RegistrationData, ResetPasswordData, Role, User,
    normalize_login_response,
};

// ---------------------------------------------------------------------------
// Fake backend
// ---------------------------------------------------------------------------

/// Holds a call until the test releases it.
#[derive(Default)]
struct Gate {
    entered: Notify,
    release: Notify,
}

#[derive(Default)]
struct FakeBackend {
    /// email -> raw login response body
    logins: HashMap<String, Value>,
    /// token -> raw `/auth/me` body
    users: HashMap<String, Value>,
    /// email or token -> gate
    gates: HashMap<String, Arc<Gate>>,
    me_calls: AtomicUsize,
    register_calls: AtomicUsize,
    reset_calls: AtomicUsize,
}

impl FakeBackend {
    fn with_login(mut self, email: &str, body: Value) -> Self {
        self.logins.insert(email.to_string(), body);
        self
    }

    fn with_user(mut self, token: &str, body: Value) -> Self {
        self.users.insert(token.to_string(), body);
        self
    }

    fn gated(mut self, key: &str) -> (Self, Arc<Gate>) {
        let gate = Arc::new(Gate::default());
        self.gates.insert(key.to_string(), gate.clone());
        (self, gate)
    }

    async fn pass(&self, key: &str) {
        if let Some(gate) = self.gates.get(key) {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }
}

fn unauthorized(message: Option<&str>) -> ApiError {
    ApiError::Status {
        status: 401,
        message: message.map(str::to_string),
    }
}

impl AuthBackend for FakeBackend {
    async fn login(&self, credentials: &LoginData) -> Result<LoginGrant, ApiError> {
        self.pass(&credentials.email).await;
        match self.logins.get(&credentials.email) {
            Some(body) => Ok(normalize_login_response(body)?),
            None => Err(unauthorized(Some("Credenciales inválidas"))),
        }
    }

    async fn register(&self, data: &RegistrationData) -> Result<Value, ApiError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        if data.email == "taken@parking.test" {
            return Err(ApiError::Status {
                status: 409,
                message: Some("El email ya está registrado".into()),
            });
        }
        Ok(json!({ "success": true, "data": { "id": 9, "email": data.email } }))
    }

    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        self.me_calls.fetch_add(1, Ordering::SeqCst);
        self.pass(token).await;
        match self.users.get(token) {
            Some(body) => Ok(serde_json::from_value(body.clone()).map_err(|e| ApiError::Decode(e.to_string()))?),
            None => Err(unauthorized(None)),
        }
    }

    async fn forgot_password(&self, email: &str) -> Result<Value, ApiError> {
        if email.is_empty() {
            return Err(ApiError::Status {
                status: 400,
                message: Some("Email requerido".into()),
            });
        }
        Ok(json!({ "message": "sent" }))
    }

    async fn reset_password(&self, data: &ResetPasswordData) -> Result<Value, ApiError> {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        if data.access_token == "expired" {
            return Err(ApiError::Status {
                status: 400,
                message: None,
            });
        }
        Ok(json!({ "message": "updated" }))
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    manager: Arc<SessionManager<FakeBackend>>,
    store: Arc<MemoryTokenStore>,
    history: Arc<History>,
}

fn harness(backend: FakeBackend, stored: Option<&str>) -> Harness {
    let store = Arc::new(match stored {
        Some(token) => MemoryTokenStore::with_token(token),
        None => MemoryTokenStore::new(),
    });
    harness_with(backend, store.clone(), store)
}

/// Harness whose manager writes through `token_store` while tests inspect
/// `store`.
fn harness_with(
    backend: FakeBackend,
    store: Arc<MemoryTokenStore>,
    token_store: Arc<dyn TokenStore>,
) -> Harness {
    let history = Arc::new(History::starting_at(Route::Login));
    let navigator: Arc<dyn Navigator> = history.clone();
    let manager = Arc::new(SessionManager::new(
        backend,
        token_store,
        navigator,
        AdmissionPolicy::default(),
    ));
    Harness {
        manager,
        store,
        history,
    }
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn mint(exp: u64) -> String {
    encode(
        &Header::default(),
        &json!({ "sub": "1", "exp": exp }),
        &EncodingKey::from_secret(b"not-checked-client-side"),
    )
    .unwrap()
}

fn user_json(rol: &str) -> Value {
    json!({
        "id": 1,
        "nombre": "Ana",
        "apellido": "Ruiz",
        "email": "ana@parking.test",
        "rol": rol
    })
}

fn stored(h: &Harness) -> Option<String> {
    h.store.load().unwrap()
}

/// Memory store whose saves start failing once `full` is set.
struct FillingStore {
    inner: Arc<MemoryTokenStore>,
    full: AtomicBool,
}

impl TokenStore for FillingStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        self.inner.load()
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        if self.full.load(Ordering::SeqCst) {
            return Err(TokenStoreError::Io(std::io::Error::other("disk full")));
        }
        self.inner.save(token)
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        self.inner.clear()
    }
}

// ---------------------------------------------------------------------------
// Start-up
// ---------------------------------------------------------------------------

mod initialize_tests {
    use super::*;

    #[tokio::test]
    async fn loading_until_initialized() {
        let h = harness(FakeBackend::default(), None);
        assert!(h.manager.snapshot().loading);

        let session = h.manager.initialize().await;
        assert!(!session.loading);
        assert!(session.current_user.is_none());
        assert!(session.error.is_none());
    }

    #[tokio::test]
    async fn expired_credential_is_purged_without_backend_call() {
        let token = mint(now() - 60);
        let h = harness(FakeBackend::default().with_user(&token, user_json("admin_general")), Some(&token));

        let session = h.manager.initialize().await;

        assert!(session.current_user.is_none());
        assert!(!session.loading);
        assert!(session.error.is_none());
        assert_eq!(stored(&h), None);
        assert_eq!(h.manager.backend().me_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_credential_restores_the_user() {
        let token = mint(now() + 3600);
        let h = harness(FakeBackend::default().with_user(&token, user_json("admin_parking")), Some(&token));

        let session = h.manager.initialize().await;

        assert_eq!(session.role(), Some(Role::AdminParking));
        assert_eq!(stored(&h).as_deref(), Some(token.as_str()));
    }

    #[tokio::test]
    async fn credential_rejected_by_backend_is_purged() {
        let token = mint(now() + 3600);
        let h = harness(FakeBackend::default(), Some(&token));

        let session = h.manager.initialize().await;

        assert!(session.current_user.is_none());
        assert!(session.error.is_none());
        assert_eq!(stored(&h), None);
    }

    #[tokio::test]
    async fn undecodable_credential_is_purged() {
        let h = harness(FakeBackend::default(), Some("not-a-jwt"));

        let session = h.manager.initialize().await;

        assert!(session.current_user.is_none());
        assert_eq!(stored(&h), None);
        assert_eq!(h.manager.backend().me_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn restored_customer_is_dropped_silently() {
        let token = mint(now() + 3600);
        let h = harness(FakeBackend::default().with_user(&token, user_json("cliente")), Some(&token));

        let session = h.manager.initialize().await;

        assert!(session.current_user.is_none());
        assert!(session.error.is_none());
        assert_eq!(stored(&h), None);
    }

    #[tokio::test]
    async fn runs_only_once() {
        let token = mint(now() + 3600);
        let h = harness(FakeBackend::default().with_user(&token, user_json("empleado")), Some(&token));

        h.manager.initialize().await;
        let again = h.manager.initialize().await;

        assert_eq!(again.role(), Some(Role::Employee));
        assert_eq!(h.manager.backend().me_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn start_up_check_overtaken_by_login_keeps_the_new_credential() {
        let old = mint(now() + 3600);
        let (backend, gate) = FakeBackend::default()
            .with_user(&old, user_json("admin_general"))
            .with_login(
                "emp@parking.test",
                json!({ "token": "fresh", "usuario": { "rol": "empleado" } }),
            )
            .gated(&old);
        let h = harness(backend, Some(&old));

        let manager = h.manager.clone();
        let pending = tokio::spawn(async move { manager.initialize().await });
        gate.entered.notified().await;

        h.manager
            .login(&LoginData::new("emp@parking.test", "secret"))
            .await
            .unwrap();
        gate.release.notify_one();
        let session = pending.await.unwrap();

        assert!(!session.loading);
        assert_eq!(session.role(), Some(Role::Employee));
        assert_eq!(stored(&h).as_deref(), Some("fresh"));
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

mod login_tests {
    use super::*;

    #[tokio::test]
    async fn nested_envelope_lands_employee_on_employee_home() {
        let backend = FakeBackend::default().with_login(
            "emp@parking.test",
            json!({ "data": { "token": "t1", "usuario": { "rol": "empleado" } } }),
        );
        let h = harness(backend, None);
        h.manager.initialize().await;

        let user = h
            .manager
            .login(&LoginData::new("emp@parking.test", "secret"))
            .await
            .unwrap();

        assert_eq!(user.rol, Role::Employee);
        assert_eq!(h.manager.snapshot().role(), Some(Role::Employee));
        assert_eq!(stored(&h).as_deref(), Some("t1"));
        assert_eq!(h.history.current(), Some(Route::EmployeeDashboard));
    }

    #[tokio::test]
    async fn admin_lands_on_admin_home() {
        let backend = FakeBackend::default().with_login(
            "ana@parking.test",
            json!({ "token": "t3", "user": user_json("admin_general") }),
        );
        let h = harness(backend, None);

        h.manager
            .login(&LoginData::new("ana@parking.test", "secret"))
            .await
            .unwrap();

        assert_eq!(h.history.current(), Some(Route::AdminDashboard));
    }

    #[tokio::test]
    async fn customer_is_rejected_and_nothing_is_stored() {
        let backend = FakeBackend::default().with_login(
            "cli@parking.test",
            json!({ "token": "t2", "user": { "rol": "cliente" } }),
        );
        let h = harness(backend, Some("previous"));
        h.manager.initialize().await;

        let err = h
            .manager
            .login(&LoginData::new("cli@parking.test", "secret"))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::RoleNotPermitted(Role::Customer)));
        let session = h.manager.snapshot();
        assert!(session.current_user.is_none());
        assert_eq!(session.error, Some(err.to_string()));
        assert_eq!(stored(&h), None);
        assert_eq!(h.history.entries(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn backend_message_becomes_the_error() {
        let h = harness(FakeBackend::default(), None);

        let err = h
            .manager
            .login(&LoginData::new("nobody@parking.test", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(err.to_code(), "UNAUTHORIZED");
        assert_eq!(h.manager.snapshot().error.as_deref(), Some("Credenciales inválidas"));
        assert_eq!(h.history.entries(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn malformed_response_uses_the_generic_message() {
        let backend = FakeBackend::default()
            .with_login("ana@parking.test", json!({ "usuario": { "rol": "admin_general" } }));
        let h = harness(backend, None);

        let err = h
            .manager
            .login(&LoginData::new("ana@parking.test", "secret"))
            .await
            .unwrap_err();

        assert_eq!(err.to_code(), "MALFORMED_RESPONSE");
        assert_eq!(h.manager.snapshot().error.as_deref(), Some("Could not sign in"));
        assert_eq!(stored(&h), None);
    }

    #[tokio::test]
    async fn new_attempt_clears_the_previous_error() {
        let backend = FakeBackend::default().with_login(
            "ana@parking.test",
            json!({ "token": "t", "usuario": user_json("admin_general") }),
        );
        let h = harness(backend, None);

        let _ = h.manager.login(&LoginData::new("typo@parking.test", "x")).await;
        assert!(h.manager.snapshot().error.is_some());

        h.manager
            .login(&LoginData::new("ana@parking.test", "secret"))
            .await
            .unwrap();
        assert!(h.manager.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn stale_login_is_superseded() {
        let (backend, gate) = FakeBackend::default()
            .with_login(
                "slow@parking.test",
                json!({ "token": "slow", "usuario": { "rol": "admin_general" } }),
            )
            .with_login(
                "fast@parking.test",
                json!({ "token": "fast", "usuario": { "rol": "empleado" } }),
            )
            .gated("slow@parking.test");
        let h = harness(backend, None);

        let manager = h.manager.clone();
        let slow = tokio::spawn(async move {
            manager
                .login(&LoginData::new("slow@parking.test", "secret"))
                .await
        });
        gate.entered.notified().await;

        h.manager
            .login(&LoginData::new("fast@parking.test", "secret"))
            .await
            .unwrap();
        gate.release.notify_one();

        let err = slow.await.unwrap().unwrap_err();
        assert!(matches!(err, SessionError::Superseded));
        assert_eq!(h.manager.snapshot().role(), Some(Role::Employee));
        assert_eq!(stored(&h).as_deref(), Some("fast"));
        assert_eq!(h.history.current(), Some(Route::EmployeeDashboard));
    }

    #[tokio::test]
    async fn logout_during_login_wins() {
        let (backend, gate) = FakeBackend::default()
            .with_login(
                "slow@parking.test",
                json!({ "token": "slow", "usuario": { "rol": "admin_general" } }),
            )
            .gated("slow@parking.test");
        let h = harness(backend, None);

        let manager = h.manager.clone();
        let slow = tokio::spawn(async move {
            manager
                .login(&LoginData::new("slow@parking.test", "secret"))
                .await
        });
        gate.entered.notified().await;

        h.manager.logout();
        gate.release.notify_one();

        assert!(matches!(slow.await.unwrap(), Err(SessionError::Superseded)));
        assert!(h.manager.snapshot().current_user.is_none());
        assert_eq!(stored(&h), None);
        assert_eq!(h.history.current(), Some(Route::Login));
    }

    #[tokio::test]
    async fn failed_save_leaves_no_credential_behind() {
        let backend = FakeBackend::default()
            .with_login(
                "ana@parking.test",
                json!({ "token": "tA", "usuario": user_json("admin_general") }),
            )
            .with_login(
                "eva@parking.test",
                json!({ "token": "tB", "usuario": user_json("empleado") }),
            );
        let memory = Arc::new(MemoryTokenStore::new());
        let filling = Arc::new(FillingStore {
            inner: memory.clone(),
            full: AtomicBool::new(false),
        });
        let h = harness_with(backend, memory, filling.clone());
        h.manager.initialize().await;

        h.manager
            .login(&LoginData::new("ana@parking.test", "secret"))
            .await
            .unwrap();
        assert_eq!(stored(&h).as_deref(), Some("tA"));

        filling.full.store(true, Ordering::SeqCst);
        let err = h
            .manager
            .login(&LoginData::new("eva@parking.test", "secret"))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Storage(_)));
        assert_eq!(stored(&h), None);
        let session = h.manager.snapshot();
        assert!(session.current_user.is_none());
        assert_eq!(session.error, Some(err.to_string()));
    }

    #[tokio::test]
    async fn observers_see_the_login() {
        let backend = FakeBackend::default().with_login(
            "ana@parking.test",
            json!({ "token": "t", "usuario": user_json("admin_general") }),
        );
        let h = harness(backend, None);
        h.manager.initialize().await;
        let mut rx = h.manager.subscribe();

        h.manager
            .login(&LoginData::new("ana@parking.test", "secret"))
            .await
            .unwrap();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().role(), Some(Role::AdminGeneral));
    }
}

// ---------------------------------------------------------------------------
// Logout and error handling
// ---------------------------------------------------------------------------

mod logout_tests {
    use super::*;

    #[tokio::test]
    async fn logout_twice_is_the_same_as_once() {
        let backend = FakeBackend::default().with_login(
            "ana@parking.test",
            json!({ "token": "t", "usuario": user_json("admin_general") }),
        );
        let h = harness(backend, None);
        h.manager.initialize().await;
        h.manager
            .login(&LoginData::new("ana@parking.test", "secret"))
            .await
            .unwrap();

        h.manager.logout();
        let once = h.manager.snapshot();
        h.manager.logout();
        let twice = h.manager.snapshot();

        assert_eq!(once, twice);
        assert!(twice.current_user.is_none());
        assert_eq!(stored(&h), None);
        assert_eq!(h.history.current(), Some(Route::Login));
    }

    #[tokio::test]
    async fn logout_before_anything_is_harmless() {
        let h = harness(FakeBackend::default(), None);
        h.manager.logout();
        assert_eq!(h.history.current(), Some(Route::Login));
        assert_eq!(stored(&h), None);
    }

    #[tokio::test]
    async fn clear_error_touches_nothing_else() {
        let h = harness(FakeBackend::default(), None);
        h.manager.initialize().await;
        let _ = h.manager.login(&LoginData::new("x@parking.test", "y")).await;
        let before = h.manager.snapshot();

        h.manager.clear_error();
        let after = h.manager.snapshot();

        assert!(after.error.is_none());
        assert_eq!(after.current_user, before.current_user);
        assert_eq!(after.loading, before.loading);
    }
}

// ---------------------------------------------------------------------------
// Account operations
// ---------------------------------------------------------------------------

mod account_tests {
    use super::*;

    fn form(email: &str, confirm: &str) -> RegistrationData {
        RegistrationData {
            nombre: "Luis".into(),
            apellido: "Pérez".into(),
            email: email.into(),
            password: "secret123".into(),
            confirm_password: confirm.into(),
            telefono: None,
            rol: Role::Employee,
            id_parking: Some(2),
        }
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_the_backend() {
        let h = harness(FakeBackend::default(), None);

        let err = h
            .manager
            .register(&form("luis@parking.test", "different"))
            .await
            .unwrap_err();

        assert_eq!(err.to_code(), "PASSWORD_MISMATCH");
        assert!(h.manager.snapshot().error.is_some());
        assert_eq!(h.manager.backend().register_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn registration_does_not_sign_in() {
        let h = harness(FakeBackend::default(), None);
        h.manager.initialize().await;

        let payload = h
            .manager
            .register(&form("luis@parking.test", "secret123"))
            .await
            .unwrap();

        assert_eq!(payload["data"]["id"], 9);
        assert!(h.manager.snapshot().current_user.is_none());
        assert_eq!(stored(&h), None);
        assert_eq!(h.history.entries(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn registration_conflict_surfaces_backend_message() {
        let h = harness(FakeBackend::default(), None);

        let err = h
            .manager
            .register(&form("taken@parking.test", "secret123"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "El email ya está registrado");
        assert_eq!(h.manager.snapshot().error.as_deref(), Some("El email ya está registrado"));
    }

    #[tokio::test]
    async fn password_recovery_round() {
        let h = harness(FakeBackend::default(), None);

        h.manager.forgot_password("ana@parking.test").await.unwrap();
        h.manager
            .reset_password(&ResetPasswordData::new("abc", "n3w-secret", "n3w-secret"))
            .await
            .unwrap();
        assert!(h.manager.snapshot().error.is_none());

        let err = h
            .manager
            .reset_password(&ResetPasswordData::new("expired", "n3w-secret", "n3w-secret"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Could not reset the password");
        assert!(h.manager.snapshot().current_user.is_none());
        assert_eq!(h.manager.backend().reset_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalid_reset_never_reaches_the_backend() {
        let h = harness(FakeBackend::default(), None);

        for (data, code) in [
            (ResetPasswordData::new("abc", "12345", "12345"), "PASSWORD_TOO_SHORT"),
            (ResetPasswordData::new("abc", "n3w-secret", "n3w-secreT"), "PASSWORD_MISMATCH"),
            (ResetPasswordData::new("", "n3w-secret", "n3w-secret"), "MISSING_TOKEN"),
        ] {
            let err = h.manager.reset_password(&data).await.unwrap_err();
            assert!(matches!(err, SessionError::InvalidReset(_)));
            assert_eq!(err.to_code(), code);
            assert_eq!(h.manager.snapshot().error, Some(err.to_string()));
        }

        assert_eq!(h.manager.backend().reset_calls.load(Ordering::SeqCst), 0);
    }
}
