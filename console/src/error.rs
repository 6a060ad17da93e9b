use shared::types::{LoginShapeError, RegistrationError, ResetPasswordError, Role};
use thiserror::Error;

/// Failures of the credential storage.
#[derive(Error, Debug)]
pub enum TokenStoreError {
    #[error("token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored credential is not valid UTF-8")]
    Encoding,
}

/// Failures of a single backend call.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("backend answered {status}{}", suffix(.message))]
    Status { status: u16, message: Option<String> },

    #[error("could not encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("malformed login response: {0}")]
    MalformedLogin(#[from] LoginShapeError),

    #[error(transparent)]
    Storage(#[from] TokenStoreError),
}

fn suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

impl ApiError {
    /// The backend's own message, when the failure carried one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures surfaced by the session manager to the calling form.
///
/// `Display` is the text shown to the user; it matches what lands in
/// `Session::error`.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The backend rejected the call or could not be reached.
    #[error("{message}")]
    Backend {
        message: String,
        #[source]
        source: ApiError,
    },

    /// Credential valid, but the role belongs to another client application.
    #[error("Your role ({0}) does not have access to the web console. Use the mobile app.")]
    RoleNotPermitted(Role),

    #[error("{}", .0.to_message())]
    InvalidRegistration(RegistrationError),

    #[error("{}", .0.to_message())]
    InvalidReset(ResetPasswordError),

    #[error("Could not store the session credential")]
    Storage(#[from] TokenStoreError),

    /// A newer login or logout started before this call resolved.
    #[error("Superseded by a newer session request")]
    Superseded,
}

impl SessionError {
    /// Wrap an API failure, preferring the backend's message over `fallback`.
    pub fn from_api(source: ApiError, fallback: &str) -> Self {
        let message = source
            .backend_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string());
        Self::Backend { message, source }
    }

    pub fn to_code(&self) -> &'static str {
        match self {
            Self::Backend { source, .. } if source.is_unauthorized() => "UNAUTHORIZED",
            Self::Backend {
                source: ApiError::MalformedLogin(_),
                ..
            } => "MALFORMED_RESPONSE",
            Self::Backend { .. } => "BACKEND_ERROR",
            Self::RoleNotPermitted(_) => "ROLE_NOT_PERMITTED",
            Self::InvalidRegistration(e) => e.to_code(),
            Self::InvalidReset(e) => e.to_code(),
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Superseded => "SUPERSEDED",
        }
    }
}
