use serde::{Deserialize, Serialize};

/// Shortest new password the reset form accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Password-reset form: the access token from the recovery link plus the new
/// password typed twice.
///
/// Serializes to the `/auth/reset-password` body; the confirmation stays
/// client-side.
#[derive(Clone, Serialize, Deserialize)]
pub struct ResetPasswordData {
    pub access_token: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
    #[serde(skip_serializing, default, alias = "confirmPassword")]
    pub confirm_password: String,
}

/// Error codes for client-side reset checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetPasswordError {
    MissingToken,
    PasswordTooShort,
    PasswordMismatch,
}

impl ResetPasswordError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::PasswordTooShort => "PASSWORD_TOO_SHORT",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            Self::MissingToken => {
                "The reset link carries no token; request a new recovery email".to_string()
            }
            Self::PasswordTooShort => format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LEN
            ),
            Self::PasswordMismatch => "Passwords do not match".to_string(),
        }
    }
}

impl ResetPasswordData {
    pub fn new(
        access_token: impl Into<String>,
        new_password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            new_password: new_password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    /// Checks done before anything reaches the backend, in the order the
    /// form reports them.
    pub fn validate(&self) -> Result<(), ResetPasswordError> {
        if self.access_token.trim().is_empty() {
            return Err(ResetPasswordError::MissingToken);
        }

        if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ResetPasswordError::PasswordTooShort);
        }

        if self.new_password != self.confirm_password {
            return Err(ResetPasswordError::PasswordMismatch);
        }

        Ok(())
    }
}

// Keeps the token and passwords out of logs.
impl std::fmt::Debug for ResetPasswordData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetPasswordData")
            .field("access_token", &"<redacted>")
            .field("new_password", &"<redacted>")
            .finish()
    }
}
