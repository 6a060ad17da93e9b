use serde::{Deserialize, Serialize};

use super::role::Role;

/// Registration form as filled in by an administrator.
///
/// `confirm_password` only exists client-side; it is never serialized, so the
/// body sent to `/auth/register` is the user fields minus the confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationData {
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing, default, alias = "confirmPassword")]
    pub confirm_password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default = "default_role")]
    pub rol: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_parking: Option<i64>,
}

fn default_role() -> Role {
    Role::Customer
}

/// Error codes for client-side registration checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    MissingField(String),
    InvalidEmail,
    PasswordMismatch,
    UnknownRole,
}

impl RegistrationError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::UnknownRole => "UNKNOWN_ROLE",
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            Self::MissingField(field) => format!("Missing required field: {}", field),
            Self::InvalidEmail => "Invalid email format".to_string(),
            Self::PasswordMismatch => "Passwords do not match".to_string(),
            Self::UnknownRole => "Role is not recognised".to_string(),
        }
    }
}

impl RegistrationData {
    /// Checks done before anything reaches the backend.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        for (name, value) in [
            ("nombre", &self.nombre),
            ("apellido", &self.apellido),
            ("email", &self.email),
            ("password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(RegistrationError::MissingField(name.to_string()));
            }
        }

        if !is_plausible_email(&self.email) {
            return Err(RegistrationError::InvalidEmail);
        }

        if self.password != self.confirm_password {
            return Err(RegistrationError::PasswordMismatch);
        }

        if self.rol == Role::Unknown {
            return Err(RegistrationError::UnknownRole);
        }

        Ok(())
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}
