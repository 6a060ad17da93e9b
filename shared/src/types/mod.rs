pub mod client_config;
pub mod envelope;
pub mod json_error;
pub mod jwt;
pub mod login;
pub mod register;
pub mod reset;
pub mod resources;
pub mod role;
pub mod user;

pub use self::client_config::{AppConfig, ConfigError};
pub use self::envelope::{normalize_list, unwrap_data};
pub use self::json_error::backend_message;
pub use self::jwt::{ClaimsError, CredentialClaims};
pub use self::login::{LoginData, LoginGrant, LoginShapeError, normalize_login_response};
pub use self::register::{RegistrationData, RegistrationError};
pub use self::reset::{MIN_PASSWORD_LEN, ResetPasswordData, ResetPasswordError};
pub use self::resources::{DateRange, ReservationStatus};
pub use self::role::{Role, RoleSet};
pub use self::user::User;
