use std::fmt;

use serde::{Deserialize, Serialize};

use super::role::Role;

/// The account behind a session, as returned by `/auth/me` and `/auth/login`.
///
/// Only `rol` is mandatory: several backend builds return a trimmed user on
/// login. The id arrives as `id` or `id_usuario` depending on the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, alias = "id_usuario")]
    pub id: Option<i64>,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub apellido: String,
    #[serde(default)]
    pub email: String,
    pub rol: Role,
    /// Parking the user is scoped to (parking admins and employees).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_parking: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bloqueado: Option<bool>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombre, self.apellido).trim().to_string()
    }

    pub fn is_blocked(&self) -> bool {
        self.bloqueado.unwrap_or(false)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={:?}, email={}, rol={}, id_parking={:?}",
            self.id, self.email, self.rol, self.id_parking
        )
    }
}
