use std::collections::HashSet;
use std::fmt;

use serde::de::IntoDeserializer;
use serde::de::value::{Error as DeError, StrDeserializer};
use serde::{Deserialize, Serialize};

/// Every role the backend can assign to an account.
///
/// `Admin` is the older single-tier spelling of a general administrator and
/// is still emitted by some accounts. Strings the console does not know land
/// in `Unknown` instead of failing deserialization, so a new backend role is
/// rejected by policy rather than by a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin_general")]
    AdminGeneral,
    #[serde(rename = "admin_parking")]
    AdminParking,
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "empleado")]
    Employee,
    #[serde(rename = "cliente")]
    Customer,
    #[serde(other, rename = "unknown")]
    Unknown,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::AdminGeneral,
        Role::AdminParking,
        Role::Admin,
        Role::Employee,
        Role::Customer,
        Role::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdminGeneral => "admin_general",
            Self::AdminParking => "admin_parking",
            Self::Admin => "admin",
            Self::Employee => "empleado",
            Self::Customer => "cliente",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a wire string through the serde names above, so both stay in
    /// step. Unrecognised values map to [`Role::Unknown`].
    pub fn parse(value: &str) -> Self {
        let de: StrDeserializer<'_, DeError> = value.into_deserializer();
        Self::deserialize(de).unwrap_or(Self::Unknown)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::AdminGeneral | Self::AdminParking | Self::Admin)
    }

    /// Customers use the mobile app only; they have no screen in the console.
    pub fn has_web_presence(&self) -> bool {
        self.is_admin() || matches!(self, Self::Employee)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unordered set of roles, used by route guards and the admission policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(HashSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self(HashSet::new())
    }

    /// The roles allowed to use the console at all.
    pub fn console_default() -> Self {
        Self::from([
            Role::AdminGeneral,
            Role::AdminParking,
            Role::Admin,
            Role::Employee,
        ])
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.0.iter()
    }
}

impl<const N: usize> From<[Role; N]> for RoleSet {
    fn from(roles: [Role; N]) -> Self {
        Self(roles.into_iter().collect())
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.0.iter().map(Role::as_str).collect();
        names.sort_unstable();
        write!(f, "{{{}}}", names.join(", "))
    }
}
