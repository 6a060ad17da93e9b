use std::fmt;

use serde::de::IntoDeserializer;
use serde::de::value::{Error as DeError, StrDeserializer};
use serde::{Deserialize, Serialize};

/// Lifecycle of a reservation as tracked by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pendiente,
    Confirmada,
    Completada,
    Cancelada,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendiente => "pendiente",
            Self::Confirmada => "confirmada",
            Self::Completada => "completada",
            Self::Cancelada => "cancelada",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let de: StrDeserializer<'_, DeError> = s.into_deserializer();
        Self::deserialize(de).map_err(|_| format!("unknown reservation status: {}", s))
    }
}

/// Optional reporting window sent as `fecha_inicio` / `fecha_fin`.
///
/// Dates are passed through as the `YYYY-MM-DD` strings the backend expects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl DateRange {
    pub fn new(from: Option<String>, to: Option<String>) -> Self {
        Self { from, to }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(from) = &self.from {
            pairs.push(("fecha_inicio", from.clone()));
        }
        if let Some(to) = &self.to {
            pairs.push(("fecha_fin", to.clone()));
        }
        pairs
    }
}
