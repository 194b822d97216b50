use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Capabilities an actor may hold. Mutating handlers name the capabilities
/// they need and block before any repository call when one is missing.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ManageEvents,
    ManageRegistrations,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ManageEvents => "events:manage",
            Capability::ManageRegistrations => "registrations:manage",
        }
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "events:manage" => Ok(Capability::ManageEvents),
            "registrations:manage" => Ok(Capability::ManageRegistrations),
            other => Err(format!("unknown capability '{other}'")),
        }
    }
}

/// Bearer token claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub exp: i64,
    #[serde(default)]
    pub caps: Vec<String>,
}

/// The authenticated caller, as seen by handlers and the permission checker.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: String,
    pub caps: Vec<String>,
}

impl From<Claims> for Actor {
    fn from(claims: Claims) -> Self {
        Actor {
            user_id: claims.sub,
            caps: claims.caps,
        }
    }
}
