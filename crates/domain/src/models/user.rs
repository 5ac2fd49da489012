//! User roles.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Role attached to every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Prestataire,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Prestataire => "prestataire",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "client" => Ok(Role::Client),
            "prestataire" => Ok(Role::Prestataire),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_str() {
        for role in [Role::Client, Role::Prestataire, Role::Admin] {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn test_role_from_str_case_insensitive() {
        assert_eq!(Role::from_str("ADMIN").unwrap(), Role::Admin);
        assert!(Role::from_str("superuser").is_err());
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(
            serde_json::to_string(&Role::Prestataire).unwrap(),
            "\"prestataire\""
        );
        let role: Role = serde_json::from_str("\"client\"").unwrap();
        assert_eq!(role, Role::Client);
    }
}
