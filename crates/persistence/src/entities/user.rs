//! User entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::Role;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum RoleDb {
    Client,
    Prestataire,
    Admin,
}

impl From<RoleDb> for Role {
    fn from(db: RoleDb) -> Self {
        match db {
            RoleDb::Client => Role::Client,
            RoleDb::Prestataire => Role::Prestataire,
            RoleDb::Admin => Role::Admin,
        }
    }
}

impl From<Role> for RoleDb {
    fn from(role: Role) -> Self {
        match role {
            Role::Client => RoleDb::Client,
            Role::Prestataire => RoleDb::Prestataire,
            Role::Admin => RoleDb::Admin,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub nom: String,
    pub prenom: Option<String>,
    pub role: RoleDb,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
