use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Closed set of permission groups. Tokens carry these as strings; they are
/// parsed exactly once at the authorization boundary and travel as typed
/// values from there on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    ProjectManager,
    Foreman,
    Worker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ProjectManager => "project_manager",
            Role::Foreman => "foreman",
            Role::Worker => "worker",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "project_manager" => Some(Role::ProjectManager),
            "foreman" => Some(Role::Foreman),
            "worker" => Some(Role::Worker),
            _ => None,
        }
    }

    /// Roles allowed to act on another user's assessments.
    pub const ELEVATED: &'static [Role] = &[Role::Admin, Role::ProjectManager, Role::Foreman];

    /// The admin role itself is provisioned operationally, never over the API.
    pub fn is_grantable(&self) -> bool {
        !matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trip() {
        for role in [Role::Admin, Role::ProjectManager, Role::Foreman, Role::Worker] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("hr"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn admin_is_not_grantable() {
        assert!(!Role::Admin.is_grantable());
        assert!(Role::Foreman.is_grantable());
    }
}
