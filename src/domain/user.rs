//! User domain entity and the role model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// The three managed roles. A user holds exactly one at a time; the
/// single-role invariant is structural (one column) rather than enforced
/// by precedence over overlapping memberships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Support,
    Manager,
}

impl Role {
    pub fn is_manager(&self) -> bool {
        matches!(self, Role::Manager)
    }

    pub fn is_support(&self) -> bool {
        matches!(self, Role::Support)
    }

    pub fn is_employee(&self) -> bool {
        matches!(self, Role::Employee)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Support => "support",
            Role::Manager => "manager",
        }
    }

    /// Parse a role name, rejecting anything outside the managed set.
    pub fn parse(s: &str) -> AppResult<Self> {
        match s {
            "employee" => Ok(Role::Employee),
            "support" => Ok(Role::Support),
            "manager" => Ok(Role::Manager),
            other => Err(AppError::validation(format!("Unknown role: {}", other))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role string persisted by something other than role administration is a
/// data error; default to Employee, matching the implicit default role.
impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Role::parse(s).unwrap_or(Role::Employee)
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    /// Department membership, only meaningful for the Support role.
    pub department_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user. New accounts always start as Employee.
    pub fn new(id: Uuid, email: String, password_hash: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            password_hash,
            name,
            role: Role::Employee,
            department_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }

    pub fn is_support(&self) -> bool {
        self.role.is_support()
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// User email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User display name
    #[schema(example = "Dana Levin")]
    pub name: String,
    /// User role
    #[schema(example = "employee")]
    pub role: String,
    /// Department (support staff only)
    pub department_id: Option<Uuid>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role.to_string(),
            department_id: user.department_id,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_users_default_to_employee() {
        let user = User::new(
            Uuid::new_v4(),
            "a@example.com".into(),
            "hash".into(),
            "A".into(),
        );
        assert_eq!(user.role, Role::Employee);
        assert!(user.department_id.is_none());
    }

    #[test]
    fn role_parse_rejects_unknown_names() {
        assert_eq!(Role::parse("manager").unwrap(), Role::Manager);
        assert_eq!(Role::parse("support").unwrap(), Role::Support);
        assert_eq!(Role::parse("employee").unwrap(), Role::Employee);
        assert!(Role::parse("admin").is_err());
        assert!(Role::parse("Manager").is_err());
    }

    #[test]
    fn unknown_stored_role_falls_back_to_employee() {
        assert_eq!(Role::from("garbage"), Role::Employee);
    }
}
