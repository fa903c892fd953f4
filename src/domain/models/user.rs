use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "MASTER")]
    Master,
    #[serde(rename = "ROOT")]
    Root,
    #[serde(rename = "SUPERVISOR")]
    Supervisor,
    #[serde(rename = "EMPLOYEE")]
    Employee,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Master => "MASTER",
            UserRole::Root => "ROOT",
            UserRole::Supervisor => "SUPERVISOR",
            UserRole::Employee => "EMPLOYEE",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown user role: {0}")]
pub struct ParseUserRoleError(String);

impl std::str::FromStr for UserRole {
    type Err = ParseUserRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MASTER" => Ok(UserRole::Master),
            "ROOT" => Ok(UserRole::Root),
            "SUPERVISOR" => Ok(UserRole::Supervisor),
            "EMPLOYEE" => Ok(UserRole::Employee),
            other => Err(ParseUserRoleError(other.to_string())),
        }
    }
}

impl TryFrom<String> for UserRole {
    type Error = ParseUserRoleError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: UserRole,
    pub company_id: Option<String>,
    pub ep_number: Option<String>,
    pub is_active: bool,
    pub must_change_password: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, password_hash: String, role: UserRole, company_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash,
            role,
            company_id,
            ep_number: None,
            is_active: true,
            must_change_password: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SupervisorProfile {
    pub id: String,
    pub user_id: String,
    pub company_id: String,
    pub created_at: DateTime<Utc>,
}

impl SupervisorProfile {
    pub fn new(user_id: String, company_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            company_id,
            created_at: Utc::now(),
        }
    }
}
