use serde::Serialize;

use crate::domain::models::user::UserRole;

#[derive(Serialize)]
pub struct CreatedUserResponse {
    pub id: String,
    pub username: String,
    pub role: UserRole,
    pub company_id: Option<String>,
    /// Initial credential, surfaced once so the administrator can hand it
    /// over; the account must change it on first login.
    pub initial_password: String,
}

#[derive(Serialize)]
pub struct PasswordResetResponse {
    pub username: String,
    pub new_password: String,
}
