use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::models::import::ImportMode;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateRootUserRequest {
    pub username: String,
    pub company_id: String,
}

#[derive(Deserialize)]
pub struct CreateSupervisorRequest {
    pub ep_number: String,
}

#[derive(Deserialize)]
pub struct CreateAssignmentRequest {
    pub employee_id: String,
    pub supervisor_id: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct ImportQuery {
    #[serde(default = "default_mode")]
    pub mode: ImportMode,
}

fn default_mode() -> ImportMode {
    ImportMode::Validate
}

#[derive(Deserialize)]
pub struct AddRemarkRequest {
    pub text: String,
}
