use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::models::attendance::AttendanceRecord;
use crate::domain::models::employee::Employee;
use crate::domain::models::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    Validate,
    Commit,
}

/// Row-level failure. Collected and reported per row; never aborts the batch.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RowError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Invalid date format: {0}. Expected DD-MM-YYYY")]
    InvalidDate(String),
    #[error("Invalid time format in {field}: {value}. Expected HH:MM")]
    InvalidTime { field: &'static str, value: String },
    #[error("Invalid status: {0}. Must be one of P, A, -0.5, -1")]
    InvalidStatus(String),
    #[error("Invalid number in {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("Unknown company: {0}")]
    UnknownCompany(String),
    #[error("EP number {0} collides with an existing user account")]
    ConflictingUser(String),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RowIssue {
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ImportResult {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub error_rows: usize,
    pub created: usize,
    pub updated: usize,
    pub errors: Vec<RowIssue>,
}

/// Everything one commit-mode import pass wants to persist, flushed in a
/// single transaction by the import repository.
#[derive(Debug, Default, Clone)]
pub struct ImportBatch {
    pub new_users: Vec<User>,
    pub new_employees: Vec<Employee>,
    pub created_records: Vec<AttendanceRecord>,
    pub updated_records: Vec<AttendanceRecord>,
}

impl ImportBatch {
    pub fn is_empty(&self) -> bool {
        self.new_users.is_empty()
            && self.new_employees.is_empty()
            && self.created_records.is_empty()
            && self.updated_records.is_empty()
    }
}
