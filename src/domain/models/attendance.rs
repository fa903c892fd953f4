use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use std::fmt;
use thiserror::Error;

/// Attendance status codes as they appear in the CSV schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    #[serde(rename = "P")]
    Present,
    #[serde(rename = "A")]
    Absent,
    #[serde(rename = "-0.5")]
    HalfDay,
    #[serde(rename = "-1")]
    FullDayDeduction,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "P",
            AttendanceStatus::Absent => "A",
            AttendanceStatus::HalfDay => "-0.5",
            AttendanceStatus::FullDayDeduction => "-1",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown attendance status: {0}")]
pub struct ParseStatusError(String);

impl std::str::FromStr for AttendanceStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P" => Ok(AttendanceStatus::Present),
            "A" => Ok(AttendanceStatus::Absent),
            "-0.5" => Ok(AttendanceStatus::HalfDay),
            "-1" => Ok(AttendanceStatus::FullDayDeduction),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

impl TryFrom<String> for AttendanceStatus {
    type Error = ParseStatusError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// One record per employee per calendar day; the unit the import upserts.
/// Records are never hard-deleted, only flagged.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub id: String,
    pub employee_id: String,
    pub company_id: String,
    pub date: NaiveDate,
    pub in1: Option<NaiveTime>,
    pub out1: Option<NaiveTime>,
    pub in2: Option<NaiveTime>,
    pub out2: Option<NaiveTime>,
    pub in3: Option<NaiveTime>,
    pub out3: Option<NaiveTime>,
    pub hours_worked: Decimal,
    pub overtime: Decimal,
    pub status: AttendanceStatus,
    pub plant: String,
    pub department: String,
    pub trade: String,
    pub skill: String,
    pub last_edit_by_id: Option<String>,
    pub last_edit_at: Option<DateTime<Utc>>,
    pub remarks_count: i64,
    pub soft_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn new(
        employee_id: String,
        company_id: String,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            employee_id,
            company_id,
            date,
            in1: None,
            out1: None,
            in2: None,
            out2: None,
            in3: None,
            out3: None,
            hours_worked: Decimal::ZERO,
            overtime: Decimal::ZERO,
            status,
            plant: String::new(),
            department: String::new(),
            trade: String::new(),
            skill: String::new(),
            last_edit_by_id: None,
            last_edit_at: None,
            remarks_count: 0,
            soft_deleted: false,
            created_at: Utc::now(),
        }
    }
}

/// Append-only annotation on an attendance record.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Remark {
    pub id: String,
    pub attendance_id: String,
    pub author_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Remark {
    pub fn new(attendance_id: String, author_id: String, text: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            attendance_id,
            author_id,
            text,
            created_at: Utc::now(),
        }
    }
}

/// A flattened attendance row joined with its employee and company,
/// ready for CSV serialization.
#[derive(Debug, Clone)]
pub struct ExportRow {
    pub ep_number: String,
    pub employee_name: String,
    pub company_name: String,
    pub plant: String,
    pub department: String,
    pub trade: String,
    pub skill: String,
    pub date: NaiveDate,
    pub in1: Option<NaiveTime>,
    pub out1: Option<NaiveTime>,
    pub in2: Option<NaiveTime>,
    pub out2: Option<NaiveTime>,
    pub in3: Option<NaiveTime>,
    pub out3: Option<NaiveTime>,
    pub hours_worked: Decimal,
    pub overtime: Decimal,
    pub status: AttendanceStatus,
}

/// Which slice of the attendance table an export query may see.
#[derive(Debug, Clone)]
pub enum ExportScope {
    All,
    Company(String),
    /// Employees currently assigned to this supervisor profile as of a date.
    Supervisor { profile_id: String, on: NaiveDate },
    Employee(String),
}
