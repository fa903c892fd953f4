use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// A time-bounded supervisor-to-employee oversight relation.
/// `end_date = None` means open-ended; intervals for one employee never overlap.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Assignment {
    pub id: String,
    pub employee_id: String,
    pub supervisor_id: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_by_id: String,
    pub created_at: DateTime<Utc>,
}

impl Assignment {
    pub fn new(
        employee_id: String,
        supervisor_id: String,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        created_by_id: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            employee_id,
            supervisor_id,
            start_date,
            end_date,
            created_by_id,
            created_at: Utc::now(),
        }
    }
}
