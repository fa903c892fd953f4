use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// An employee may exist without a linked User; one created through the
/// import pipeline always gets one.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Employee {
    pub id: String,
    pub company_id: String,
    pub ep_number: String,
    pub name: String,
    pub plant: String,
    pub department: String,
    pub trade: String,
    pub skill: String,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Employee {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        company_id: String,
        ep_number: String,
        name: String,
        plant: String,
        department: String,
        trade: String,
        skill: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            company_id,
            ep_number,
            name,
            plant,
            department,
            trade,
            skill,
            user_id: None,
            created_at: Utc::now(),
        }
    }
}
