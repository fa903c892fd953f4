use std::sync::Arc;
use chrono::NaiveDate;
use serde_json::json;
use tracing::{error, info};

use crate::domain::models::assignment::Assignment;
use crate::domain::models::audit::{AuditAction, AuditEvent};
use crate::domain::models::user::User;
use crate::domain::ports::{AssignmentRepository, AuditSink};
use crate::error::AppError;

pub struct AssignmentService {
    assignment_repo: Arc<dyn AssignmentRepository>,
    audit: Arc<dyn AuditSink>,
}

impl AssignmentService {
    pub fn new(assignment_repo: Arc<dyn AssignmentRepository>, audit: Arc<dyn AuditSink>) -> Self {
        Self { assignment_repo, audit }
    }

    /// Creates an assignment, rejecting any interval overlap for the
    /// employee. Open-ended assignments overlap everything from their start.
    pub async fn create(
        &self,
        employee_id: &str,
        supervisor_id: &str,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        actor: &User,
    ) -> Result<Assignment, AppError> {
        if let Some(end) = end_date {
            if end < start_date {
                return Err(AppError::Validation(
                    "End date cannot be before start date".to_string(),
                ));
            }
        }

        if self
            .assignment_repo
            .exists_overlapping(employee_id, start_date, end_date)
            .await?
        {
            return Err(AppError::Conflict(
                "This employee already has an overlapping assignment".to_string(),
            ));
        }

        let assignment = Assignment::new(
            employee_id.to_string(),
            supervisor_id.to_string(),
            start_date,
            end_date,
            actor.id.clone(),
        );
        let created = self.assignment_repo.create(&assignment).await?;

        info!(
            assignment = %created.id,
            employee = %created.employee_id,
            supervisor = %created.supervisor_id,
            "assignment created"
        );

        let event = AuditEvent::new(
            &actor.id,
            AuditAction::Create,
            "Assignment",
            &created.id,
            json!({
                "employee_id": {"before": null, "after": created.employee_id},
                "supervisor_id": {"before": null, "after": created.supervisor_id},
                "start_date": {"before": null, "after": created.start_date},
                "end_date": {"before": null, "after": created.end_date},
            }),
        );
        if let Err(err) = self.audit.record(event).await {
            error!("audit sink rejected assignment event: {:?}", err);
        }

        Ok(created)
    }
}
