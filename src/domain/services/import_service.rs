use std::sync::Arc;
use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::models::audit::{AuditAction, AuditEvent};
use crate::domain::models::import::{ImportBatch, ImportMode, ImportResult, RowIssue};
use crate::domain::models::user::User;
use crate::domain::ports::{
    AttendanceRepository, AuditSink, CompanyRepository, EmployeeRepository, ImportRepository,
    UserRepository,
};
use crate::domain::services::reconcile::{reconcile_row, ReconcileError, UnitOfWork};
use crate::domain::services::validation::{validate_row, CompanyIndex, CsvTable, HEADER_ROW_OFFSET};
use crate::error::AppError;

/// Drives one bulk attendance import: column check, per-row validation,
/// reconciliation into a unit of work, and (in commit mode) a single atomic
/// flush. One bad row never aborts the batch; a store failure always does.
pub struct ImportService {
    company_repo: Arc<dyn CompanyRepository>,
    employee_repo: Arc<dyn EmployeeRepository>,
    user_repo: Arc<dyn UserRepository>,
    attendance_repo: Arc<dyn AttendanceRepository>,
    import_repo: Arc<dyn ImportRepository>,
    audit: Arc<dyn AuditSink>,
}

impl ImportService {
    pub fn new(
        company_repo: Arc<dyn CompanyRepository>,
        employee_repo: Arc<dyn EmployeeRepository>,
        user_repo: Arc<dyn UserRepository>,
        attendance_repo: Arc<dyn AttendanceRepository>,
        import_repo: Arc<dyn ImportRepository>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            company_repo,
            employee_repo,
            user_repo,
            attendance_repo,
            import_repo,
            audit,
        }
    }

    pub async fn import_attendance(
        &self,
        data: &[u8],
        mode: ImportMode,
        actor: &User,
    ) -> Result<ImportResult, AppError> {
        let table = CsvTable::parse(data)?;
        let companies = CompanyIndex::new(self.company_repo.list().await?);

        let (mut result, mut batch) = self.stage(&table, &companies, mode).await?;

        if mode == ImportMode::Validate {
            info!(
                total = result.total_rows,
                valid = result.valid_rows,
                errors = result.error_rows,
                "attendance import validated (dry run)"
            );
            return Ok(result);
        }

        if !batch.is_empty() {
            if let Err(err) = self.import_repo.apply(&batch).await {
                if !matches!(err, AppError::Conflict(_)) {
                    return Err(err);
                }
                // A concurrent writer won an insert race on one of our keys.
                // Re-resolve against the now-current store and retry once;
                // the colliding creations become plain updates.
                warn!("import flush hit a uniqueness conflict, re-resolving batch");
                let (retry_result, retry_batch) = self.stage(&table, &companies, mode).await?;
                self.import_repo.apply(&retry_batch).await?;
                result = retry_result;
                batch = retry_batch;
            }
        }

        info!(
            created = result.created,
            updated = result.updated,
            errors = result.error_rows,
            "attendance import committed"
        );
        self.emit_audit(actor, &result, &batch).await;

        Ok(result)
    }

    /// Validation plus reconciliation for every row, in source order. The
    /// staging pass is identical in both modes so that a dry run reports
    /// exactly the row errors a commit would.
    async fn stage(
        &self,
        table: &CsvTable,
        companies: &CompanyIndex,
        mode: ImportMode,
    ) -> Result<(ImportResult, ImportBatch), AppError> {
        let mut uow = UnitOfWork::new(
            self.employee_repo.clone(),
            self.user_repo.clone(),
            self.attendance_repo.clone(),
        );
        let mut result = ImportResult {
            total_rows: table.len(),
            ..ImportResult::default()
        };

        for index in 0..table.len() {
            let row_number = index + HEADER_ROW_OFFSET;

            let row = match validate_row(table, index, companies) {
                Ok(row) => row,
                Err(err) => {
                    result.error_rows += 1;
                    result.errors.push(RowIssue { row: row_number, message: err.to_string() });
                    continue;
                }
            };

            match reconcile_row(&mut uow, &row).await {
                Ok(outcome) => {
                    result.valid_rows += 1;
                    if mode == ImportMode::Commit {
                        if outcome.created {
                            result.created += 1;
                        } else {
                            result.updated += 1;
                        }
                    }
                }
                Err(ReconcileError::Row(err)) => {
                    result.error_rows += 1;
                    result.errors.push(RowIssue { row: row_number, message: err.to_string() });
                }
                Err(ReconcileError::Store(err)) => return Err(err),
            }
        }

        Ok((result, uow.into_batch()))
    }

    /// Audit is best-effort once the batch is committed; a failing sink must
    /// not turn a persisted import into a reported failure.
    async fn emit_audit(&self, actor: &User, result: &ImportResult, batch: &ImportBatch) {
        let mut events = Vec::with_capacity(1 + batch.new_users.len() + batch.new_employees.len());

        events.push(AuditEvent::new(
            &actor.id,
            AuditAction::Import,
            "AttendanceRecord",
            "batch",
            json!({
                "total_rows": result.total_rows,
                "valid_rows": result.valid_rows,
                "error_rows": result.error_rows,
                "created": result.created,
                "updated": result.updated,
            }),
        ));

        for user in &batch.new_users {
            events.push(AuditEvent::new(
                &actor.id,
                AuditAction::Create,
                "User",
                &user.id,
                json!({
                    "username": {"before": null, "after": user.username},
                    "role": {"before": null, "after": user.role},
                    "company_id": {"before": null, "after": user.company_id},
                }),
            ).with_context("attendance import"));
        }

        for employee in &batch.new_employees {
            events.push(AuditEvent::new(
                &actor.id,
                AuditAction::Create,
                "Employee",
                &employee.id,
                json!({
                    "ep_number": {"before": null, "after": employee.ep_number},
                    "name": {"before": null, "after": employee.name},
                    "company_id": {"before": null, "after": employee.company_id},
                }),
            ).with_context("attendance import"));
        }

        for event in events {
            if let Err(err) = self.audit.record(event).await {
                error!("audit sink rejected import event: {:?}", err);
            }
        }
    }
}
