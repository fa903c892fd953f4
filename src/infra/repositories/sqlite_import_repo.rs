use crate::domain::{models::import::ImportBatch, ports::ImportRepository};
use crate::error::{is_unique_violation, AppError};
use crate::infra::repositories::sqlite_attendance_repo::punch_to_text;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

pub struct SqliteImportRepo {
    pool: SqlitePool,
}

impl SqliteImportRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_flush_err(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict("a concurrent import already created one of these rows".to_string())
    } else {
        AppError::Database(err)
    }
}

#[async_trait]
impl ImportRepository for SqliteImportRepo {
    async fn apply(&self, batch: &ImportBatch) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Users before employees; employees carry the user_id foreign key.
        for user in &batch.new_users {
            sqlx::query(
                "INSERT INTO users (id, username, password_hash, role, company_id, ep_number, is_active, must_change_password, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
                .bind(&user.id)
                .bind(&user.username)
                .bind(&user.password_hash)
                .bind(user.role.as_str())
                .bind(&user.company_id)
                .bind(&user.ep_number)
                .bind(user.is_active)
                .bind(user.must_change_password)
                .bind(user.created_at)
                .execute(&mut *tx)
                .await
                .map_err(map_flush_err)?;
        }

        for employee in &batch.new_employees {
            sqlx::query(
                "INSERT INTO employees (id, company_id, ep_number, name, plant, department, trade, skill, user_id, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
                .bind(&employee.id)
                .bind(&employee.company_id)
                .bind(&employee.ep_number)
                .bind(&employee.name)
                .bind(&employee.plant)
                .bind(&employee.department)
                .bind(&employee.trade)
                .bind(&employee.skill)
                .bind(&employee.user_id)
                .bind(employee.created_at)
                .execute(&mut *tx)
                .await
                .map_err(map_flush_err)?;
        }

        for record in &batch.created_records {
            sqlx::query(
                "INSERT INTO attendance_records \
                 (id, employee_id, company_id, date, in1, out1, in2, out2, in3, out3, \
                  hours_worked, overtime, status, plant, department, trade, skill, \
                  last_edit_by_id, last_edit_at, remarks_count, soft_deleted, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
                .bind(&record.id)
                .bind(&record.employee_id)
                .bind(&record.company_id)
                .bind(record.date)
                .bind(punch_to_text(record.in1))
                .bind(punch_to_text(record.out1))
                .bind(punch_to_text(record.in2))
                .bind(punch_to_text(record.out2))
                .bind(punch_to_text(record.in3))
                .bind(punch_to_text(record.out3))
                .bind(record.hours_worked.to_string())
                .bind(record.overtime.to_string())
                .bind(record.status.as_str())
                .bind(&record.plant)
                .bind(&record.department)
                .bind(&record.trade)
                .bind(&record.skill)
                .bind(&record.last_edit_by_id)
                .bind(record.last_edit_at)
                .bind(record.remarks_count)
                .bind(record.soft_deleted)
                .bind(record.created_at)
                .execute(&mut *tx)
                .await
                .map_err(map_flush_err)?;
        }

        // Only the fields the import owns; edit tracking and remark counts
        // are left to their own writers.
        for record in &batch.updated_records {
            sqlx::query(
                "UPDATE attendance_records SET \
                 in1 = ?, out1 = ?, in2 = ?, out2 = ?, in3 = ?, out3 = ?, \
                 hours_worked = ?, overtime = ?, status = ?, \
                 plant = ?, department = ?, trade = ?, skill = ? \
                 WHERE id = ?",
            )
                .bind(punch_to_text(record.in1))
                .bind(punch_to_text(record.out1))
                .bind(punch_to_text(record.in2))
                .bind(punch_to_text(record.out2))
                .bind(punch_to_text(record.in3))
                .bind(punch_to_text(record.out3))
                .bind(record.hours_worked.to_string())
                .bind(record.overtime.to_string())
                .bind(record.status.as_str())
                .bind(&record.plant)
                .bind(&record.department)
                .bind(&record.trade)
                .bind(&record.skill)
                .bind(&record.id)
                .execute(&mut *tx)
                .await
                .map_err(map_flush_err)?;
        }

        tx.commit().await.map_err(map_flush_err)?;

        debug!(
            users = batch.new_users.len(),
            employees = batch.new_employees.len(),
            created = batch.created_records.len(),
            updated = batch.updated_records.len(),
            "import batch flushed"
        );
        Ok(())
    }
}
