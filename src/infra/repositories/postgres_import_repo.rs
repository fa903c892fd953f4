use crate::domain::{models::import::ImportBatch, ports::ImportRepository};
use crate::error::{is_unique_violation, AppError};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

pub struct PostgresImportRepo {
    pool: PgPool,
}

impl PostgresImportRepo {
    pub fn new(pool: PgPool) -> Self {
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
impl ImportRepository for PostgresImportRepo {
    async fn apply(&self, batch: &ImportBatch) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Users before employees; employees carry the user_id foreign key.
        for user in &batch.new_users {
            sqlx::query(
                "INSERT INTO users (id, username, password_hash, role, company_id, ep_number, is_active, must_change_password, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
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
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
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
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22)",
            )
                .bind(&record.id)
                .bind(&record.employee_id)
                .bind(&record.company_id)
                .bind(record.date)
                .bind(record.in1)
                .bind(record.out1)
                .bind(record.in2)
                .bind(record.out2)
                .bind(record.in3)
                .bind(record.out3)
                .bind(record.hours_worked)
                .bind(record.overtime)
                .bind(record.status.as_str())
                .bind(&record.plant)
                .bind(&record.department)
                .bind(&record.trade)
                .bind(&record.skill)
                .bind(&record.last_edit_by_id)
                .bind(record.last_edit_at)
                .bind(record.remarks_count as i32)
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
                 in1 = $1, out1 = $2, in2 = $3, out2 = $4, in3 = $5, out3 = $6, \
                 hours_worked = $7, overtime = $8, status = $9, \
                 plant = $10, department = $11, trade = $12, skill = $13 \
                 WHERE id = $14",
            )
                .bind(record.in1)
                .bind(record.out1)
                .bind(record.in2)
                .bind(record.out2)
                .bind(record.in3)
                .bind(record.out3)
                .bind(record.hours_worked)
                .bind(record.overtime)
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
