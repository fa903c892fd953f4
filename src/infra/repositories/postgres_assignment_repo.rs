use crate::domain::{models::assignment::Assignment, ports::AssignmentRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};

pub struct PostgresAssignmentRepo {
    pool: PgPool,
}

impl PostgresAssignmentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentRepository for PostgresAssignmentRepo {
    async fn create(&self, assignment: &Assignment) -> Result<Assignment, AppError> {
        sqlx::query_as::<_, Assignment>(
            "INSERT INTO assignments (id, employee_id, supervisor_id, start_date, end_date, created_by_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
            .bind(&assignment.id)
            .bind(&assignment.employee_id)
            .bind(&assignment.supervisor_id)
            .bind(assignment.start_date)
            .bind(assignment.end_date)
            .bind(&assignment.created_by_id)
            .bind(assignment.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn exists_overlapping(
        &self,
        employee_id: &str,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "SELECT COUNT(*) as count FROM assignments \
             WHERE employee_id = $1 \
               AND (end_date IS NULL OR end_date >= $2) \
               AND ($3::date IS NULL OR start_date <= $3::date)",
        )
            .bind(employee_id)
            .bind(start_date)
            .bind(end_date)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.get::<i64, _>("count") > 0)
    }

    async fn list_current_by_company(
        &self,
        company_id: &str,
        on: NaiveDate,
    ) -> Result<Vec<Assignment>, AppError> {
        sqlx::query_as::<_, Assignment>(
            "SELECT a.* FROM assignments a \
             JOIN employees e ON e.id = a.employee_id \
             WHERE e.company_id = $1 AND (a.end_date IS NULL OR a.end_date >= $2) \
             ORDER BY a.start_date ASC",
        )
            .bind(company_id)
            .bind(on)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_covering(
        &self,
        employee_id: &str,
        supervisor_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Assignment>, AppError> {
        sqlx::query_as::<_, Assignment>(
            "SELECT * FROM assignments \
             WHERE employee_id = $1 AND supervisor_id = $2 \
               AND start_date <= $3 AND (end_date IS NULL OR end_date >= $3)",
        )
            .bind(employee_id)
            .bind(supervisor_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
