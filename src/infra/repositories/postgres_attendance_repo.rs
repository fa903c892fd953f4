use crate::domain::models::attendance::{
    AttendanceRecord, AttendanceStatus, ExportRow, ExportScope, Remark,
};
use crate::domain::ports::AttendanceRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::str::FromStr;

/// Postgres keeps punches as TIME and decimals as NUMERIC; only the status
/// tag needs mapping by hand.
pub struct PostgresAttendanceRepo {
    pool: PgPool,
}

impl PostgresAttendanceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn status_from_text(text: String) -> Result<AttendanceStatus, AppError> {
    AttendanceStatus::from_str(&text)
        .map_err(|_| AppError::InternalWithMsg(format!("corrupt status value: {text}")))
}

fn map_record(row: &PgRow) -> Result<AttendanceRecord, AppError> {
    Ok(AttendanceRecord {
        id: row.try_get("id").map_err(AppError::Database)?,
        employee_id: row.try_get("employee_id").map_err(AppError::Database)?,
        company_id: row.try_get("company_id").map_err(AppError::Database)?,
        date: row.try_get("date").map_err(AppError::Database)?,
        in1: row.try_get("in1").map_err(AppError::Database)?,
        out1: row.try_get("out1").map_err(AppError::Database)?,
        in2: row.try_get("in2").map_err(AppError::Database)?,
        out2: row.try_get("out2").map_err(AppError::Database)?,
        in3: row.try_get("in3").map_err(AppError::Database)?,
        out3: row.try_get("out3").map_err(AppError::Database)?,
        hours_worked: row.try_get("hours_worked").map_err(AppError::Database)?,
        overtime: row.try_get("overtime").map_err(AppError::Database)?,
        status: status_from_text(row.try_get("status").map_err(AppError::Database)?)?,
        plant: row.try_get("plant").map_err(AppError::Database)?,
        department: row.try_get("department").map_err(AppError::Database)?,
        trade: row.try_get("trade").map_err(AppError::Database)?,
        skill: row.try_get("skill").map_err(AppError::Database)?,
        last_edit_by_id: row.try_get("last_edit_by_id").map_err(AppError::Database)?,
        last_edit_at: row.try_get("last_edit_at").map_err(AppError::Database)?,
        remarks_count: row
            .try_get::<i32, _>("remarks_count")
            .map_err(AppError::Database)? as i64,
        soft_deleted: row.try_get("soft_deleted").map_err(AppError::Database)?,
        created_at: row.try_get("created_at").map_err(AppError::Database)?,
    })
}

fn map_export_row(row: &PgRow) -> Result<ExportRow, AppError> {
    Ok(ExportRow {
        ep_number: row.try_get("ep_number").map_err(AppError::Database)?,
        employee_name: row.try_get("employee_name").map_err(AppError::Database)?,
        company_name: row.try_get("company_name").map_err(AppError::Database)?,
        plant: row.try_get("plant").map_err(AppError::Database)?,
        department: row.try_get("department").map_err(AppError::Database)?,
        trade: row.try_get("trade").map_err(AppError::Database)?,
        skill: row.try_get("skill").map_err(AppError::Database)?,
        date: row.try_get("date").map_err(AppError::Database)?,
        in1: row.try_get("in1").map_err(AppError::Database)?,
        out1: row.try_get("out1").map_err(AppError::Database)?,
        in2: row.try_get("in2").map_err(AppError::Database)?,
        out2: row.try_get("out2").map_err(AppError::Database)?,
        in3: row.try_get("in3").map_err(AppError::Database)?,
        out3: row.try_get("out3").map_err(AppError::Database)?,
        hours_worked: row.try_get("hours_worked").map_err(AppError::Database)?,
        overtime: row.try_get("overtime").map_err(AppError::Database)?,
        status: status_from_text(row.try_get("status").map_err(AppError::Database)?)?,
    })
}

const EXPORT_SELECT: &str = "SELECT e.ep_number, e.name AS employee_name, c.name AS company_name, \
    a.plant, a.department, a.trade, a.skill, a.date, \
    a.in1, a.out1, a.in2, a.out2, a.in3, a.out3, \
    a.hours_worked, a.overtime, a.status \
    FROM attendance_records a \
    JOIN employees e ON e.id = a.employee_id \
    JOIN companies c ON c.id = a.company_id";

const EXPORT_ORDER: &str = " ORDER BY a.date ASC, e.ep_number ASC";

#[async_trait]
impl AttendanceRepository for PostgresAttendanceRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<AttendanceRecord>, AppError> {
        let row = sqlx::query("SELECT * FROM attendance_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;
        row.as_ref().map(map_record).transpose()
    }

    async fn find_by_key(&self, employee_id: &str, date: NaiveDate) -> Result<Option<AttendanceRecord>, AppError> {
        let row = sqlx::query("SELECT * FROM attendance_records WHERE employee_id = $1 AND date = $2")
            .bind(employee_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;
        row.as_ref().map(map_record).transpose()
    }

    async fn list_by_employee(&self, employee_id: &str) -> Result<Vec<AttendanceRecord>, AppError> {
        let rows = sqlx::query(
            "SELECT * FROM attendance_records WHERE employee_id = $1 ORDER BY date DESC",
        )
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;
        rows.iter().map(map_record).collect()
    }

    async fn export_rows(&self, scope: &ExportScope) -> Result<Vec<ExportRow>, AppError> {
        let rows = match scope {
            ExportScope::All => {
                sqlx::query(&format!("{EXPORT_SELECT}{EXPORT_ORDER}"))
                    .fetch_all(&self.pool)
                    .await
            }
            ExportScope::Company(company_id) => {
                sqlx::query(&format!("{EXPORT_SELECT} WHERE a.company_id = $1{EXPORT_ORDER}"))
                    .bind(company_id)
                    .fetch_all(&self.pool)
                    .await
            }
            ExportScope::Supervisor { profile_id, on } => {
                sqlx::query(&format!(
                    "{EXPORT_SELECT} WHERE a.employee_id IN (\
                       SELECT s.employee_id FROM assignments s \
                       WHERE s.supervisor_id = $1 AND (s.end_date IS NULL OR s.end_date >= $2)\
                     ){EXPORT_ORDER}"
                ))
                    .bind(profile_id)
                    .bind(*on)
                    .fetch_all(&self.pool)
                    .await
            }
            ExportScope::Employee(employee_id) => {
                sqlx::query(&format!("{EXPORT_SELECT} WHERE a.employee_id = $1{EXPORT_ORDER}"))
                    .bind(employee_id)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(AppError::Database)?;

        rows.iter().map(map_export_row).collect()
    }

    async fn add_remark(&self, remark: &Remark) -> Result<Remark, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let created = sqlx::query_as::<_, Remark>(
            "INSERT INTO remarks (id, attendance_id, author_id, text, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
            .bind(&remark.id)
            .bind(&remark.attendance_id)
            .bind(&remark.author_id)
            .bind(&remark.text)
            .bind(remark.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        sqlx::query("UPDATE attendance_records SET remarks_count = remarks_count + 1 WHERE id = $1")
            .bind(&remark.attendance_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn list_remarks(&self, attendance_id: &str) -> Result<Vec<Remark>, AppError> {
        sqlx::query_as::<_, Remark>(
            "SELECT * FROM remarks WHERE attendance_id = $1 ORDER BY created_at ASC",
        )
            .bind(attendance_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
