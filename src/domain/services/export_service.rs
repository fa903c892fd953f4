use std::sync::Arc;
use chrono::Utc;
use tracing::info;

use crate::domain::models::attendance::{ExportRow, ExportScope};
use crate::domain::models::user::{User, UserRole};
use crate::domain::ports::{AttendanceRepository, EmployeeRepository, SupervisorProfileRepository};
use crate::domain::services::validation::{DATE_FORMAT, EXPECTED_COLUMNS, TIME_FORMAT};
use crate::error::AppError;

/// Role-scoped CSV export; the inverse of the import schema. A file produced
/// here is accepted unchanged by a commit-mode import.
pub struct ExportService {
    attendance_repo: Arc<dyn AttendanceRepository>,
    employee_repo: Arc<dyn EmployeeRepository>,
    supervisor_repo: Arc<dyn SupervisorProfileRepository>,
}

impl ExportService {
    pub fn new(
        attendance_repo: Arc<dyn AttendanceRepository>,
        employee_repo: Arc<dyn EmployeeRepository>,
        supervisor_repo: Arc<dyn SupervisorProfileRepository>,
    ) -> Self {
        Self {
            attendance_repo,
            employee_repo,
            supervisor_repo,
        }
    }

    pub async fn export_attendance(&self, user: &User) -> Result<(Vec<u8>, String), AppError> {
        let rows = match self.scope_for(user).await? {
            Some(scope) => self.attendance_repo.export_rows(&scope).await?,
            // A supervisor without a profile or an employee without a record
            // sees an empty sheet, not someone else's data.
            None => Vec::new(),
        };

        info!(user = %user.username, rows = rows.len(), "attendance export");

        let bytes = render_csv(&rows)?;
        let filename = format!("attendance_export_{}.csv", Utc::now().format("%Y%m%d"));
        Ok((bytes, filename))
    }

    async fn scope_for(&self, user: &User) -> Result<Option<ExportScope>, AppError> {
        match user.role {
            UserRole::Master => Ok(Some(ExportScope::All)),
            UserRole::Root => Ok(user.company_id.clone().map(ExportScope::Company)),
            UserRole::Supervisor => {
                let profile = self.supervisor_repo.find_by_user_id(&user.id).await?;
                Ok(profile.map(|p| ExportScope::Supervisor {
                    profile_id: p.id,
                    on: Utc::now().date_naive(),
                }))
            }
            UserRole::Employee => {
                let employee = self.employee_repo.find_by_user_id(&user.id).await?;
                Ok(employee.map(|e| ExportScope::Employee(e.id)))
            }
        }
    }
}

fn render_csv(rows: &[ExportRow]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(EXPECTED_COLUMNS)
        .map_err(|e| AppError::InternalWithMsg(e.to_string()))?;

    for row in rows {
        writer
            .write_record([
                row.ep_number.as_str(),
                row.employee_name.as_str(),
                row.company_name.as_str(),
                row.plant.as_str(),
                row.department.as_str(),
                row.trade.as_str(),
                row.skill.as_str(),
                &row.date.format(DATE_FORMAT).to_string(),
                &format_punch(row.in1),
                &format_punch(row.out1),
                &format_punch(row.in2),
                &format_punch(row.out2),
                &format_punch(row.in3),
                &format_punch(row.out3),
                &format!("{:.2}", row.hours_worked),
                &format!("{:.2}", row.overtime),
                row.status.as_str(),
            ])
            .map_err(|e| AppError::InternalWithMsg(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::InternalWithMsg(e.to_string()))
}

fn format_punch(value: Option<chrono::NaiveTime>) -> String {
    value.map(|t| t.format(TIME_FORMAT).to_string()).unwrap_or_default()
}

/// The import template offered for download: the column schema plus two
/// sample rows.
pub fn template_csv() -> Vec<u8> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPECTED_COLUMNS).expect("static template header");
    writer
        .write_record([
            "EP001", "John Doe", "Company A", "Plant1", "Assembly", "Welder", "Skilled",
            "22-08-2025", "09:00", "13:00", "14:00", "18:00", "", "", "8.00", "1.00", "P",
        ])
        .expect("static template row");
    writer
        .write_record([
            "EP002", "Jane Smith", "Company A", "Plant1", "Assembly", "Fitter", "Semi",
            "22-08-2025", "09:00", "13:00", "14:00", "18:00", "", "", "8.00", "0.00", "P",
        ])
        .expect("static template row");
    writer.into_inner().expect("in-memory template buffer")
}
