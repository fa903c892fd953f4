use crate::domain::models::{
    assignment::Assignment,
    attendance::{AttendanceRecord, ExportRow, ExportScope, Remark},
    audit::AuditEvent,
    auth::RefreshTokenRecord,
    company::Company,
    employee::Employee,
    import::ImportBatch,
    user::{SupervisorProfile, User},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn create(&self, company: &Company) -> Result<Company, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Company>, AppError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Company>, AppError>;
    async fn list(&self) -> Result<Vec<Company>, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn list_by_company(&self, company_id: &str) -> Result<Vec<User>, AppError>;
    async fn update_password(
        &self,
        id: &str,
        password_hash: &str,
        must_change_password: bool,
    ) -> Result<(), AppError>;
}

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Employee>, AppError>;
    async fn find_by_key(&self, company_id: &str, ep_number: &str) -> Result<Option<Employee>, AppError>;
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<Employee>, AppError>;
    async fn list_by_company(&self, company_id: &str) -> Result<Vec<Employee>, AppError>;
}

#[async_trait]
pub trait SupervisorProfileRepository: Send + Sync {
    async fn create(&self, profile: &SupervisorProfile) -> Result<SupervisorProfile, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<SupervisorProfile>, AppError>;
    async fn find_by_user_id(&self, user_id: &str) -> Result<Option<SupervisorProfile>, AppError>;
}

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    async fn create(&self, assignment: &Assignment) -> Result<Assignment, AppError>;
    /// Any assignment for this employee whose interval intersects
    /// `[start_date, end_date-or-infinity)`.
    async fn exists_overlapping(
        &self,
        employee_id: &str,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Result<bool, AppError>;
    async fn list_current_by_company(
        &self,
        company_id: &str,
        on: NaiveDate,
    ) -> Result<Vec<Assignment>, AppError>;
    async fn find_covering(
        &self,
        employee_id: &str,
        supervisor_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Assignment>, AppError>;
}

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<AttendanceRecord>, AppError>;
    async fn find_by_key(&self, employee_id: &str, date: NaiveDate) -> Result<Option<AttendanceRecord>, AppError>;
    async fn list_by_employee(&self, employee_id: &str) -> Result<Vec<AttendanceRecord>, AppError>;
    async fn export_rows(&self, scope: &ExportScope) -> Result<Vec<ExportRow>, AppError>;
    /// Inserts the remark and bumps `remarks_count` in one transaction.
    async fn add_remark(&self, remark: &Remark) -> Result<Remark, AppError>;
    async fn list_remarks(&self, attendance_id: &str) -> Result<Vec<Remark>, AppError>;
}

#[async_trait]
pub trait ImportRepository: Send + Sync {
    /// Flushes a staged import batch atomically: either every row in the
    /// batch lands or none does. Uniqueness races with a concurrent writer
    /// surface as `AppError::Conflict`.
    async fn apply(&self, batch: &ImportBatch) -> Result<(), AppError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AppError>;
    async fn delete_refresh_token(&self, token_hash: &str) -> Result<(), AppError>;
    async fn delete_refresh_family(&self, family_id: Uuid) -> Result<(), AppError>;
}

/// Audit storage is the caller's concern; the core only emits.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<(), AppError>;
}
