use std::sync::Arc;
use crate::domain::ports::{
    AssignmentRepository, AttendanceRepository, AuditSink, AuthRepository,
    CompanyRepository, EmployeeRepository, ImportRepository,
    SupervisorProfileRepository, UserRepository,
};
use crate::domain::services::assignment_service::AssignmentService;
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::export_service::ExportService;
use crate::domain::services::import_service::ImportService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub company_repo: Arc<dyn CompanyRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub employee_repo: Arc<dyn EmployeeRepository>,
    pub supervisor_repo: Arc<dyn SupervisorProfileRepository>,
    pub assignment_repo: Arc<dyn AssignmentRepository>,
    pub attendance_repo: Arc<dyn AttendanceRepository>,
    pub import_repo: Arc<dyn ImportRepository>,
    pub auth_repo: Arc<dyn AuthRepository>,
    pub audit: Arc<dyn AuditSink>,
    pub auth_service: Arc<AuthService>,
    pub import_service: Arc<ImportService>,
    pub export_service: Arc<ExportService>,
    pub assignment_service: Arc<AssignmentService>,
}
