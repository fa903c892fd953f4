pub mod sqlite_assignment_repo;
pub mod sqlite_attendance_repo;
pub mod sqlite_auth_repo;
pub mod sqlite_company_repo;
pub mod sqlite_employee_repo;
pub mod sqlite_import_repo;
pub mod sqlite_supervisor_repo;
pub mod sqlite_user_repo;

pub mod postgres_assignment_repo;
pub mod postgres_attendance_repo;
pub mod postgres_auth_repo;
pub mod postgres_company_repo;
pub mod postgres_employee_repo;
pub mod postgres_import_repo;
pub mod postgres_supervisor_repo;
pub mod postgres_user_repo;
