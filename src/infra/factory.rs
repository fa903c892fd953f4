use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::models::user::{User, UserRole};
use crate::domain::ports::{
    AssignmentRepository, AttendanceRepository, AuditSink, AuthRepository, CompanyRepository,
    EmployeeRepository, ImportRepository, SupervisorProfileRepository, UserRepository,
};
use crate::domain::services::assignment_service::AssignmentService;
use crate::domain::services::auth_service::{hash_password, AuthService};
use crate::domain::services::export_service::ExportService;
use crate::domain::services::import_service::ImportService;
use crate::infra::audit::TracingAuditSink;
use crate::infra::repositories::{
    postgres_assignment_repo::PostgresAssignmentRepo, postgres_attendance_repo::PostgresAttendanceRepo,
    postgres_auth_repo::PostgresAuthRepo, postgres_company_repo::PostgresCompanyRepo,
    postgres_employee_repo::PostgresEmployeeRepo, postgres_import_repo::PostgresImportRepo,
    postgres_supervisor_repo::PostgresSupervisorRepo, postgres_user_repo::PostgresUserRepo,
    sqlite_assignment_repo::SqliteAssignmentRepo, sqlite_attendance_repo::SqliteAttendanceRepo,
    sqlite_auth_repo::SqliteAuthRepo, sqlite_company_repo::SqliteCompanyRepo,
    sqlite_employee_repo::SqliteEmployeeRepo, sqlite_import_repo::SqliteImportRepo,
    sqlite_supervisor_repo::SqliteSupervisorRepo, sqlite_user_repo::SqliteUserRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let state = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        assemble_state(
            config,
            Arc::new(PostgresCompanyRepo::new(pool.clone())),
            Arc::new(PostgresUserRepo::new(pool.clone())),
            Arc::new(PostgresEmployeeRepo::new(pool.clone())),
            Arc::new(PostgresSupervisorRepo::new(pool.clone())),
            Arc::new(PostgresAssignmentRepo::new(pool.clone())),
            Arc::new(PostgresAttendanceRepo::new(pool.clone())),
            Arc::new(PostgresImportRepo::new(pool.clone())),
            Arc::new(PostgresAuthRepo::new(pool.clone())),
        )
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        assemble_state(
            config,
            Arc::new(SqliteCompanyRepo::new(pool.clone())),
            Arc::new(SqliteUserRepo::new(pool.clone())),
            Arc::new(SqliteEmployeeRepo::new(pool.clone())),
            Arc::new(SqliteSupervisorRepo::new(pool.clone())),
            Arc::new(SqliteAssignmentRepo::new(pool.clone())),
            Arc::new(SqliteAttendanceRepo::new(pool.clone())),
            Arc::new(SqliteImportRepo::new(pool.clone())),
            Arc::new(SqliteAuthRepo::new(pool.clone())),
        )
    };

    seed_master_user(&state).await;
    state
}

#[allow(clippy::too_many_arguments)]
fn assemble_state(
    config: &Config,
    company_repo: Arc<dyn CompanyRepository>,
    user_repo: Arc<dyn UserRepository>,
    employee_repo: Arc<dyn EmployeeRepository>,
    supervisor_repo: Arc<dyn SupervisorProfileRepository>,
    assignment_repo: Arc<dyn AssignmentRepository>,
    attendance_repo: Arc<dyn AttendanceRepository>,
    import_repo: Arc<dyn ImportRepository>,
    auth_repo: Arc<dyn AuthRepository>,
) -> AppState {
    let audit: Arc<dyn AuditSink> = Arc::new(TracingAuditSink);
    let auth_service = Arc::new(AuthService::new(auth_repo.clone(), config.clone()));
    let import_service = Arc::new(ImportService::new(
        company_repo.clone(),
        employee_repo.clone(),
        user_repo.clone(),
        attendance_repo.clone(),
        import_repo.clone(),
        audit.clone(),
    ));
    let export_service = Arc::new(ExportService::new(
        attendance_repo.clone(),
        employee_repo.clone(),
        supervisor_repo.clone(),
    ));
    let assignment_service = Arc::new(AssignmentService::new(
        assignment_repo.clone(),
        audit.clone(),
    ));

    AppState {
        config: config.clone(),
        company_repo,
        user_repo,
        employee_repo,
        supervisor_repo,
        assignment_repo,
        attendance_repo,
        import_repo,
        auth_repo,
        audit,
        auth_service,
        import_service,
        export_service,
        assignment_service,
    }
}

/// The system is unusable without a MASTER account; create one on first boot.
async fn seed_master_user(state: &AppState) {
    let existing = state
        .user_repo
        .find_by_username("master")
        .await
        .expect("Failed to query master user");
    if existing.is_some() {
        return;
    }

    let password_hash = hash_password(&state.config.master_password)
        .expect("Failed to hash master password");
    let mut master = User::new("master".to_string(), password_hash, UserRole::Master, None);
    master.must_change_password = false;

    state
        .user_repo
        .create(&master)
        .await
        .expect("Failed to seed master user");
    info!("Created default master user (username: master)");
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
