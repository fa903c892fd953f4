use attendance_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::audit::AuditEvent,
    domain::models::user::{User, UserRole},
    domain::ports::AuditSink,
    domain::services::assignment_service::AssignmentService,
    domain::services::auth_service::{hash_password, AuthService},
    domain::services::export_service::ExportService,
    domain::services::import_service::ImportService,
    error::AppError,
    infra::repositories::{
        sqlite_assignment_repo::SqliteAssignmentRepo,
        sqlite_attendance_repo::SqliteAttendanceRepo,
        sqlite_auth_repo::SqliteAuthRepo,
        sqlite_company_repo::SqliteCompanyRepo,
        sqlite_employee_repo::SqliteEmployeeRepo,
        sqlite_import_repo::SqliteImportRepo,
        sqlite_supervisor_repo::SqliteSupervisorRepo,
        sqlite_user_repo::SqliteUserRepo,
    },
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use async_trait::async_trait;
use tower::ServiceExt;
use serde_json::Value;

/// Captures audit events so tests can assert on what the core emitted.
#[derive(Default)]
pub struct RecordingAuditSink {
    pub events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), AppError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

pub struct AuthHeaders {
    pub access_token: String,
    pub csrf_token: String,
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub audit: Arc<RecordingAuditSink>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret_key: priv_key_pem.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            master_password: "master123".to_string(),
        };

        let company_repo = Arc::new(SqliteCompanyRepo::new(pool.clone()));
        let user_repo = Arc::new(SqliteUserRepo::new(pool.clone()));
        let employee_repo = Arc::new(SqliteEmployeeRepo::new(pool.clone()));
        let supervisor_repo = Arc::new(SqliteSupervisorRepo::new(pool.clone()));
        let assignment_repo = Arc::new(SqliteAssignmentRepo::new(pool.clone()));
        let attendance_repo = Arc::new(SqliteAttendanceRepo::new(pool.clone()));
        let import_repo = Arc::new(SqliteImportRepo::new(pool.clone()));
        let auth_repo = Arc::new(SqliteAuthRepo::new(pool.clone()));

        let audit = Arc::new(RecordingAuditSink::default());
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

        let state = Arc::new(AppState {
            config: config.clone(),
            company_repo,
            user_repo,
            employee_repo,
            supervisor_repo,
            assignment_repo,
            attendance_repo,
            import_repo,
            auth_repo,
            audit: audit.clone(),
            auth_service,
            import_service,
            export_service,
            assignment_service,
        });

        let master = User {
            must_change_password: false,
            ..User::new(
                "master".to_string(),
                hash_password("master123").unwrap(),
                UserRole::Master,
                None,
            )
        };
        state.user_repo.create(&master).await.expect("Failed to seed master user");

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            audit,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> AuthHeaders {
        let payload = serde_json::json!({
            "username": username,
            "password": password
        });

        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap()
        ).await.unwrap();

        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }

        let cookies: Vec<String> = response.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|h| h.to_str().unwrap().to_string())
            .collect();

        let access_token_cookie = cookies.iter()
            .find(|c| c.contains("access_token="))
            .expect("No access_token cookie returned");

        let start = access_token_cookie.find("access_token=").unwrap() + 13;
        let end = access_token_cookie[start..].find(';').unwrap_or(access_token_cookie.len() - start);
        let access_token = access_token_cookie[start..start + end].to_string();

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body_json: Value = serde_json::from_slice(&body_bytes).unwrap();
        let csrf_token = body_json["csrf_token"].as_str().expect("No csrf_token in body").to_string();

        AuthHeaders {
            access_token,
            csrf_token,
        }
    }

    pub async fn post_json(&self, uri: &str, auth: &AuthHeaders, payload: &Value) -> axum::response::Response {
        self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .header("X-CSRF-Token", &auth.csrf_token)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap()
        ).await.unwrap()
    }

    pub async fn post_csv(&self, uri: &str, auth: &AuthHeaders, csv: &str) -> axum::response::Response {
        self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .header("X-CSRF-Token", &auth.csrf_token)
                .header(header::CONTENT_TYPE, "text/csv")
                .body(Body::from(csv.to_string()))
                .unwrap()
        ).await.unwrap()
    }

    pub async fn get(&self, uri: &str, auth: &AuthHeaders) -> axum::response::Response {
        self.router.clone().oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .body(Body::empty())
                .unwrap()
        ).await.unwrap()
    }

    /// Creates a company through the API as master and returns its id.
    pub async fn create_company(&self, master: &AuthHeaders, name: &str) -> String {
        let response = self
            .post_json("/api/v1/companies", master, &serde_json::json!({"name": name}))
            .await;
        assert!(response.status().is_success(), "create_company failed: {}", response.status());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        json["id"].as_str().unwrap().to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
