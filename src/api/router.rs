use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{
    assignment, attendance, auth, company, export, health, import, supervisor, user,
};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/change-password", post(auth::change_password))
        .route("/api/v1/auth/reset-password/{user_id}", post(auth::reset_password))

        // Companies (MASTER)
        .route("/api/v1/companies", post(company::create_company).get(company::list_companies))
        .route("/api/v1/companies/{company_id}/users", get(user::list_company_users))

        // User provisioning
        .route("/api/v1/users/root", post(user::create_root_user))
        .route("/api/v1/supervisors", post(supervisor::create_supervisor))

        // Assignments (ROOT)
        .route("/api/v1/assignments", post(assignment::create_assignment).get(assignment::list_assignments))

        // Attendance
        .route("/api/v1/attendance/records", get(attendance::list_records))
        .route("/api/v1/attendance/records/{attendance_id}/remarks",
               post(attendance::add_remark).get(attendance::list_remarks))

        // Import / export pipeline
        .route("/api/v1/attendance/import", post(import::upload_attendance))
        .route("/api/v1/attendance/template", get(import::download_template))
        .route("/api/v1/attendance/export", get(export::export_attendance))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
