use axum::{body::Bytes, extract::{Query, State}, http::header, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::ImportQuery;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::user::UserRole;
use crate::domain::services::export_service::template_csv;
use std::sync::Arc;
use crate::error::AppError;

/// Bulk attendance upload. `?mode=validate` (the default) is a pure dry run;
/// `?mode=commit` persists the batch atomically. Either way the response is
/// the full per-row report.
pub async fn upload_attendance(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ImportQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    match auth.role {
        UserRole::Master => {}
        UserRole::Root | UserRole::Supervisor | UserRole::Employee => {
            return Err(AppError::Forbidden("Only master can import attendance".into()));
        }
    }

    let actor = state.user_repo.find_by_id(&auth.user_id).await?
        .ok_or(AppError::Unauthorized)?;

    let result = state
        .import_service
        .import_attendance(&body, query.mode, &actor)
        .await?;

    Ok(Json(result))
}

pub async fn download_template(
    _auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"attendance_template.csv\"".to_string(),
            ),
        ],
        template_csv(),
    ))
}
