use axum::{extract::State, http::header, response::IntoResponse};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use std::sync::Arc;
use crate::error::AppError;

/// Role-scoped CSV download; the columns mirror the import schema so the
/// file can be re-imported unchanged.
pub async fn export_attendance(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_id(&auth.user_id).await?
        .ok_or(AppError::Unauthorized)?;

    let (bytes, filename) = state.export_service.export_attendance(&user).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}
