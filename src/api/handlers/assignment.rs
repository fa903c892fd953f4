use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use crate::state::AppState;
use crate::api::dtos::requests::CreateAssignmentRequest;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::user::UserRole;
use std::sync::Arc;
use crate::error::AppError;

pub async fn create_assignment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<CreateAssignmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let company_id = match auth.role {
        UserRole::Root => auth
            .company_id
            .clone()
            .ok_or_else(|| AppError::Forbidden("Root user has no company".into()))?,
        UserRole::Master | UserRole::Supervisor | UserRole::Employee => {
            return Err(AppError::Forbidden("Only root can create assignments".into()));
        }
    };

    let employee = state.employee_repo.find_by_id(&payload.employee_id).await?
        .ok_or_else(|| AppError::NotFound("Employee not found".into()))?;
    if employee.company_id != company_id {
        return Err(AppError::Forbidden("Employee belongs to another company".into()));
    }

    let supervisor = state.supervisor_repo.find_by_id(&payload.supervisor_id).await?
        .ok_or_else(|| AppError::NotFound("Supervisor not found".into()))?;
    if supervisor.company_id != company_id {
        return Err(AppError::Forbidden("Supervisor belongs to another company".into()));
    }

    let actor = state.user_repo.find_by_id(&auth.user_id).await?
        .ok_or(AppError::Unauthorized)?;

    let created = state
        .assignment_service
        .create(
            &employee.id,
            &supervisor.id,
            payload.start_date,
            payload.end_date,
            &actor,
        )
        .await?;

    Ok(Json(created))
}

pub async fn list_assignments(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let company_id = match auth.role {
        UserRole::Root => auth
            .company_id
            .clone()
            .ok_or_else(|| AppError::Forbidden("Root user has no company".into()))?,
        UserRole::Master | UserRole::Supervisor | UserRole::Employee => {
            return Err(AppError::Forbidden("Only root can list assignments".into()));
        }
    };

    let assignments = state
        .assignment_repo
        .list_current_by_company(&company_id, Utc::now().date_naive())
        .await?;

    Ok(Json(assignments))
}
