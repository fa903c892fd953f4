use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::CreateSupervisorRequest;
use crate::api::dtos::responses::CreatedUserResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::audit::{AuditAction, AuditEvent};
use crate::domain::models::user::{SupervisorProfile, User, UserRole};
use crate::domain::services::auth_service::hash_password;
use std::sync::Arc;
use crate::error::AppError;
use serde_json::json;
use tracing::{error, info};

/// ROOT promotes one of its company's employees to supervisor: a new user
/// account (initial password = EP number) plus the 1:1 profile.
pub async fn create_supervisor(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<CreateSupervisorRequest>,
) -> Result<impl IntoResponse, AppError> {
    let company_id = match auth.role {
        UserRole::Root => auth
            .company_id
            .clone()
            .ok_or_else(|| AppError::Forbidden("Root user has no company".into()))?,
        UserRole::Master | UserRole::Supervisor | UserRole::Employee => {
            return Err(AppError::Forbidden("Only root can create supervisors".into()));
        }
    };

    let ep_number = payload.ep_number.trim().to_string();
    if ep_number.is_empty() {
        return Err(AppError::Validation("EP number is required".to_string()));
    }

    let employee = state.employee_repo.find_by_key(&company_id, &ep_number).await?
        .ok_or_else(|| AppError::Validation(
            "Employee with this EP number does not exist".to_string(),
        ))?;

    if state.user_repo.find_by_username(&ep_number).await?.is_some() {
        return Err(AppError::Conflict("User with this EP number already exists".to_string()));
    }

    let mut user = User::new(
        ep_number.clone(),
        hash_password(&ep_number)?,
        UserRole::Supervisor,
        Some(company_id.clone()),
    );
    user.ep_number = Some(ep_number.clone());
    let created = state.user_repo.create(&user).await?;

    let profile = SupervisorProfile::new(created.id.clone(), company_id);
    let profile = state.supervisor_repo.create(&profile).await?;

    info!(
        "Supervisor created: {} (employee {}, profile {})",
        created.username, employee.id, profile.id
    );

    let event = AuditEvent::new(
        &auth.user_id,
        AuditAction::Create,
        "User",
        &created.id,
        json!({
            "username": {"before": null, "after": created.username},
            "role": {"before": null, "after": created.role},
        }),
    );
    if let Err(err) = state.audit.record(event).await {
        error!("audit sink rejected supervisor event: {:?}", err);
    }

    Ok(Json(CreatedUserResponse {
        id: created.id,
        username: created.username,
        role: created.role,
        company_id: created.company_id,
        initial_password: ep_number,
    }))
}
