use axum::{extract::{Path, State}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::CreateRootUserRequest;
use crate::api::dtos::responses::CreatedUserResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::audit::{AuditAction, AuditEvent};
use crate::domain::models::user::{User, UserRole};
use crate::domain::services::auth_service::hash_password;
use std::sync::Arc;
use crate::error::AppError;
use serde_json::json;
use tracing::{error, info};

/// MASTER provisions one ROOT account per company. The username doubles as
/// the initial password, to be changed at first login.
pub async fn create_root_user(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<CreateRootUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    match auth.role {
        UserRole::Master => {}
        UserRole::Root | UserRole::Supervisor | UserRole::Employee => {
            return Err(AppError::Forbidden("Only master can create root users".into()));
        }
    }

    let username = payload.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }

    if state.user_repo.find_by_username(&username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let company = state.company_repo.find_by_id(&payload.company_id).await?
        .ok_or_else(|| AppError::Validation("Invalid company selected".to_string()))?;

    let user = User::new(
        username.clone(),
        hash_password(&username)?,
        UserRole::Root,
        Some(company.id.clone()),
    );
    let created = state.user_repo.create(&user).await?;

    info!("Root user created: {} for company {}", created.username, company.name);

    let event = AuditEvent::new(
        &auth.user_id,
        AuditAction::Create,
        "User",
        &created.id,
        json!({
            "username": {"before": null, "after": created.username},
            "role": {"before": null, "after": created.role},
            "company": {"before": null, "after": company.name},
        }),
    );
    if let Err(err) = state.audit.record(event).await {
        error!("audit sink rejected user event: {:?}", err);
    }

    Ok(Json(CreatedUserResponse {
        id: created.id,
        username: created.username,
        role: created.role,
        company_id: created.company_id,
        initial_password: username,
    }))
}

pub async fn list_company_users(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(company_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let allowed = match auth.role {
        UserRole::Master => true,
        UserRole::Root => auth.company_id.as_deref() == Some(company_id.as_str()),
        UserRole::Supervisor | UserRole::Employee => false,
    };
    if !allowed {
        return Err(AppError::Forbidden("Not allowed to list these users".into()));
    }

    let users = state.user_repo.list_by_company(&company_id).await?;
    let safe: Vec<_> = users
        .into_iter()
        .map(|u| json!({
            "id": u.id,
            "username": u.username,
            "role": u.role,
            "ep_number": u.ep_number,
            "is_active": u.is_active,
            "must_change_password": u.must_change_password,
            "created_at": u.created_at,
        }))
        .collect();

    Ok(Json(safe))
}
