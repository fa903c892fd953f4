use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::CreateCompanyRequest;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::audit::{AuditAction, AuditEvent};
use crate::domain::models::company::Company;
use crate::domain::models::user::UserRole;
use std::sync::Arc;
use crate::error::AppError;
use serde_json::json;
use tracing::{error, info};

pub async fn create_company(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<CreateCompanyRequest>,
) -> Result<impl IntoResponse, AppError> {
    match auth.role {
        UserRole::Master => {}
        UserRole::Root | UserRole::Supervisor | UserRole::Employee => {
            return Err(AppError::Forbidden("Only master can create companies".into()));
        }
    }

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Company name is required".to_string()));
    }

    if state.company_repo.find_by_name(&name).await?.is_some() {
        return Err(AppError::Conflict("Company with this name already exists".to_string()));
    }

    let created = state.company_repo.create(&Company::new(name)).await?;

    info!("Company created: {} ({})", created.name, created.id);

    let event = AuditEvent::new(
        &auth.user_id,
        AuditAction::Create,
        "Company",
        &created.id,
        json!({"name": {"before": null, "after": created.name}}),
    );
    if let Err(err) = state.audit.record(event).await {
        error!("audit sink rejected company event: {:?}", err);
    }

    Ok(Json(created))
}

pub async fn list_companies(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let companies = match auth.role {
        UserRole::Master => state.company_repo.list().await?,
        UserRole::Root | UserRole::Supervisor | UserRole::Employee => {
            match &auth.company_id {
                Some(company_id) => state
                    .company_repo
                    .find_by_id(company_id)
                    .await?
                    .into_iter()
                    .collect(),
                None => Vec::new(),
            }
        }
    };

    Ok(Json(companies))
}
