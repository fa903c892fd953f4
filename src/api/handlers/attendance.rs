use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use chrono::Utc;
use serde::Deserialize;
use crate::state::AppState;
use crate::api::dtos::requests::AddRemarkRequest;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::attendance::{AttendanceRecord, Remark};
use crate::domain::models::user::UserRole;
use std::sync::Arc;
use crate::error::AppError;
use tracing::info;

#[derive(Deserialize)]
pub struct RecordsQuery {
    pub employee_id: Option<String>,
}

/// Record listing follows the same visibility rules as export: everyone sees
/// their own slice, nothing more.
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<RecordsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let employee_id = match auth.role {
        UserRole::Employee => {
            let employee = state.employee_repo.find_by_user_id(&auth.user_id).await?
                .ok_or_else(|| AppError::NotFound("No employee record linked to this user".into()))?;
            employee.id
        }
        UserRole::Master | UserRole::Root | UserRole::Supervisor => {
            let employee_id = query.employee_id
                .ok_or_else(|| AppError::Validation("employee_id is required".to_string()))?;
            let employee = state.employee_repo.find_by_id(&employee_id).await?
                .ok_or_else(|| AppError::NotFound("Employee not found".into()))?;

            let visible = match auth.role {
                UserRole::Master => true,
                UserRole::Root => auth.company_id.as_deref() == Some(employee.company_id.as_str()),
                UserRole::Supervisor => {
                    match state.supervisor_repo.find_by_user_id(&auth.user_id).await? {
                        Some(profile) => state
                            .assignment_repo
                            .find_covering(&employee.id, &profile.id, Utc::now().date_naive())
                            .await?
                            .is_some(),
                        None => false,
                    }
                }
                UserRole::Employee => false,
            };
            if !visible {
                return Err(AppError::Forbidden("Not allowed to view these records".into()));
            }
            employee.id
        }
    };

    let records = state.attendance_repo.list_by_employee(&employee_id).await?;
    Ok(Json(records))
}

/// Remarks may be added by the employee on their own record, or by a
/// supervisor whose assignment covers the record's date.
pub async fn add_remark(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(attendance_id): Path<String>,
    Json(payload): Json<AddRemarkRequest>,
) -> Result<impl IntoResponse, AppError> {
    let text = payload.text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::Validation("Remark text is required".to_string()));
    }

    let record = state.attendance_repo.find_by_id(&attendance_id).await?
        .ok_or_else(|| AppError::NotFound("Attendance record not found".into()))?;

    let can_add = match auth.role {
        UserRole::Employee => {
            state.employee_repo.find_by_id(&record.employee_id).await?
                .and_then(|e| e.user_id)
                .as_deref() == Some(auth.user_id.as_str())
        }
        UserRole::Supervisor => {
            match state.supervisor_repo.find_by_user_id(&auth.user_id).await? {
                Some(profile) => state
                    .assignment_repo
                    .find_covering(&record.employee_id, &profile.id, record.date)
                    .await?
                    .is_some(),
                None => false,
            }
        }
        UserRole::Master | UserRole::Root => false,
    };
    if !can_add {
        return Err(AppError::Forbidden(
            "You do not have permission to add remarks to this record".to_string(),
        ));
    }

    let remark = Remark::new(record.id.clone(), auth.user_id.clone(), text);
    let created = state.attendance_repo.add_remark(&remark).await?;

    info!("Remark added to record {} by {}", record.id, auth.user_id);

    Ok(Json(created))
}

pub async fn list_remarks(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(attendance_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.attendance_repo.find_by_id(&attendance_id).await?
        .ok_or_else(|| AppError::NotFound("Attendance record not found".into()))?;

    if !can_view_record(&state, &auth, &record).await? {
        return Err(AppError::Forbidden("Not allowed to view this record".into()));
    }

    let remarks = state.attendance_repo.list_remarks(&record.id).await?;
    Ok(Json(remarks))
}

async fn can_view_record(
    state: &Arc<AppState>,
    auth: &AuthUser,
    record: &AttendanceRecord,
) -> Result<bool, AppError> {
    Ok(match auth.role {
        UserRole::Master => true,
        UserRole::Root => auth.company_id.as_deref() == Some(record.company_id.as_str()),
        UserRole::Supervisor => {
            match state.supervisor_repo.find_by_user_id(&auth.user_id).await? {
                Some(profile) => state
                    .assignment_repo
                    .find_covering(&record.employee_id, &profile.id, record.date)
                    .await?
                    .is_some(),
                None => false,
            }
        }
        UserRole::Employee => {
            state.employee_repo.find_by_id(&record.employee_id).await?
                .and_then(|e| e.user_id)
                .as_deref() == Some(auth.user_id.as_str())
        }
    })
}
