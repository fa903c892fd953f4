use axum::{extract::{Path, State}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::{ChangePasswordRequest, LoginRequest};
use crate::api::dtos::responses::PasswordResetResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::auth::{AuthResponse, UserProfile};
use crate::domain::models::user::UserRole;
use crate::domain::services::auth_service::{hash_password, verify_password};
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use time::Duration;
use tracing::info;

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_username(&payload.username).await?
        .ok_or(AppError::Unauthorized)?;

    if !user.is_active {
        return Err(AppError::Unauthorized);
    }

    verify_password(&payload.password, &user.password_hash)?;

    let (access_jwt, refresh_token, csrf_token) = state.auth_service.login(&user).await?;

    set_cookies(&cookies, &access_jwt, &refresh_token);

    info!("User logged in: {} ({})", user.username, user.role);

    Ok(Json(AuthResponse {
        csrf_token,
        user: UserProfile {
            id: user.id,
            username: user.username,
            role: user.role,
            company_id: user.company_id,
            must_change_password: user.must_change_password,
        }
    }))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    let refresh_cookie = cookies.get("refresh_token").ok_or(AppError::Unauthorized)?;
    let raw_token = refresh_cookie.value();

    let token_hash = state.auth_service.hash_token(raw_token);
    let record = state.auth_repo.find_refresh_token(&token_hash).await?
        .ok_or(AppError::Unauthorized)?;

    let user = state.user_repo.find_by_id(&record.user_id).await?
        .ok_or(AppError::Unauthorized)?;

    let (new_access, new_refresh, new_csrf) = state.auth_service.refresh(raw_token, &user).await?;

    set_cookies(&cookies, &new_access, &new_refresh);

    info!("Token refreshed for user: {}", user.id);

    Ok(Json(AuthResponse {
        csrf_token: new_csrf,
        user: UserProfile {
            id: user.id,
            username: user.username,
            role: user.role,
            company_id: user.company_id,
            must_change_password: user.must_change_password,
        }
    }))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    if let Some(cookie) = cookies.get("refresh_token") {
        let _ = state.auth_service.logout(cookie.value()).await;
    }

    cookies.remove(Cookie::build(("access_token", "")).path("/").into());
    cookies.remove(Cookie::build(("refresh_token", "")).path("/").into());

    info!("User logged out");

    Ok(StatusCode::OK)
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_id(&auth.user_id).await?
        .ok_or(AppError::Unauthorized)?;

    verify_password(&payload.current_password, &user.password_hash)
        .map_err(|_| AppError::Validation("Current password is incorrect".to_string()))?;

    if payload.new_password.len() < 6 {
        return Err(AppError::Validation(
            "New password must be at least 6 characters long".to_string(),
        ));
    }

    if payload.new_password != payload.confirm_password {
        return Err(AppError::Validation("New passwords do not match".to_string()));
    }

    let password_hash = hash_password(&payload.new_password)?;
    state.user_repo.update_password(&user.id, &password_hash, false).await?;

    info!("Password changed for user: {}", user.id);

    Ok(Json(serde_json::json!({"status": "changed"})))
}

/// MASTER resets ROOT passwords; ROOT resets SUPERVISOR/EMPLOYEE passwords
/// within its own company. The password falls back to the EP number (or the
/// username) and must be changed on next login.
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let target = state.user_repo.find_by_id(&user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    let can_reset = match (auth.role, target.role) {
        (UserRole::Master, UserRole::Root) => true,
        (UserRole::Root, UserRole::Supervisor) | (UserRole::Root, UserRole::Employee) => {
            auth.company_id.is_some() && auth.company_id == target.company_id
        }
        _ => false,
    };
    if !can_reset {
        return Err(AppError::Forbidden(
            "You do not have permission to reset this user's password".to_string(),
        ));
    }

    let new_password = target.ep_number.clone().unwrap_or_else(|| target.username.clone());
    let password_hash = hash_password(&new_password)?;
    state.user_repo.update_password(&target.id, &password_hash, true).await?;

    info!("Password reset for user: {}", target.username);

    Ok(Json(PasswordResetResponse {
        username: target.username,
        new_password,
    }))
}

fn set_cookies(cookies: &Cookies, access: &str, refresh: &str) {
    let mut access_c = Cookie::new("access_token", access.to_string());
    access_c.set_http_only(true);
    access_c.set_secure(true);
    access_c.set_same_site(SameSite::Strict);
    access_c.set_path("/");
    access_c.set_max_age(Duration::minutes(15));
    cookies.add(access_c);

    let mut refresh_c = Cookie::new("refresh_token", refresh.to_string());
    refresh_c.set_http_only(true);
    refresh_c.set_secure(true);
    refresh_c.set_same_site(SameSite::Strict);
    refresh_c.set_path("/");
    refresh_c.set_max_age(Duration::days(7));
    cookies.add(refresh_c);
}
