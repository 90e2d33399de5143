use axum::{extract::State, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::LoginRequest;
use crate::domain::models::{admin::Admin, auth::{AdminProfile, AuthResponse}};
use crate::domain::services::auth_service::{TokenPair, ACCESS_TOKEN_MINUTES, REFRESH_TOKEN_DAYS};
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use time::Duration;
use argon2::{PasswordHash, Argon2, PasswordVerifier};
use tracing::{info, warn};

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let admin = state.admin_repo.find_by_username(payload.username.trim()).await?
        .ok_or(AppError::Unauthorized)?;

    let parsed_hash = PasswordHash::new(&admin.password_hash)
        .map_err(|_| AppError::Internal)?;

    Argon2::default().verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| {
            warn!("Failed login for admin '{}'", admin.username);
            AppError::Unauthorized
        })?;

    let tokens = state.auth_service.login(&admin).await?;
    set_cookies(&cookies, &tokens);

    info!("Admin logged in: {}", admin.username);
    Ok(Json(auth_response(admin, tokens)))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    let refresh_cookie = cookies.get("refresh_token").ok_or(AppError::Unauthorized)?;
    let (admin, tokens) = state.auth_service.refresh(refresh_cookie.value()).await?;
    set_cookies(&cookies, &tokens);

    info!("Token refreshed for admin: {}", admin.username);
    Ok(Json(auth_response(admin, tokens)))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    if let Some(cookie) = cookies.get("refresh_token") {
        state.auth_service.logout(cookie.value()).await?;
    }

    cookies.remove(Cookie::build(("access_token", "")).path("/").into());
    cookies.remove(Cookie::build(("refresh_token", "")).path("/api/v1/auth").into());

    info!("Admin logged out");
    Ok(StatusCode::OK)
}

fn auth_response(admin: Admin, tokens: TokenPair) -> AuthResponse {
    AuthResponse {
        csrf_token: tokens.csrf_token,
        admin: AdminProfile {
            id: admin.id,
            username: admin.username,
        },
    }
}

fn set_cookies(cookies: &Cookies, tokens: &TokenPair) {
    let mut access_c = Cookie::new("access_token", tokens.access_token.clone());
    access_c.set_http_only(true);
    access_c.set_secure(true);
    access_c.set_same_site(SameSite::Strict);
    access_c.set_path("/");
    access_c.set_max_age(Duration::minutes(ACCESS_TOKEN_MINUTES));
    cookies.add(access_c);

    let mut refresh_c = Cookie::new("refresh_token", tokens.refresh_token.clone());
    refresh_c.set_http_only(true);
    refresh_c.set_secure(true);
    refresh_c.set_same_site(SameSite::Strict);
    refresh_c.set_path("/api/v1/auth");
    refresh_c.set_max_age(Duration::days(REFRESH_TOKEN_DAYS));
    cookies.add(refresh_c);
}
