use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::extractors::input::AppJson;
use crate::models::auth::{
    LoginRequest, LoginResponse, RegisterRequest, UserResponse, validate_login_request,
    validate_register_request,
};
use crate::state::AppState;
use crate::utils::{hash, jwt};

/// Handle user registration.
#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    operation_id = "register",
    summary = "Create an account",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = crate::error::ErrorBody),
        (status = 409, description = "Email or mobile in use (ACCOUNT_EXISTS)", body = crate::error::ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let email = payload.email.trim().to_lowercase();
    let mobile = payload.mobile.trim().to_string();

    let existing = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Email.eq(&email))
                .add(user::Column::Mobile.eq(&mobile)),
        )
        .count(&state.db)
        .await?;
    if existing > 0 {
        return Err(AppError::AccountExists);
    }

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Password hash error: {}", e)))?;

    let new_user = user::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        email: Set(email),
        mobile: Set(mobile),
        password: Set(hash),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Registration race condition: unique constraint caught on insert");
            AppError::AccountExists
        }
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Handle user login by email or mobile.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Exchange credentials for a bearer token",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = crate::error::ErrorBody),
        (status = 401, description = "Bad credentials (INVALID_CREDENTIALS)", body = crate::error::ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let identifier = payload.identifier.trim();

    let user = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Email.eq(identifier.to_lowercase()))
                .add(user::Column::Mobile.eq(identifier)),
        )
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = jwt::sign(user.id, &user.email, &state.config.auth.jwt_secret)
        .map_err(|e| AppError::internal(format!("JWT sign error: {}", e)))?;

    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(user),
    }))
}

/// Return the current authenticated user's profile.
#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "me",
    summary = "Current user",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = crate::error::ErrorBody),
        (status = 404, description = "Account no longer exists (NOT_FOUND)", body = crate::error::ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(UserResponse::from(user)))
}
