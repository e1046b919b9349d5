use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for user registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Display name (at least 2 characters).
    #[schema(example = "Alice Wonder")]
    pub name: String,
    /// Unique email address.
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Unique mobile number (at least 10 characters).
    #[schema(example = "9876543210")]
    pub mobile: String,
    /// Password (6-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    if payload.name.trim().chars().count() < 2 {
        return Err(AppError::Validation(
            "Name must be at least 2 characters".into(),
        ));
    }
    if !looks_like_email(payload.email.trim()) {
        return Err(AppError::Validation("Email address is invalid".into()));
    }
    if payload.mobile.trim().chars().count() < 10 {
        return Err(AppError::Validation(
            "Mobile must be at least 10 characters".into(),
        ));
    }
    if payload.password.len() < 6 || payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 6-128 characters".into(),
        ));
    }
    Ok(())
}

/// `local@domain.tld` with no whitespace.
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// Request body for user login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Email address or mobile number of the account.
    #[schema(example = "alice@example.com")]
    pub identifier: String,
    /// Account password.
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.identifier.trim().is_empty() {
        return Err(AppError::Validation("Identifier must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Public view of an account.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "Alice Wonder")]
    pub name: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "9876543210")]
    pub mobile: String,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::user::Model> for UserResponse {
    fn from(user: crate::entity::user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            mobile: user.mobile,
            created_at: user.created_at,
        }
    }
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token valid for 7 days.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub user: UserResponse,
}
