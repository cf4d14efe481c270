//! Authentication API Endpoints
//! Mission: Provide login, identity and account management endpoints

use crate::auth::{
    account_store::{AccountError, AccountFilter, AccountStore, MIN_PASSWORD_LEN},
    middleware::{require_admin, AuthError},
    models::{
        Account, AccountResponse, Claims, IdentityResponse, LoginRequest, LoginResponse,
        NewAccount, RegisterRequest, Role,
    },
    token::TokenService,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub accounts: Arc<AccountStore>,
    pub tokens: Arc<TokenService>,
}

impl AuthState {
    pub fn new(accounts: Arc<AccountStore>, tokens: Arc<TokenService>) -> Self {
        Self { accounts, tokens }
    }
}

/// Login endpoint - POST /api/auth/login (also mounted at /api/admin/login)
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    let login_name = payload.username.trim().to_string();
    if login_name.is_empty() || payload.password.is_empty() {
        return Err(AuthApiError::MissingCredentials);
    }

    info!("🔐 Login attempt: {}", login_name);

    // bcrypt is CPU bound; keep it off the async workers
    let accounts = state.accounts.clone();
    let name = login_name.clone();
    let account = tokio::task::spawn_blocking(move || accounts.verify_password(&name, &payload.password))
        .await
        .map_err(|e| AuthApiError::internal("login task", e))?
        .map_err(|e| AuthApiError::internal("verify password", e))?;

    let Some(account) = account else {
        warn!("❌ Failed login attempt: {}", login_name);
        return Err(AuthApiError::InvalidCredentials);
    };

    if let Err(e) = state.accounts.record_login(account.id) {
        warn!("Failed to record login for {}: {}", account.id, e);
    }

    let token = state
        .tokens
        .issue(&Claims::for_account(&account))
        .map_err(|e| AuthApiError::internal("issue token", e))?;

    info!(
        "✅ Login successful: {} ({})",
        account.username,
        account.role.as_str()
    );

    Ok(Json(LoginResponse {
        success: true,
        token,
        expires_in: state.tokens.ttl_secs(),
        user: AccountResponse::from_account(&account),
    }))
}

/// Storefront sign-up - POST /api/auth/register
///
/// Creates a customer account and logs it in.
pub async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), AuthApiError> {
    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthApiError::InvalidEmail);
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthApiError::WeakPassword);
    }

    let new = payload.into_account();
    if new.username.is_empty() {
        return Err(AuthApiError::MissingUsername);
    }

    let accounts = state.accounts.clone();
    let account = tokio::task::spawn_blocking(move || accounts.create_account(&new))
        .await
        .map_err(|e| AuthApiError::internal("register task", e))?
        .map_err(|e| match e {
            AccountError::Duplicate => AuthApiError::UserAlreadyExists,
            AccountError::Storage(e) => AuthApiError::internal("register account", e),
        })?;

    let token = state
        .tokens
        .issue(&Claims::for_account(&account))
        .map_err(|e| AuthApiError::internal("issue token", e))?;

    info!("✅ Customer registered: {}", account.username);

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            success: true,
            token,
            expires_in: state.tokens.ttl_secs(),
            user: AccountResponse::from_account(&account),
        }),
    ))
}

/// Logout - POST /api/auth/logout
///
/// Tokens are stateless; the client discards its copy.
pub async fn logout() -> Json<Value> {
    Json(json!({ "success": true, "message": "Logged out successfully" }))
}

/// Current identity - GET /api/auth/me
/// Built from the validated claims, no database lookup.
pub async fn get_current_user(claims: Claims) -> Json<Value> {
    Json(json!({
        "success": true,
        "user": IdentityResponse::from_claims(&claims),
    }))
}

/// Token check for the admin UI - GET /api/admin/verify
pub async fn verify_token(claims: Claims) -> Json<Value> {
    Json(json!({
        "success": true,
        "valid": true,
        "user": IdentityResponse::from_claims(&claims),
    }))
}

/// List accounts - GET /api/admin/users (Admin only)
pub async fn list_users(
    State(state): State<AuthState>,
    claims: Claims,
    Query(filter): Query<AccountFilter>,
) -> Result<Json<Value>, AuthApiError> {
    require_admin(&claims)?;

    let page = state
        .accounts
        .list_accounts(&filter)
        .map_err(|e| AuthApiError::internal("list accounts", e))?;

    let users: Vec<AccountResponse> = page.items.iter().map(AccountResponse::from_account).collect();

    Ok(Json(json!({
        "success": true,
        "data": users,
        "total": page.total,
        "limit": page.limit,
        "offset": page.offset,
    })))
}

/// Create account - POST /api/admin/users (Admin only)
pub async fn create_user(
    State(state): State<AuthState>,
    claims: Claims,
    Json(payload): Json<NewAccount>,
) -> Result<(StatusCode, Json<Value>), AuthApiError> {
    require_admin(&claims)?;

    if payload.username.trim().is_empty() {
        return Err(AuthApiError::MissingUsername);
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthApiError::WeakPassword);
    }

    let accounts = state.accounts.clone();
    let account = tokio::task::spawn_blocking(move || accounts.create_account(&payload))
        .await
        .map_err(|e| AuthApiError::internal("create account task", e))?
        .map_err(|e| match e {
            AccountError::Duplicate => AuthApiError::UserAlreadyExists,
            AccountError::Storage(e) => AuthApiError::internal("create account", e),
        })?;

    info!(
        "✅ Account created by {}: {} ({})",
        claims.subject_id,
        account.username,
        account.role.as_str()
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": AccountResponse::from_account(&account) })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub role: Role,
}

/// Activate / deactivate - PATCH /api/admin/users/:id/status (Admin only)
pub async fn set_user_status(
    State(state): State<AuthState>,
    claims: Claims,
    Path(user_id): Path<i64>,
    Json(payload): Json<StatusUpdate>,
) -> Result<Json<Value>, AuthApiError> {
    require_admin(&claims)?;
    if user_id == claims.subject_id {
        return Err(AuthApiError::CannotModifySelf);
    }

    let found = state
        .accounts
        .set_active(user_id, payload.is_active)
        .map_err(|e| AuthApiError::internal("set account status", e))?;
    if !found {
        return Err(AuthApiError::UserNotFound);
    }

    Ok(Json(updated_account(&state, user_id)?))
}

/// Change role - PATCH /api/admin/users/:id/role (Admin only)
pub async fn set_user_role(
    State(state): State<AuthState>,
    claims: Claims,
    Path(user_id): Path<i64>,
    Json(payload): Json<RoleUpdate>,
) -> Result<Json<Value>, AuthApiError> {
    require_admin(&claims)?;
    if user_id == claims.subject_id {
        return Err(AuthApiError::CannotModifySelf);
    }

    let found = state
        .accounts
        .set_role(user_id, payload.role)
        .map_err(|e| AuthApiError::internal("set account role", e))?;
    if !found {
        return Err(AuthApiError::UserNotFound);
    }

    Ok(Json(updated_account(&state, user_id)?))
}

/// Delete account - DELETE /api/admin/users/:id (Admin only)
pub async fn delete_user(
    State(state): State<AuthState>,
    claims: Claims,
    Path(user_id): Path<i64>,
) -> Result<Json<Value>, AuthApiError> {
    require_admin(&claims)?;

    // Don't allow deleting yourself
    if user_id == claims.subject_id {
        return Err(AuthApiError::CannotModifySelf);
    }

    let found = state
        .accounts
        .delete_account(user_id)
        .map_err(|e| AuthApiError::internal("delete account", e))?;
    if !found {
        return Err(AuthApiError::UserNotFound);
    }

    info!("🗑️  Account {} deleted by {}", user_id, claims.subject_id);

    Ok(Json(json!({ "success": true, "message": "User deleted successfully" })))
}

fn updated_account(state: &AuthState, user_id: i64) -> Result<Value, AuthApiError> {
    let account: Account = state
        .accounts
        .get_account(user_id)
        .map_err(|e| AuthApiError::internal("load account", e))?
        .ok_or(AuthApiError::UserNotFound)?;

    Ok(json!({ "success": true, "data": AccountResponse::from_account(&account) }))
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    MissingCredentials,
    InvalidCredentials,
    MissingUsername,
    InvalidEmail,
    WeakPassword,
    UserNotFound,
    UserAlreadyExists,
    CannotModifySelf,
    Auth(AuthError),
    InternalError,
}

impl AuthApiError {
    fn internal(what: &str, err: impl std::fmt::Display) -> Self {
        error!("Auth API failure ({}): {}", what, err);
        AuthApiError::InternalError
    }
}

impl From<AuthError> for AuthApiError {
    fn from(err: AuthError) -> Self {
        AuthApiError::Auth(err)
    }
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::Auth(err) => return err.into_response(),
            AuthApiError::MissingCredentials => {
                (StatusCode::BAD_REQUEST, "Username and password are required")
            }
            AuthApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            AuthApiError::MissingUsername => (StatusCode::BAD_REQUEST, "Username is required"),
            AuthApiError::InvalidEmail => (StatusCode::BAD_REQUEST, "A valid email is required"),
            AuthApiError::WeakPassword => (
                StatusCode::BAD_REQUEST,
                "Password must be at least 8 characters",
            ),
            AuthApiError::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
            AuthApiError::UserAlreadyExists => {
                (StatusCode::CONFLICT, "Username or email already exists")
            }
            AuthApiError::CannotModifySelf => {
                (StatusCode::BAD_REQUEST, "Cannot modify your own account")
            }
            AuthApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}
