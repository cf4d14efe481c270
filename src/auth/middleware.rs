//! Authentication Middleware
//! Mission: Gate back-office endpoints behind a valid bearer token

use crate::auth::{
    bearer::extract_bearer,
    models::{Claims, Role},
    token::TokenService,
};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

/// Auth middleware that validates bearer tokens.
///
/// Rejects before the handler runs; on success the decoded [`Claims`] are
/// attached to the request extensions.
pub async fn auth_middleware(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token =
        extract_bearer(req.extensions(), req.headers()).ok_or(AuthError::MissingToken)?;

    let claims = tokens.validate(&token).map_err(|e| {
        warn!(path = %req.uri().path(), reason = %e, "Rejected bearer token");
        AuthError::InvalidToken
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Handlers behind the gate take `claims: Claims` directly.
#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

/// Admin or staff only
pub fn require_staff(claims: &Claims) -> Result<(), AuthError> {
    if claims.effective_role().is_staff() {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Admin only
pub fn require_admin(claims: &Claims) -> Result<(), AuthError> {
    if claims.effective_role() == Role::Admin {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Auth error types.
///
/// Missing and invalid credentials are both 401; 403 is reserved for a valid
/// identity whose role is not allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    Forbidden,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                json!({ "success": false, "message": "Access denied" }),
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                json!({ "success": false, "message": "Invalid token" }),
            ),
            AuthError::Forbidden => (
                StatusCode::FORBIDDEN,
                json!({ "success": false, "error": "Unauthorized" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_auth_error_responses() {
        let missing = AuthError::MissingToken.into_response();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let invalid = AuthError::InvalidToken.into_response();
        assert_eq!(invalid.status(), StatusCode::UNAUTHORIZED);

        let forbidden = AuthError::Forbidden.into_response();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_claims_extractor() {
        let (mut parts, _) = Request::new(Body::empty()).into_parts();

        // No claims initially
        let missing = Claims::from_request_parts(&mut parts, &()).await;
        assert_eq!(missing.unwrap_err(), AuthError::MissingToken);

        parts
            .extensions
            .insert(Claims::new(3).with_login_name("test"));

        let extracted = Claims::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted.subject_id, 3);
        assert_eq!(extracted.login_name.as_deref(), Some("test"));
    }

    #[test]
    fn test_role_gates() {
        let admin = Claims::new(1).with_role(Role::Admin);
        let staff = Claims::new(2).with_role(Role::Staff);
        let customer = Claims::new(3).with_role(Role::Customer);
        let legacy = Claims::new(4);

        assert!(require_staff(&admin).is_ok());
        assert!(require_staff(&staff).is_ok());
        assert_eq!(require_staff(&customer), Err(AuthError::Forbidden));
        assert!(require_staff(&legacy).is_ok());

        assert!(require_admin(&admin).is_ok());
        assert_eq!(require_admin(&staff), Err(AuthError::Forbidden));
        assert!(require_admin(&legacy).is_ok());
    }
}
