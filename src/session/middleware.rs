use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

use super::context::SessionContext;
use super::jwt::{session_from_claims, validate_token};
use crate::error::PortalError;
use crate::AppState;

/// Extract token from Authorization header
fn extract_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Validate the bearer token on a request and build its session context.
pub fn validate_request_session(req: &HttpRequest) -> Result<SessionContext, PortalError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| PortalError::Internal("application state not configured".to_string()))?;

    let token = extract_token(req)
        .ok_or_else(|| PortalError::Unauthorized("Missing authorization token".to_string()))?;

    let claims = validate_token(&state.config.jwt_secret, &token).map_err(|e| {
        log::warn!("Token validation failed: {:?}", e);
        PortalError::Unauthorized("Invalid or expired token".to_string())
    })?;

    session_from_claims(claims, &token).map_err(|reason| {
        log::warn!("Token claims rejected: {}", reason);
        PortalError::Unauthorized("Invalid token claims".to_string())
    })
}

impl FromRequest for SessionContext {
    type Error = PortalError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(validate_request_session(req))
    }
}
