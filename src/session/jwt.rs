use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::context::{Role, SessionContext};
use super::model::Claims;

const SESSION_TOKEN_EXPIRY_SECONDS: i64 = 8 * 60 * 60; // one office shift

/// Issue a session token. Token issuing belongs to the identity service;
/// this exists for tooling and tests.
pub fn generate_session_token(
    secret: &str,
    user_id: Uuid,
    role: Role,
    display_name: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        name: display_name.to_string(),
        exp: now + SESSION_TOKEN_EXPIRY_SECONDS as usize,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validate and decode a token
pub fn validate_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Turn validated claims into the session context handed to components.
pub fn session_from_claims(claims: Claims, credential: &str) -> Result<SessionContext, String> {
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| format!("token subject '{}' is not a valid id", claims.sub))?;
    let role = claims.role.parse::<Role>()?;
    Ok(SessionContext::new(user_id, role, claims.name, credential))
}
