use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};
use contracts::domain::a004_user::aggregate::Role;
use contracts::system::auth::Session;

use super::{jwt, session_repository};
use crate::shared::app_state::AppState;
use crate::shared::error::ApiError;

/// Extractor for the signed-in session.
/// Usage in handlers: `async fn handler(CurrentSession(session): CurrentSession) -> ...`
pub struct CurrentSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        let claims =
            jwt::validate_token(&state.jwt_secret, token).map_err(|_| ApiError::Unauthorized)?;

        // A valid signature is not enough once the session was closed
        if !session_repository::is_active(&state.db, &claims.sid, &claims.sub).await? {
            return Err(ApiError::Unauthorized);
        }

        Ok(CurrentSession(Session {
            session_id: claims.sid,
            user_id: claims.sub,
            role: claims.role,
            school_name: claims.school,
        }))
    }
}

/// Rejects sessions whose role is not listed
pub fn require_role(session: &Session, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&session.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// School the session acts for; super admins have none
pub fn school_of(session: &Session) -> Result<&str, ApiError> {
    session.school_name.as_deref().ok_or(ApiError::Forbidden)
}
