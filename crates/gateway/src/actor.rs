//! Acting-user extraction
//!
//! Authentication itself happens upstream (reverse proxy / session layer);
//! this service trusts the identity headers it is handed. Missing headers
//! mean an anonymous caller.

use axum::{extract::FromRequestParts, http::request::Parts};
use storyhaven_common::{Actor, AppError};
use uuid::Uuid;

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header flagging staff/moderator capability ("true"/"1")
pub const USER_STAFF_HEADER: &str = "x-user-staff";

/// The acting user for a request, `None` when anonymous
#[derive(Clone, Copy, Debug)]
pub struct ActorContext(pub Option<Actor>);

impl ActorContext {
    /// The actor, or a 403 for endpoints that require authentication
    pub fn require(&self) -> Result<Actor, AppError> {
        self.0.ok_or_else(|| AppError::Forbidden {
            message: "Authentication required".to_string(),
        })
    }
}

impl<S> FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw_id) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(ActorContext(None));
        };

        let id = raw_id
            .to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| {
                AppError::validation(USER_ID_HEADER, "Malformed user id header")
            })?;

        let is_staff = parts
            .headers
            .get(USER_STAFF_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(ActorContext(Some(Actor { id, is_staff })))
    }
}
