//! `AuthUser` extractor: resolves the caller identity established upstream.
//!
//! The identity arrives in `x-user-id`, `x-user-name`, and `x-user-email`
//! headers. Browsers cannot set headers on a WebSocket handshake, so the
//! same fields are also accepted as `user_id`, `user_name`, and
//! `user_email` query parameters.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;
use uuid::Uuid;

use projecthub_core::error::AppError;
use projecthub_service::RequestContext;

use crate::error::ApiError;

/// Header carrying the caller's user ID.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the caller's display name.
pub const USER_NAME_HEADER: &str = "x-user-name";
/// Header carrying the caller's email.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Extracted caller context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Default, Deserialize)]
struct IdentityQuery {
    user_id: Option<String>,
    user_name: Option<String>,
    user_email: Option<String>,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };
        let query = Query::<IdentityQuery>::try_from_uri(&parts.uri)
            .map(|Query(q)| q)
            .unwrap_or_default();

        let raw_id = header(USER_ID_HEADER)
            .or(query.user_id)
            .ok_or_else(|| AppError::bad_request("Missing caller identity (x-user-id)"))?;
        let user_id = raw_id
            .parse::<Uuid>()
            .map_err(|_| AppError::bad_request(format!("Invalid user id: {raw_id}")))?;

        let user_name = header(USER_NAME_HEADER)
            .or(query.user_name)
            .unwrap_or_else(|| user_id.to_string());
        let user_email = header(USER_EMAIL_HEADER)
            .or(query.user_email)
            .unwrap_or_default();

        Ok(AuthUser(RequestContext::new(user_id, user_name, user_email)))
    }
}
