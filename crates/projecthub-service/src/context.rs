//! Request context carrying the acting user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for the current request.
///
/// Built by the transport layer from the resolved caller identity and
/// passed into every service method, so each operation knows *who* is
/// acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The caller's ID.
    pub user_id: Uuid,
    /// Display name.
    pub user_name: String,
    /// Email address.
    pub user_email: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid, user_name: impl Into<String>, user_email: impl Into<String>) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            user_email: user_email.into(),
            request_time: Utc::now(),
        }
    }
}
