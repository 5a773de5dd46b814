//! CORS layer configuration.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{Any, CorsLayer};

use projecthub_core::config::ServerConfig;

use crate::extractors::auth::{USER_EMAIL_HEADER, USER_ID_HEADER, USER_NAME_HEADER};

const MAX_AGE: Duration = Duration::from_secs(3600);

/// Builds a CORS tower layer from configuration. An empty list or a `*`
/// entry allows any origin.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .expose_headers([header::ETAG])
        .max_age(MAX_AGE);

    let origins = &config.cors_allowed_origins;
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    layer.allow_origin(origins).allow_headers([
        header::CONTENT_TYPE,
        header::IF_NONE_MATCH,
        HeaderName::from_static(USER_ID_HEADER),
        HeaderName::from_static(USER_NAME_HEADER),
        HeaderName::from_static(USER_EMAIL_HEADER),
    ])
}
