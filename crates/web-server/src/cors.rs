use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

/// Builds the CORS layer from the configured origin setting.
///
/// `*` allows any origin; otherwise the value is a comma-separated list of
/// exact origins. A list in which nothing parses falls back to `*`.
pub fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origin.trim() == "*" {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origin
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!(origin, "No valid CORS origin configured, allowing any origin.");
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}
