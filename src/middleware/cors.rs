use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

pub fn interview_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any)
}
