//! Middleware stack for the API server

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Method, Request, StatusCode},
    Router,
};
use market_common::{AppError, CorsConfig, RateLimitConfig};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Requests running longer than this get a 503
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn request_id_header() -> HeaderName {
    HeaderName::from_static(REQUEST_ID_HEADER)
}

/// Request id, tracing, timeout and CORS; no rate limiting
pub fn apply_middleware(
    router: Router<AppState>,
    cors_config: &CorsConfig,
    is_production: bool,
) -> Router<AppState> {
    // last added runs first: request id -> trace -> timeout -> cors -> handler
    router
        .layer(create_cors_layer(cors_config, is_production))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::SERVICE_UNAVAILABLE,
            REQUEST_TIMEOUT,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::new(request_id_header()))
        .layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid))
}

/// [`apply_middleware`] behind a global token-bucket rate limit
pub fn apply_middleware_with_rate_limit(
    router: Router<AppState>,
    rate_limit_config: &RateLimitConfig,
    cors_config: &CorsConfig,
    is_production: bool,
) -> Result<Router<AppState>, AppError> {
    // one token every `period`, so N per second means a 1000/N ms period
    let period_ms = (1000 / u64::from(rate_limit_config.requests_per_second.max(1))).max(1);
    let governor_conf = GovernorConfigBuilder::default()
        .per_millisecond(period_ms)
        .burst_size(rate_limit_config.burst.max(1))
        .key_extractor(GlobalKeyExtractor)
        .finish()
        .ok_or_else(|| AppError::Config("invalid rate limit settings".to_string()))?;

    Ok(apply_middleware(router, cors_config, is_production).layer(GovernorLayer {
        config: Arc::new(governor_conf),
    }))
}

fn create_cors_layer(config: &CorsConfig, is_production: bool) -> CorsLayer {
    let base_layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            request_id_header(),
        ])
        .expose_headers([
            request_id_header(),
            HeaderName::from_static("x-ratelimit-limit"),
            HeaderName::from_static("x-ratelimit-remaining"),
            HeaderName::from_static("x-ratelimit-reset"),
        ]);

    if !is_production && config.allowed_origins.is_empty() {
        tracing::warn!("CORS: allowing any origin; set cors.allowed_origins for production");
        return base_layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            })
        })
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS: no allowed origins configured; cross-origin requests will be blocked");
    }
    base_layer.allow_origin(AllowOrigin::list(origins))
}
