use axum::{
    http::{HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::Config, docs::ApiDoc, handlers, middleware, state::AppState};

/// Builds the full application router over the shared state.
pub fn app(state: AppState) -> Router {
    // Reached by the device's browser (no auth)
    let device_routes = Router::new()
        .route("/redirect", get(handlers::get_redirect))
        .route("/_web", get(handlers::get_web))
        .route("/static/js/{name}", get(handlers::get_static_asset))
        .route("/fingerprint", post(handlers::post_fingerprint))
        .route("/health", get(handlers::health));

    // Reached by the challenger only (API key required)
    let challenger_routes = Router::new()
        .route("/set_device_session", post(handlers::set_device_session))
        .route("/_fp-js", post(handlers::post_fingerprinter))
        .route(
            "/fingerprints",
            post(handlers::collect_fingerprint).delete(handlers::reset_fingerprints),
        )
        .route("/fingerprints/results", get(handlers::get_results))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::api_key_auth,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(device_routes)
        .merge(challenger_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(axum_middleware::from_fn(middleware::request_id))
                .layer(axum_middleware::from_fn(middleware::log_error_responses)),
        )
        .with_state(state)
        .merge(SwaggerUi::new("/api/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allow_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(24 * 60 * 60))
}
