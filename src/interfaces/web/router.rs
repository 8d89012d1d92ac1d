use axum::{
    Router,
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, Request, header},
    middleware,
    middleware::Next,
    routing::{delete, get, post},
};
use tower_http::cors::{Any, CorsLayer};

use super::AppState;
use super::handlers::{bots, health};

fn build_cors(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    layer.allow_origin(origins)
}

pub fn build_api_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/api/bots/{username}", get(bots::list_bots_endpoint))
        .route("/api/bot/upload", post(bots::upload_bot_endpoint))
        .route("/api/bot/start/{bot_id}", post(bots::start_bot_endpoint))
        .route("/api/bot/stop/{bot_id}", post(bots::stop_bot_endpoint))
        .route("/api/bot/delete/{bot_id}", delete(bots::delete_bot_endpoint))
        .route("/api/bot/logs/{bot_id}", get(bots::bot_logs_endpoint))
        .route("/api/bot/status/{bot_id}", get(bots::bot_status_endpoint))
        .route("/api/logs", get(super::sse_logs_endpoint))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(middleware::from_fn(security_headers))
        .layer(build_cors(&state.cors_origins))
        .with_state(state)
}

async fn security_headers(req: Request<Body>, next: Next) -> axum::response::Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    response
}
