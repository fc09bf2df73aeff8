use axum::{
    Router,
    http::{Method, StatusCode, header},
};
use axum_extra::middleware::option_layer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::{AppState, middleware::TraceLayer};

mod ip;

pub fn router(state: AppState, cors: bool) -> Router {
    let cors = cors.then(cors_layer);
    let layer = ServiceBuilder::new()
        .layer(TraceLayer)
        .layer(option_layer(cors));

    Router::new()
        .merge(ip::routes())
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(layer)
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
