pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod search;
pub mod services;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application router with global layers applied.
pub fn app() -> Router {
    handlers::router()
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn cors_layer() -> CorsLayer {
    let cfg = config::config();
    match cfg.environment {
        config::Environment::Development => CorsLayer::permissive(),
        _ => {
            let origins: Vec<axum::http::HeaderValue> = cfg
                .security
                .cors_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any)
        }
    }
}
