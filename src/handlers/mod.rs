use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

pub mod applications;
pub mod leases;
pub mod managers;
pub mod properties;
pub mod tenants;

/// Full REST surface. Layers (CORS, tracing) are applied by the binary.
pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(properties::routes())
        .merge(managers::routes())
        .merge(tenants::routes())
        .merge(leases::routes())
        .merge(applications::routes())
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "Rentora API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Rental-property marketplace REST API",
        "endpoints": {
            "properties": "/properties[/:id], /properties/:id/leases",
            "managers": "/managers/:cognitoId[/properties]",
            "tenants": "/tenants/:cognitoId[/current-residences], /tenants/:cognitoId/favorites/:propertyId",
            "leases": "/leases, /leases/:id/payments",
            "applications": "/applications, /applications/:id/status",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::Database::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (
                axum::http::StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
