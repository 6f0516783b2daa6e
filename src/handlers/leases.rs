use axum::{extract::Path, response::IntoResponse, routing::get, Json, Router};

use crate::auth::Role;
use crate::database::Database;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::lease::{LeaseWithParties, LeaseWithPartiesRow};
use crate::models::property::PROPERTY_JSON;
use crate::models::tenant::TENANT_JSON;
use crate::models::Payment;

pub fn routes() -> Router {
    Router::new()
        .route("/leases", get(list))
        .route("/leases/:id/payments", get(payments))
}

/// GET /leases - all leases with both parties embedded
async fn list(auth: AuthUser) -> Result<impl IntoResponse, ApiError> {
    auth.require(&[Role::Manager, Role::Tenant])?;

    let sql = format!(
        "SELECT ls.*, {} AS tenant, {} AS property \
         FROM leases ls \
         JOIN tenants t ON t.cognito_id = ls.tenant_cognito_id \
         JOIN properties p ON p.id = ls.property_id",
        TENANT_JSON, PROPERTY_JSON
    );
    let pool = Database::pool().await?;

    let rows: Vec<LeaseWithPartiesRow> = sqlx::query_as(&sql).fetch_all(pool).await?;
    let leases: Vec<LeaseWithParties> = rows.into_iter().map(Into::into).collect();
    Ok(Json(leases))
}

/// GET /leases/:id/payments - payments for a lease, newest first
async fn payments(auth: AuthUser, Path(id): Path<i32>) -> Result<impl IntoResponse, ApiError> {
    auth.require(&[Role::Manager, Role::Tenant])?;

    let pool = Database::pool().await?;
    let payments: Vec<Payment> = sqlx::query_as(
        "SELECT * FROM payments WHERE lease_id = $1 ORDER BY payment_date DESC",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Json(payments))
}
