use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::database::Database;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::property::PropertyWithLocationRow;
use crate::models::{PropertyWithLocation, Tenant};
use crate::search::builder;

pub fn routes() -> Router {
    Router::new()
        .route("/tenants", post(create))
        .route("/tenants/:cognito_id", get(show).put(update))
        .route("/tenants/:cognito_id/current-residences", get(current_residences))
        .route(
            "/tenants/:cognito_id/favorites/:property_id",
            post(add_favorite).delete(remove_favorite),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TenantInput {
    cognito_id: Option<String>,
    name: String,
    email: String,
    phone_number: String,
}

/// Tenant profile with favorited properties, as returned by tenant reads.
#[derive(Debug, Serialize)]
struct TenantWithFavorites {
    #[serde(flatten)]
    tenant: Tenant,
    favorites: Vec<PropertyWithLocation>,
}

async fn load_tenant(pool: &sqlx::PgPool, cognito_id: &str) -> Result<Tenant, ApiError> {
    let tenant: Option<Tenant> = sqlx::query_as("SELECT * FROM tenants WHERE cognito_id = $1")
        .bind(cognito_id)
        .fetch_optional(pool)
        .await?;
    tenant.ok_or_else(|| ApiError::not_found("No tenant found"))
}

async fn load_favorites(
    pool: &sqlx::PgPool,
    cognito_id: &str,
) -> Result<Vec<PropertyWithLocation>, ApiError> {
    let sql = format!(
        "{} JOIN favorites f ON f.property_id = p.id WHERE f.tenant_cognito_id = $1",
        builder::base_select()
    );
    let rows: Vec<PropertyWithLocationRow> = sqlx::query_as(&sql)
        .bind(cognito_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// POST /tenants - create tenant profile
async fn create(auth: AuthUser, Json(input): Json<TenantInput>) -> Result<impl IntoResponse, ApiError> {
    auth.require(&[Role::Tenant])?;

    let cognito_id = input.cognito_id.unwrap_or_else(|| auth.cognito_id.clone());
    let pool = Database::pool().await?;

    let tenant: Tenant = sqlx::query_as(
        "INSERT INTO tenants (cognito_id, name, email, phone_number) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(&cognito_id)
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.phone_number)
    .fetch_one(pool)
    .await?;

    Ok((StatusCode::CREATED, Json(tenant)))
}

/// GET /tenants/:cognitoId - profile plus favorited properties
async fn show(auth: AuthUser, Path(cognito_id): Path<String>) -> Result<impl IntoResponse, ApiError> {
    auth.require(&[Role::Tenant])?;

    let pool = Database::pool().await?;
    let tenant = load_tenant(pool, &cognito_id).await?;
    let favorites = load_favorites(pool, &cognito_id).await?;

    Ok(Json(TenantWithFavorites { tenant, favorites }))
}

/// PUT /tenants/:cognitoId - update tenant profile
async fn update(
    auth: AuthUser,
    Path(cognito_id): Path<String>,
    Json(input): Json<TenantInput>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(&[Role::Tenant])?;

    let pool = Database::pool().await?;
    let tenant: Option<Tenant> = sqlx::query_as(
        "UPDATE tenants SET name = $2, email = $3, phone_number = $4 \
         WHERE cognito_id = $1 RETURNING *",
    )
    .bind(&cognito_id)
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.phone_number)
    .fetch_optional(pool)
    .await?;

    match tenant {
        Some(tenant) => Ok(Json(tenant)),
        None => Err(ApiError::not_found("No tenant found")),
    }
}

/// GET /tenants/:cognitoId/current-residences - properties the tenant occupies
async fn current_residences(
    auth: AuthUser,
    Path(cognito_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(&[Role::Tenant])?;

    let sql = format!(
        "{} JOIN property_tenants pt ON pt.property_id = p.id WHERE pt.tenant_cognito_id = $1",
        builder::base_select()
    );
    let pool = Database::pool().await?;

    let rows: Vec<PropertyWithLocationRow> = sqlx::query_as(&sql)
        .bind(&cognito_id)
        .fetch_all(pool)
        .await?;

    let properties: Vec<PropertyWithLocation> = rows.into_iter().map(Into::into).collect();
    Ok(Json(properties))
}

/// POST /tenants/:cognitoId/favorites/:propertyId - bookmark a property.
/// Duplicate favorites conflict rather than silently duplicating.
async fn add_favorite(
    auth: AuthUser,
    Path((cognito_id, property_id)): Path<(String, i32)>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(&[Role::Tenant])?;

    let pool = Database::pool().await?;
    let tenant = load_tenant(pool, &cognito_id).await?;

    let property_exists: Option<i32> = sqlx::query_scalar("SELECT id FROM properties WHERE id = $1")
        .bind(property_id)
        .fetch_optional(pool)
        .await?;
    if property_exists.is_none() {
        return Err(ApiError::not_found("Property not found"));
    }

    let inserted = sqlx::query(
        "INSERT INTO favorites (tenant_cognito_id, property_id) VALUES ($1, $2) \
         ON CONFLICT DO NOTHING",
    )
    .bind(&cognito_id)
    .bind(property_id)
    .execute(pool)
    .await?;

    if inserted.rows_affected() == 0 {
        return Err(ApiError::conflict("Property already favorited"));
    }

    let favorites = load_favorites(pool, &cognito_id).await?;
    Ok((StatusCode::CREATED, Json(TenantWithFavorites { tenant, favorites })))
}

/// DELETE /tenants/:cognitoId/favorites/:propertyId - remove a bookmark
async fn remove_favorite(
    auth: AuthUser,
    Path((cognito_id, property_id)): Path<(String, i32)>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(&[Role::Tenant])?;

    let pool = Database::pool().await?;
    let tenant = load_tenant(pool, &cognito_id).await?;

    let deleted = sqlx::query(
        "DELETE FROM favorites WHERE tenant_cognito_id = $1 AND property_id = $2",
    )
    .bind(&cognito_id)
    .bind(property_id)
    .execute(pool)
    .await?;

    if deleted.rows_affected() == 0 {
        return Err(ApiError::not_found("Favorite not found"));
    }

    let favorites = load_favorites(pool, &cognito_id).await?;
    Ok(Json(TenantWithFavorites { tenant, favorites }))
}
