use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::auth::Role;
use crate::database::Database;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::property::PropertyWithLocationRow;
use crate::models::{Manager, PropertyWithLocation};
use crate::search::builder;

pub fn routes() -> Router {
    Router::new()
        .route("/managers", post(create))
        .route("/managers/:cognito_id", get(show).put(update))
        .route("/managers/:cognito_id/properties", get(properties))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManagerInput {
    cognito_id: Option<String>,
    name: String,
    email: String,
    phone_number: String,
}

/// POST /managers - create manager profile
async fn create(auth: AuthUser, Json(input): Json<ManagerInput>) -> Result<impl IntoResponse, ApiError> {
    auth.require(&[Role::Manager])?;

    let cognito_id = input.cognito_id.unwrap_or_else(|| auth.cognito_id.clone());
    let pool = Database::pool().await?;

    let manager: Manager = sqlx::query_as(
        "INSERT INTO managers (cognito_id, name, email, phone_number) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(&cognito_id)
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.phone_number)
    .fetch_one(pool)
    .await?;

    Ok((StatusCode::CREATED, Json(manager)))
}

/// GET /managers/:cognitoId - fetch manager profile
async fn show(auth: AuthUser, Path(cognito_id): Path<String>) -> Result<impl IntoResponse, ApiError> {
    auth.require(&[Role::Manager])?;

    let pool = Database::pool().await?;
    let manager: Option<Manager> = sqlx::query_as("SELECT * FROM managers WHERE cognito_id = $1")
        .bind(&cognito_id)
        .fetch_optional(pool)
        .await?;

    match manager {
        Some(manager) => Ok(Json(manager)),
        None => Err(ApiError::not_found("No manager found")),
    }
}

/// PUT /managers/:cognitoId - update manager profile
async fn update(
    auth: AuthUser,
    Path(cognito_id): Path<String>,
    Json(input): Json<ManagerInput>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(&[Role::Manager])?;

    let pool = Database::pool().await?;
    let manager: Option<Manager> = sqlx::query_as(
        "UPDATE managers SET name = $2, email = $3, phone_number = $4 \
         WHERE cognito_id = $1 RETURNING *",
    )
    .bind(&cognito_id)
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.phone_number)
    .fetch_optional(pool)
    .await?;

    match manager {
        Some(manager) => Ok(Json(manager)),
        None => Err(ApiError::not_found("No manager found")),
    }
}

/// GET /managers/:cognitoId/properties - owned properties with coordinates
async fn properties(
    auth: AuthUser,
    Path(cognito_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(&[Role::Manager])?;

    let sql = format!("{} WHERE p.manager_cognito_id = $1", builder::base_select());
    let pool = Database::pool().await?;

    let rows: Vec<PropertyWithLocationRow> = sqlx::query_as(&sql)
        .bind(&cognito_id)
        .fetch_all(pool)
        .await?;

    let properties: Vec<PropertyWithLocation> = rows.into_iter().map(Into::into).collect();
    Ok(Json(properties))
}
