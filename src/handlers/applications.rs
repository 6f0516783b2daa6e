use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::{Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json as SqlJson;
use sqlx::FromRow;

use crate::auth::Role;
use crate::database::Database;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::lease::{Lease, LeaseWithNextPayment, LEASE_JSON};
use crate::models::location::LocationSummary;
use crate::models::manager::MANAGER_JSON;
use crate::models::property::PROPERTY_JSON;
use crate::models::tenant::TENANT_JSON;
use crate::models::{Application, ApplicationStatus, Manager, Property, Tenant};

pub fn routes() -> Router {
    Router::new()
        .route("/applications", get(list).post(create))
        .route("/applications/:id/status", put(update_status))
}

/// Property as embedded in an application row: full listing plus the street
/// address and resolved location.
#[derive(Debug, Serialize, Deserialize)]
struct PropertySnapshot {
    #[serde(flatten)]
    property: Property,
    address: String,
    location: LocationSummary,
}

#[derive(Debug, FromRow)]
struct ApplicationListRow {
    #[sqlx(flatten)]
    application: Application,
    property: SqlJson<PropertySnapshot>,
    tenant: SqlJson<Tenant>,
    manager: SqlJson<Manager>,
}

#[derive(Debug, Serialize)]
struct ApplicationView {
    #[serde(flatten)]
    application: Application,
    property: PropertySnapshot,
    manager: Manager,
    tenant: Tenant,
    lease: Option<LeaseWithNextPayment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    user_id: Option<String>,
    user_type: Option<String>,
}

/// GET /applications?userId&userType - filtered application list with the
/// latest lease and its computed next payment date
async fn list(auth: AuthUser, Query(params): Query<ListParams>) -> Result<impl IntoResponse, ApiError> {
    auth.require(&[Role::Manager, Role::Tenant])?;

    let property_json = format!(
        "({}::jsonb || jsonb_build_object('address', l.address, 'location', {}::jsonb))",
        PROPERTY_JSON,
        crate::models::location::LOCATION_JSON
    );
    let base = format!(
        "SELECT a.*, {} AS property, {} AS tenant, {} AS manager \
         FROM applications a \
         JOIN properties p ON p.id = a.property_id \
         JOIN locations l ON l.id = p.location_id \
         JOIN managers m ON m.cognito_id = p.manager_cognito_id \
         JOIN tenants t ON t.cognito_id = a.tenant_cognito_id",
        property_json, TENANT_JSON, MANAGER_JSON
    );

    let pool = Database::pool().await?;
    let rows: Vec<ApplicationListRow> = match (params.user_type.as_deref(), params.user_id) {
        (Some("manager"), Some(user_id)) => {
            let sql = format!("{} WHERE p.manager_cognito_id = $1", base);
            sqlx::query_as(&sql).bind(user_id).fetch_all(pool).await?
        }
        (Some("tenant"), Some(user_id)) => {
            let sql = format!("{} WHERE a.tenant_cognito_id = $1", base);
            sqlx::query_as(&sql).bind(user_id).fetch_all(pool).await?
        }
        (None, None) => sqlx::query_as(&base).fetch_all(pool).await?,
        _ => {
            return Err(ApiError::bad_request(
                "userId and userType (manager|tenant) must be supplied together",
            ))
        }
    };

    let mut views = Vec::with_capacity(rows.len());
    for row in rows {
        // Most recent lease for this tenant/property pair, if any.
        let lease: Option<Lease> = sqlx::query_as(
            "SELECT * FROM leases WHERE tenant_cognito_id = $1 AND property_id = $2 \
             ORDER BY start_date DESC LIMIT 1",
        )
        .bind(&row.application.tenant_cognito_id)
        .bind(row.application.property_id)
        .fetch_optional(pool)
        .await?;

        views.push(ApplicationView {
            application: row.application,
            property: row.property.0,
            manager: row.manager.0,
            tenant: row.tenant.0,
            lease: lease.map(Into::into),
        });
    }

    Ok(Json(views))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateApplicationInput {
    property_id: i32,
    name: String,
    email: String,
    phone_number: String,
    message: Option<String>,
}

const INSERT_APPLICATION_SQL: &str = "INSERT INTO applications \
     (application_date, status, property_id, tenant_cognito_id, name, email, phone_number, message, lease_id) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *";

/// POST /applications - submit an application and its draft lease in one
/// transaction; both succeed or both fail
async fn create(
    auth: AuthUser,
    Json(input): Json<CreateApplicationInput>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(&[Role::Tenant])?;

    let pool = Database::pool().await?;

    let terms: Option<(Decimal, Decimal)> = sqlx::query_as(
        "SELECT price_per_month, security_deposit FROM properties WHERE id = $1",
    )
    .bind(input.property_id)
    .fetch_optional(pool)
    .await?;
    let Some((rent, deposit)) = terms else {
        return Err(ApiError::not_found("Property not found"));
    };

    let start_date = Utc::now();
    let end_date = start_date + Months::new(12);

    let mut tx = pool.begin().await?;

    let lease_id: i32 = sqlx::query_scalar(
        "INSERT INTO leases (start_date, end_date, rent, deposit, property_id, tenant_cognito_id) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(start_date)
    .bind(end_date)
    .bind(rent)
    .bind(deposit)
    .bind(input.property_id)
    .bind(&auth.cognito_id)
    .fetch_one(&mut *tx)
    .await?;

    let application: Application = sqlx::query_as(INSERT_APPLICATION_SQL)
        .bind(start_date)
        .bind(ApplicationStatus::Pending)
        .bind(input.property_id)
        .bind(&auth.cognito_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone_number)
        .bind(&input.message)
        .bind(lease_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(application_id = application.id, lease_id, "created application");
    Ok((StatusCode::CREATED, Json(application)))
}

#[derive(Debug, Deserialize)]
struct StatusInput {
    status: ApplicationStatus,
}

const LOCK_APPLICATION_SQL: &str = "SELECT * FROM applications WHERE id = $1 FOR UPDATE";

#[derive(Debug, FromRow)]
struct ApplicationDetailRow {
    #[sqlx(flatten)]
    application: Application,
    property: SqlJson<Property>,
    tenant: SqlJson<Tenant>,
    lease: Option<SqlJson<Lease>>,
}

#[derive(Debug, Serialize)]
struct ApplicationDetail {
    #[serde(flatten)]
    application: Application,
    property: Property,
    tenant: Tenant,
    lease: Option<Lease>,
}

/// PUT /applications/:id/status - approve or deny a pending application.
///
/// Approval creates the lease, registers the tenant as an occupant and links
/// the lease to the application inside one transaction. Applications that
/// are already decided conflict.
async fn update_status(
    auth: AuthUser,
    Path(id): Path<i32>,
    Json(input): Json<StatusInput>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(&[Role::Manager])?;

    if input.status == ApplicationStatus::Pending {
        return Err(ApiError::bad_request("status must be approved or denied"));
    }

    let pool = Database::pool().await?;
    let mut tx = pool.begin().await?;

    // Row lock serializes concurrent decisions; a second caller blocks here
    // and then sees the terminal status.
    let current: Option<Application> = sqlx::query_as(LOCK_APPLICATION_SQL)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(current) = current else {
        return Err(ApiError::not_found("Application not found"));
    };
    if current.status.is_terminal() {
        return Err(ApiError::conflict("Application has already been decided"));
    }

    if input.status == ApplicationStatus::Approved {
        let (rent, deposit): (Decimal, Decimal) = sqlx::query_as(
            "SELECT price_per_month, security_deposit FROM properties WHERE id = $1",
        )
        .bind(current.property_id)
        .fetch_one(&mut *tx)
        .await?;

        let start_date = Utc::now();
        let lease_id: i32 = sqlx::query_scalar(
            "INSERT INTO leases (start_date, end_date, rent, deposit, property_id, tenant_cognito_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(start_date)
        .bind(start_date + Months::new(12))
        .bind(rent)
        .bind(deposit)
        .bind(current.property_id)
        .bind(&current.tenant_cognito_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO property_tenants (property_id, tenant_cognito_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(current.property_id)
        .bind(&current.tenant_cognito_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE applications SET status = $2, lease_id = $3 WHERE id = $1")
            .bind(id)
            .bind(ApplicationStatus::Approved)
            .bind(lease_id)
            .execute(&mut *tx)
            .await?;

        tracing::info!(application_id = id, lease_id, "approved application");
    } else {
        sqlx::query("UPDATE applications SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(ApplicationStatus::Denied)
            .execute(&mut *tx)
            .await?;

        tracing::info!(application_id = id, "denied application");
    }

    tx.commit().await?;

    let sql = format!(
        "SELECT a.*, {} AS property, {} AS tenant, \
         CASE WHEN ls.id IS NOT NULL THEN {} END AS lease \
         FROM applications a \
         JOIN properties p ON p.id = a.property_id \
         JOIN tenants t ON t.cognito_id = a.tenant_cognito_id \
         LEFT JOIN leases ls ON ls.id = a.lease_id \
         WHERE a.id = $1",
        PROPERTY_JSON, TENANT_JSON, LEASE_JSON
    );
    let row: ApplicationDetailRow = sqlx::query_as(&sql).bind(id).fetch_one(pool).await?;

    Ok(Json(ApplicationDetail {
        application: row.application,
        property: row.property.0,
        tenant: row.tenant.0,
        lease: row.lease.map(|l| l.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_insert_has_a_placeholder_per_column() {
        let columns = INSERT_APPLICATION_SQL
            .split_once('(')
            .and_then(|(_, rest)| rest.split_once(')'))
            .map(|(cols, _)| cols.split(',').count())
            .unwrap();
        let placeholders = (1..)
            .take_while(|n| INSERT_APPLICATION_SQL.contains(&format!("${}", n)))
            .count();
        assert_eq!(columns, placeholders);
        assert_eq!(placeholders, 9);
        assert!(INSERT_APPLICATION_SQL.contains("lease_id"));
    }

    #[test]
    fn decisions_lock_the_application_row() {
        assert!(LOCK_APPLICATION_SQL.ends_with("FOR UPDATE"));
    }
}
