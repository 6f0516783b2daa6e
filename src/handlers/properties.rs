use axum::{
    extract::{Multipart, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures::future::try_join_all;
use rust_decimal::Decimal;

use crate::auth::Role;
use crate::config;
use crate::database::Database;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::lease::{LeaseWithTenant, LeaseWithTenantRow};
use crate::models::property::PropertyWithLocationRow;
use crate::models::{PropertyType, PropertyWithLocation};
use crate::search::{builder, SearchCriteria, SearchParams, SearchQuery};
use crate::services::geocoding::Address;
use crate::services::storage::PhotoUpload;
use crate::services::{Geocoder, PhotoStorage};

pub fn routes() -> Router {
    Router::new()
        .route("/properties", get(search).post(create))
        .route("/properties/:id", get(show))
        .route("/properties/:id/leases", get(property_leases))
}

/// GET /properties - search with query-string filter criteria
async fn search(Query(params): Query<SearchParams>) -> Result<impl IntoResponse, ApiError> {
    let criteria = SearchCriteria::parse(&params)?;
    let query = SearchQuery::from_criteria(&criteria, config::config().search.radius_km);

    let sql = query.to_sql();
    let pool = Database::pool().await?;
    let rows: Vec<PropertyWithLocationRow> =
        builder::bind_params(sqlx::query_as(&sql), query.params())
            .fetch_all(pool)
            .await?;

    let properties: Vec<PropertyWithLocation> = rows.into_iter().map(Into::into).collect();
    Ok(Json(properties))
}

/// GET /properties/:id - one property with resolved coordinates
async fn show(Path(id): Path<i32>) -> Result<impl IntoResponse, ApiError> {
    let sql = format!("{} WHERE p.id = $1", builder::base_select());
    let pool = Database::pool().await?;

    let row: Option<PropertyWithLocationRow> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Json(PropertyWithLocation::from(row))),
        None => Err(ApiError::not_found("Property not found")),
    }
}

/// GET /properties/:id/leases - leases for a property, newest start first
async fn property_leases(Path(id): Path<i32>) -> Result<impl IntoResponse, ApiError> {
    let sql = format!(
        "SELECT ls.*, {} AS tenant \
         FROM leases ls JOIN tenants t ON t.cognito_id = ls.tenant_cognito_id \
         WHERE ls.property_id = $1 ORDER BY ls.start_date DESC",
        crate::models::tenant::TENANT_JSON
    );
    let pool = Database::pool().await?;

    let rows: Vec<LeaseWithTenantRow> = sqlx::query_as(&sql).bind(id).fetch_all(pool).await?;
    let leases: Vec<LeaseWithTenant> = rows.into_iter().map(Into::into).collect();
    Ok(Json(leases))
}

#[derive(Debug, Default)]
struct CreatePropertyForm {
    name: Option<String>,
    description: Option<String>,
    property_type: Option<PropertyType>,
    beds: Option<i32>,
    baths: Option<f64>,
    square_feet: Option<i32>,
    price_per_month: Option<Decimal>,
    security_deposit: Option<Decimal>,
    application_fee: Option<Decimal>,
    amenities: Vec<String>,
    highlights: Vec<String>,
    is_pets_allowed: bool,
    is_parking_included: bool,
    manager_cognito_id: Option<String>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
    postal_code: Option<String>,
    photos: Vec<PhotoUpload>,
}

impl CreatePropertyForm {
    fn require<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
        value.ok_or_else(|| ApiError::unprocessable_entity(format!("Missing field: {}", field)))
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::unprocessable_entity(format!("Invalid value for {}: {}", field, raw)))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// POST /properties - create a listing from a multipart body (manager only).
///
/// Photos upload to object storage, the postal address is geocoded, then
/// location and property insert inside one transaction.
async fn create(auth: AuthUser, mut multipart: Multipart) -> Result<impl IntoResponse, ApiError> {
    auth.require(&[Role::Manager])?;

    let mut form = CreatePropertyForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "photos" {
            let file_name = field.file_name().unwrap_or("photo").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await?.to_vec();
            form.photos.push(PhotoUpload {
                file_name,
                content_type,
                bytes,
            });
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "name" => form.name = Some(value),
            "description" => form.description = Some(value),
            "propertyType" => form.property_type = Some(parse_field("propertyType", &value)?),
            "beds" => form.beds = Some(parse_field("beds", &value)?),
            "baths" => form.baths = Some(parse_field("baths", &value)?),
            "squareFeet" => form.square_feet = Some(parse_field("squareFeet", &value)?),
            "pricePerMonth" => form.price_per_month = Some(parse_field("pricePerMonth", &value)?),
            "securityDeposit" => {
                form.security_deposit = Some(parse_field("securityDeposit", &value)?)
            }
            "applicationFee" => form.application_fee = Some(parse_field("applicationFee", &value)?),
            "amenities" => form.amenities = split_list(&value),
            "highlights" => form.highlights = split_list(&value),
            "isPetsAllowed" => form.is_pets_allowed = value.trim().eq_ignore_ascii_case("true"),
            "isParkingIncluded" => {
                form.is_parking_included = value.trim().eq_ignore_ascii_case("true")
            }
            "managerCognitoId" => form.manager_cognito_id = Some(value),
            "address" => form.address = Some(value),
            "city" => form.city = Some(value),
            "state" => form.state = Some(value),
            "country" => form.country = Some(value),
            "postalCode" => form.postal_code = Some(value),
            other => tracing::debug!("ignoring unknown multipart field: {}", other),
        }
    }

    let address = Address {
        street: CreatePropertyForm::require(form.address.take(), "address")?,
        city: CreatePropertyForm::require(form.city.take(), "city")?,
        state: CreatePropertyForm::require(form.state.take(), "state")?,
        country: CreatePropertyForm::require(form.country.take(), "country")?,
        postal_code: CreatePropertyForm::require(form.postal_code.take(), "postalCode")?,
    };

    let storage = PhotoStorage::shared();
    let photo_urls: Vec<String> = try_join_all(
        form.photos
            .drain(..)
            .enumerate()
            .map(|(seq, photo)| storage.upload(seq, photo)),
    )
    .await?;

    let coordinates = Geocoder::shared().resolve(&address).await?;

    let pool = Database::pool().await?;
    let mut tx = pool.begin().await?;

    let location_id: i32 = sqlx::query_scalar(
        "INSERT INTO locations (address, city, state, country, postal_code, coordinates) \
         VALUES ($1, $2, $3, $4, $5, ST_SetSRID(ST_MakePoint($6, $7), 4326)) RETURNING id",
    )
    .bind(&address.street)
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.country)
    .bind(&address.postal_code)
    .bind(coordinates.longitude)
    .bind(coordinates.latitude)
    .fetch_one(&mut *tx)
    .await?;

    let property_id: i32 = sqlx::query_scalar(
        "INSERT INTO properties \
         (name, description, property_type, beds, baths, square_feet, price_per_month, \
          security_deposit, application_fee, amenities, highlights, is_pets_allowed, \
          is_parking_included, photo_urls, manager_cognito_id, location_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
         RETURNING id",
    )
    .bind(CreatePropertyForm::require(form.name.take(), "name")?)
    .bind(CreatePropertyForm::require(form.description.take(), "description")?)
    .bind(CreatePropertyForm::require(form.property_type.take(), "propertyType")?)
    .bind(CreatePropertyForm::require(form.beds.take(), "beds")?)
    .bind(CreatePropertyForm::require(form.baths.take(), "baths")?)
    .bind(CreatePropertyForm::require(form.square_feet.take(), "squareFeet")?)
    .bind(CreatePropertyForm::require(form.price_per_month.take(), "pricePerMonth")?)
    .bind(CreatePropertyForm::require(form.security_deposit.take(), "securityDeposit")?)
    .bind(CreatePropertyForm::require(form.application_fee.take(), "applicationFee")?)
    .bind(&form.amenities)
    .bind(&form.highlights)
    .bind(form.is_pets_allowed)
    .bind(form.is_parking_included)
    .bind(&photo_urls)
    .bind(CreatePropertyForm::require(form.manager_cognito_id.take(), "managerCognitoId")?)
    .bind(location_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    let sql = format!("{} WHERE p.id = $1", builder::base_select());
    let row: PropertyWithLocationRow = sqlx::query_as(&sql)
        .bind(property_id)
        .fetch_one(pool)
        .await?;

    tracing::info!(property_id, "created property listing");
    Ok((StatusCode::CREATED, Json(PropertyWithLocation::from(row))))
}
