use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::location::LocationSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "property_type", rename_all = "lowercase")]
pub enum PropertyType {
    Rooms,
    Tinyhouse,
    Apartment,
    Villa,
    Townhouse,
    Cottage,
}

impl std::str::FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rooms" => Ok(PropertyType::Rooms),
            "tinyhouse" => Ok(PropertyType::Tinyhouse),
            "apartment" => Ok(PropertyType::Apartment),
            "villa" => Ok(PropertyType::Villa),
            "townhouse" => Ok(PropertyType::Townhouse),
            "cottage" => Ok(PropertyType::Cottage),
            other => Err(format!("unknown property type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub property_type: PropertyType,
    pub beds: i32,
    pub baths: f64,
    pub square_feet: i32,
    pub price_per_month: Decimal,
    pub security_deposit: Decimal,
    pub application_fee: Decimal,
    pub amenities: Vec<String>,
    pub highlights: Vec<String>,
    pub is_pets_allowed: bool,
    pub is_parking_included: bool,
    pub photo_urls: Vec<String>,
    pub average_rating: Option<f64>,
    pub number_of_reviews: Option<i32>,
    pub posted_date: DateTime<Utc>,
    pub manager_cognito_id: String,
    pub location_id: i32,
}

/// A property with its location embedded as a nested object, the shape every
/// property-returning endpoint responds with.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyWithLocation {
    #[serde(flatten)]
    pub property: Property,
    pub location: LocationSummary,
}

/// Row shape for queries selecting `p.*` plus a location JSON column.
#[derive(Debug, FromRow)]
pub struct PropertyWithLocationRow {
    #[sqlx(flatten)]
    pub property: Property,
    pub location: Json<LocationSummary>,
}

impl From<PropertyWithLocationRow> for PropertyWithLocation {
    fn from(row: PropertyWithLocationRow) -> Self {
        Self {
            property: row.property,
            location: row.location.0,
        }
    }
}

/// SQL fragment rendering a `properties` row (alias `p`) as a camelCase JSON
/// object matching [`Property`]'s serde representation.
pub const PROPERTY_JSON: &str = "json_build_object(\
 'id', p.id,\
 'name', p.name,\
 'description', p.description,\
 'propertyType', p.property_type,\
 'beds', p.beds,\
 'baths', p.baths,\
 'squareFeet', p.square_feet,\
 'pricePerMonth', p.price_per_month,\
 'securityDeposit', p.security_deposit,\
 'applicationFee', p.application_fee,\
 'amenities', p.amenities,\
 'highlights', p.highlights,\
 'isPetsAllowed', p.is_pets_allowed,\
 'isParkingIncluded', p.is_parking_included,\
 'photoUrls', p.photo_urls,\
 'averageRating', p.average_rating,\
 'numberOfReviews', p.number_of_reviews,\
 'postedDate', p.posted_date,\
 'managerCognitoId', p.manager_cognito_id,\
 'locationId', p.location_id)";
