use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::FromRow;

use super::SearchCriteria;
use crate::models::location::LOCATION_JSON;
use crate::models::PropertyType;

/// Approximate span of one degree of latitude, used to convert the
/// configured kilometer radius into coordinate-system units.
const KM_PER_DEGREE: f64 = 111.0;

/// A value bound into the search query at `$n`.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i32),
    Float(f64),
    Money(Decimal),
    Timestamp(DateTime<Utc>),
    PropertyType(PropertyType),
    IntArray(Vec<i32>),
    TextArray(Vec<String>),
}

/// Conjunctive predicate list over the `properties p JOIN locations l` base
/// query. Present criteria each contribute exactly one predicate; values are
/// always bound, never interpolated.
#[derive(Debug, Default)]
pub struct SearchQuery {
    conditions: Vec<String>,
    params: Vec<SqlParam>,
}

impl SearchQuery {
    pub fn from_criteria(criteria: &SearchCriteria, radius_km: f64) -> Self {
        let mut query = SearchQuery::default();

        if let Some(ids) = &criteria.favorite_ids {
            query.push("p.id = ANY(${})", SqlParam::IntArray(ids.clone()));
        }
        if let Some(min) = criteria.price_min {
            query.push("p.price_per_month >= ${}", SqlParam::Money(min));
        }
        if let Some(max) = criteria.price_max {
            query.push("p.price_per_month <= ${}", SqlParam::Money(max));
        }
        if let Some(beds) = criteria.min_beds {
            query.push("p.beds >= ${}", SqlParam::Int(beds));
        }
        if let Some(baths) = criteria.min_baths {
            query.push("p.baths >= ${}", SqlParam::Float(baths));
        }
        if let Some(min) = criteria.square_feet_min {
            query.push("p.square_feet >= ${}", SqlParam::Int(min));
        }
        if let Some(max) = criteria.square_feet_max {
            query.push("p.square_feet <= ${}", SqlParam::Int(max));
        }
        if let Some(property_type) = criteria.property_type {
            query.push("p.property_type = ${}", SqlParam::PropertyType(property_type));
        }
        if let Some(amenities) = &criteria.amenities {
            // Containment: the property's amenity set must be a superset.
            query.push("p.amenities @> ${}", SqlParam::TextArray(amenities.clone()));
        }
        if let Some(available_from) = criteria.available_from {
            query.push(
                "EXISTS (SELECT 1 FROM leases al WHERE al.property_id = p.id AND al.start_date >= ${})",
                SqlParam::Timestamp(available_from),
            );
        }
        if let Some((latitude, longitude)) = criteria.center {
            // ST_DWithin is inclusive at exactly the radius boundary.
            let degrees = radius_km / KM_PER_DEGREE;
            let lng = query.next_index();
            query.params.push(SqlParam::Float(longitude));
            let lat = query.next_index();
            query.params.push(SqlParam::Float(latitude));
            let dist = query.next_index();
            query.params.push(SqlParam::Float(degrees));
            query.conditions.push(format!(
                "ST_DWithin(l.coordinates::geometry, ST_SetSRID(ST_MakePoint(${}, ${}), 4326), ${})",
                lng, lat, dist
            ));
        }

        query
    }

    fn next_index(&self) -> usize {
        self.params.len() + 1
    }

    fn push(&mut self, template: &str, param: SqlParam) {
        let placeholder = format!("${}", self.next_index());
        self.conditions.push(template.replacen("${}", &placeholder, 1));
        self.params.push(param);
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    /// `WHERE …` clause, or an empty string when no criteria are present.
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Full search statement over the property/location join.
    pub fn to_sql(&self) -> String {
        format!("{}{}", base_select(), self.where_clause())
    }
}

/// Shared `SELECT` over properties joined with their location, the location
/// rendered as a nested JSON object with numeric coordinates.
pub fn base_select() -> String {
    format!(
        "SELECT p.*, {} AS location FROM properties p JOIN locations l ON p.location_id = l.id",
        LOCATION_JSON
    )
}

pub fn bind_params<'q, O>(
    mut query: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    params: &[SqlParam],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    for param in params {
        query = match param {
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Float(v) => query.bind(*v),
            SqlParam::Money(v) => query.bind(*v),
            SqlParam::Timestamp(v) => query.bind(*v),
            SqlParam::PropertyType(v) => query.bind(*v),
            SqlParam::IntArray(v) => query.bind(v.clone()),
            SqlParam::TextArray(v) => query.bind(v.clone()),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn criteria() -> SearchCriteria {
        SearchCriteria::default()
    }

    #[test]
    fn no_criteria_means_no_where_clause() {
        let query = SearchQuery::from_criteria(&criteria(), 1000.0);
        assert!(query.where_clause().is_empty());
        assert!(query.params().is_empty());
        assert!(query.to_sql().starts_with("SELECT p.*"));
        assert!(!query.to_sql().contains("WHERE"));
    }

    #[test]
    fn single_criterion_yields_single_predicate() {
        let query = SearchQuery::from_criteria(
            &SearchCriteria {
                min_beds: Some(2),
                ..criteria()
            },
            1000.0,
        );
        assert_eq!(query.conditions(), &["p.beds >= $1".to_string()]);
        assert_eq!(query.params(), &[SqlParam::Int(2)]);
    }

    #[test]
    fn predicates_are_conjunctive_and_numbered_in_order() {
        let query = SearchQuery::from_criteria(
            &SearchCriteria {
                favorite_ids: Some(vec![4, 8]),
                price_min: Some(Decimal::new(900, 0)),
                price_max: Some(Decimal::new(2100, 0)),
                min_beds: Some(1),
                min_baths: Some(1.5),
                property_type: Some(PropertyType::Villa),
                square_feet_min: Some(500),
                square_feet_max: Some(3000),
                amenities: Some(vec!["pool".into()]),
                available_from: Some(Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap()),
                center: Some((40.7, -74.0)),
            },
            1000.0,
        );
        // 10 criteria; the center point binds three parameters.
        assert_eq!(query.conditions().len(), 11);
        assert_eq!(query.params().len(), 13);
        let sql = query.to_sql();
        // 10 separators between predicates plus the AND inside the EXISTS subquery.
        assert_eq!(sql.matches(" AND ").count(), 11);
        for n in 1..=13 {
            assert!(sql.contains(&format!("${}", n)), "missing placeholder ${n}");
        }
    }

    #[test]
    fn price_min_alone_produces_only_lower_bound() {
        let query = SearchQuery::from_criteria(
            &SearchCriteria {
                price_min: Some(Decimal::new(800, 0)),
                ..criteria()
            },
            1000.0,
        );
        let sql = query.to_sql();
        assert!(sql.contains("p.price_per_month >= $1"));
        assert!(!sql.contains("<="));
    }

    #[test]
    fn amenities_use_array_containment() {
        let query = SearchQuery::from_criteria(
            &SearchCriteria {
                amenities: Some(vec!["pool".into(), "gym".into()]),
                ..criteria()
            },
            1000.0,
        );
        assert_eq!(query.conditions(), &["p.amenities @> $1".to_string()]);
        assert_eq!(
            query.params(),
            &[SqlParam::TextArray(vec!["pool".into(), "gym".into()])]
        );
    }

    #[test]
    fn availability_filters_on_future_lease_start() {
        let date = Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap();
        let query = SearchQuery::from_criteria(
            &SearchCriteria {
                available_from: Some(date),
                ..criteria()
            },
            1000.0,
        );
        let sql = query.to_sql();
        assert!(sql.contains("EXISTS (SELECT 1 FROM leases"));
        assert!(sql.contains("al.start_date >= $1"));
        assert_eq!(query.params(), &[SqlParam::Timestamp(date)]);
    }

    #[test]
    fn radius_converts_kilometers_to_degrees() {
        let query = SearchQuery::from_criteria(
            &SearchCriteria {
                center: Some((30.26, -97.74)),
                ..criteria()
            },
            1000.0,
        );
        let sql = query.to_sql();
        assert!(sql.contains("ST_DWithin(l.coordinates::geometry"));
        assert!(sql.contains("ST_SetSRID(ST_MakePoint($1, $2), 4326)"));
        // Longitude binds first, latitude second, then the degree radius.
        assert_eq!(
            query.params(),
            &[
                SqlParam::Float(-97.74),
                SqlParam::Float(30.26),
                SqlParam::Float(1000.0 / 111.0),
            ]
        );
    }

    #[test]
    fn favorite_ids_bind_as_array() {
        let query = SearchQuery::from_criteria(
            &SearchCriteria {
                favorite_ids: Some(vec![3, 14, 15]),
                ..criteria()
            },
            1000.0,
        );
        assert_eq!(query.conditions(), &["p.id = ANY($1)".to_string()]);
        assert_eq!(query.params(), &[SqlParam::IntArray(vec![3, 14, 15])]);
    }
}
