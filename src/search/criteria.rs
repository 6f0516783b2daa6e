use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::SearchError;
use crate::models::PropertyType;

/// Sentinel accepted by `beds`, `baths` and `propertyType` meaning
/// "no constraint".
const ANY: &str = "any";

/// Raw query-string shape of `GET /properties`. Everything arrives as text;
/// [`SearchCriteria::parse`] produces the typed criteria set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub favorite_ids: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub beds: Option<String>,
    pub baths: Option<String>,
    pub property_type: Option<String>,
    pub square_feet_min: Option<String>,
    pub square_feet_max: Option<String>,
    pub amenities: Option<String>,
    pub available_from: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

/// Typed filter criteria. Each field is independently optional; an absent
/// field contributes no predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    pub favorite_ids: Option<Vec<i32>>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub min_beds: Option<i32>,
    pub min_baths: Option<f64>,
    pub property_type: Option<PropertyType>,
    pub square_feet_min: Option<i32>,
    pub square_feet_max: Option<i32>,
    pub amenities: Option<Vec<String>>,
    pub available_from: Option<DateTime<Utc>>,
    /// Center point as (latitude, longitude).
    pub center: Option<(f64, f64)>,
}

impl SearchCriteria {
    pub fn parse(params: &SearchParams) -> Result<Self, SearchError> {
        let mut criteria = SearchCriteria::default();

        if let Some(raw) = non_empty(&params.favorite_ids) {
            // A value of only separators parses to an empty list, which as a
            // predicate would match nothing; treat it as absent instead.
            let ids = parse_id_list("favoriteIds", raw)?;
            if !ids.is_empty() {
                criteria.favorite_ids = Some(ids);
            }
        }
        if let Some(raw) = non_empty(&params.price_min) {
            criteria.price_min = Some(parse_number("priceMin", raw)?);
        }
        if let Some(raw) = non_empty(&params.price_max) {
            criteria.price_max = Some(parse_number("priceMax", raw)?);
        }
        if let Some(raw) = sentinel_filtered(&params.beds) {
            criteria.min_beds = Some(parse_number("beds", raw)?);
        }
        if let Some(raw) = sentinel_filtered(&params.baths) {
            criteria.min_baths = Some(parse_number("baths", raw)?);
        }
        if let Some(raw) = sentinel_filtered(&params.property_type) {
            criteria.property_type =
                Some(raw.parse::<PropertyType>().map_err(|_| {
                    SearchError::InvalidCriterion {
                        field: "propertyType",
                        value: raw.to_string(),
                    }
                })?);
        }
        if let Some(raw) = non_empty(&params.square_feet_min) {
            criteria.square_feet_min = Some(parse_number("squareFeetMin", raw)?);
        }
        if let Some(raw) = non_empty(&params.square_feet_max) {
            criteria.square_feet_max = Some(parse_number("squareFeetMax", raw)?);
        }
        if let Some(raw) = non_empty(&params.amenities) {
            let amenities: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !amenities.is_empty() {
                criteria.amenities = Some(amenities);
            }
        }
        if let Some(raw) = non_empty(&params.available_from) {
            criteria.available_from = Some(parse_date("availableFrom", raw)?);
        }

        criteria.center = match (
            non_empty(&params.latitude),
            non_empty(&params.longitude),
        ) {
            (Some(lat), Some(lng)) => Some((
                parse_number("latitude", lat)?,
                parse_number("longitude", lng)?,
            )),
            (None, None) => None,
            _ => return Err(SearchError::IncompleteCenterPoint),
        };

        Ok(criteria)
    }
}

fn non_empty(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Like [`non_empty`] but also treats the `"any"` sentinel as absent.
fn sentinel_filtered(raw: &Option<String>) -> Option<&str> {
    non_empty(raw).filter(|s| !s.eq_ignore_ascii_case(ANY))
}

fn parse_number<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, SearchError> {
    raw.parse().map_err(|_| SearchError::InvalidCriterion {
        field,
        value: raw.to_string(),
    })
}

fn parse_id_list(field: &'static str, raw: &str) -> Result<Vec<i32>, SearchError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_number(field, s))
        .collect()
}

/// Accepts RFC 3339 timestamps or plain dates (treated as midnight UTC).
fn parse_date(field: &'static str, raw: &str) -> Result<DateTime<Utc>, SearchError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
        .map_err(|_| SearchError::InvalidCriterion {
            field,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn empty_params_yield_empty_criteria() {
        let criteria = SearchCriteria::parse(&SearchParams::default()).unwrap();
        assert_eq!(criteria, SearchCriteria::default());
    }

    #[test]
    fn sentinel_values_contribute_nothing() {
        let params = SearchParams {
            beds: Some("any".into()),
            baths: Some("Any".into()),
            property_type: Some("any".into()),
            ..Default::default()
        };
        let criteria = SearchCriteria::parse(&params).unwrap();
        assert!(criteria.min_beds.is_none());
        assert!(criteria.min_baths.is_none());
        assert!(criteria.property_type.is_none());
    }

    #[test]
    fn comma_lists_are_split_and_trimmed() {
        let params = SearchParams {
            favorite_ids: Some("1, 2,3".into()),
            amenities: Some("pool, gym".into()),
            ..Default::default()
        };
        let criteria = SearchCriteria::parse(&params).unwrap();
        assert_eq!(criteria.favorite_ids, Some(vec![1, 2, 3]));
        assert_eq!(criteria.amenities, Some(vec!["pool".into(), "gym".into()]));
    }

    #[test]
    fn separator_only_lists_are_treated_as_absent() {
        let params = SearchParams {
            favorite_ids: Some(", ,".into()),
            amenities: Some(",".into()),
            ..Default::default()
        };
        let criteria = SearchCriteria::parse(&params).unwrap();
        assert!(criteria.favorite_ids.is_none());
        assert!(criteria.amenities.is_none());
    }

    #[test]
    fn one_bound_does_not_require_the_other() {
        let params = SearchParams {
            price_min: Some("800".into()),
            ..Default::default()
        };
        let criteria = SearchCriteria::parse(&params).unwrap();
        assert_eq!(criteria.price_min, Some(Decimal::new(800, 0)));
        assert!(criteria.price_max.is_none());
    }

    #[test]
    fn dates_accept_rfc3339_and_plain_dates() {
        let params = SearchParams {
            available_from: Some("2025-09-01".into()),
            ..Default::default()
        };
        let criteria = SearchCriteria::parse(&params).unwrap();
        assert_eq!(
            criteria.available_from,
            Some(Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap())
        );

        let params = SearchParams {
            available_from: Some("2025-09-01T08:30:00Z".into()),
            ..Default::default()
        };
        assert!(SearchCriteria::parse(&params).is_ok());
    }

    #[test]
    fn half_a_center_point_is_rejected() {
        let params = SearchParams {
            latitude: Some("40.7".into()),
            ..Default::default()
        };
        assert!(matches!(
            SearchCriteria::parse(&params),
            Err(SearchError::IncompleteCenterPoint)
        ));
    }

    #[test]
    fn bad_numbers_name_the_field() {
        let params = SearchParams {
            price_min: Some("cheap".into()),
            ..Default::default()
        };
        let err = SearchCriteria::parse(&params).unwrap_err();
        assert!(err.to_string().contains("priceMin"));
    }
}
