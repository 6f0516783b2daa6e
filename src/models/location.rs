use serde::{Deserialize, Serialize};

/// Postal address plus resolved point coordinates.
///
/// The geometry column never leaves the database in its native encoding;
/// queries extract numeric latitude/longitude with `ST_Y`/`ST_X` and embed
/// them in this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSummary {
    pub id: i32,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// SQL fragment rendering a `locations` row (alias `l`) as a
/// [`LocationSummary`] JSON object.
pub const LOCATION_JSON: &str = "json_build_object(\
 'id', l.id,\
 'address', l.address,\
 'city', l.city,\
 'state', l.state,\
 'country', l.country,\
 'postalCode', l.postal_code,\
 'coordinates', json_build_object(\
   'latitude', ST_Y(l.coordinates::geometry),\
   'longitude', ST_X(l.coordinates::geometry)))";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case() {
        let loc = LocationSummary {
            id: 1,
            address: "12 Main St".into(),
            city: "Austin".into(),
            state: "TX".into(),
            country: "USA".into(),
            postal_code: "78701".into(),
            coordinates: Coordinates {
                latitude: 30.26,
                longitude: -97.74,
            },
        };
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json["postalCode"], "78701");
        assert_eq!(json["coordinates"]["latitude"], 30.26);
    }

    #[test]
    fn json_fragment_round_trips_field_names() {
        // Every camelCase key emitted by the SQL fragment must deserialize.
        let sample = serde_json::json!({
            "id": 7,
            "address": "1 Elm",
            "city": "Denver",
            "state": "CO",
            "country": "USA",
            "postalCode": "80014",
            "coordinates": { "latitude": 39.7, "longitude": -104.9 }
        });
        let loc: LocationSummary = serde_json::from_value(sample).unwrap();
        assert_eq!(loc.coordinates.longitude, -104.9);
        for key in ["'address'", "'postalCode'", "'latitude'", "'longitude'"] {
            assert!(LOCATION_JSON.contains(key), "fragment missing {key}");
        }
    }
}
