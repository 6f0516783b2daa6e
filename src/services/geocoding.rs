use once_cell::sync::Lazy;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config;
use crate::models::Coordinates;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Invalid geocoder base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Geocoder request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Postal address fields submitted with a new property.
#[derive(Debug, Clone)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
}

/// One hit from a Nominatim-style search response.
#[derive(Debug, Deserialize)]
struct GeocodeHit {
    lat: String,
    lon: String,
}

/// Resolves a postal address to a point via the configured geocoding
/// collaborator. Consumed only at property-creation time.
pub struct Geocoder {
    client: reqwest::Client,
}

static GEOCODER: Lazy<Geocoder> = Lazy::new(|| Geocoder {
    client: reqwest::Client::new(),
});

impl Geocoder {
    pub fn shared() -> &'static Geocoder {
        &GEOCODER
    }

    /// Look up the address, taking the first hit. An address the collaborator
    /// cannot resolve degrades to the (0, 0) point rather than failing the
    /// property creation.
    pub async fn resolve(&self, address: &Address) -> Result<Coordinates, GeocodeError> {
        let cfg = &config::config().geocoding;

        let mut url = Url::parse(&cfg.base_url)
            .map_err(|_| GeocodeError::InvalidBaseUrl(cfg.base_url.clone()))?;
        url.query_pairs_mut()
            .append_pair("street", &address.street)
            .append_pair("city", &address.city)
            .append_pair("state", &address.state)
            .append_pair("country", &address.country)
            .append_pair("postalcode", &address.postal_code)
            .append_pair("format", "json")
            .append_pair("limit", "1");

        let hits: Vec<GeocodeHit> = self
            .client
            .get(url)
            .header("User-Agent", &cfg.user_agent)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(Self::first_hit_coordinates(&hits))
    }

    fn first_hit_coordinates(hits: &[GeocodeHit]) -> Coordinates {
        match hits.first() {
            Some(hit) => {
                let latitude = hit.lat.parse().unwrap_or(0.0);
                let longitude = hit.lon.parse().unwrap_or(0.0);
                Coordinates { latitude, longitude }
            }
            None => {
                tracing::warn!("geocoder returned no hits; storing (0, 0)");
                Coordinates {
                    latitude: 0.0,
                    longitude: 0.0,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_hit_wins() {
        let hits = vec![
            GeocodeHit {
                lat: "30.2672".into(),
                lon: "-97.7431".into(),
            },
            GeocodeHit {
                lat: "0".into(),
                lon: "0".into(),
            },
        ];
        let coords = Geocoder::first_hit_coordinates(&hits);
        assert_eq!(coords.latitude, 30.2672);
        assert_eq!(coords.longitude, -97.7431);
    }

    #[test]
    fn no_hits_degrade_to_origin() {
        let coords = Geocoder::first_hit_coordinates(&[]);
        assert_eq!(coords.latitude, 0.0);
        assert_eq!(coords.longitude, 0.0);
    }

    #[test]
    fn unparseable_hit_degrades_to_origin() {
        let hits = vec![GeocodeHit {
            lat: "north-ish".into(),
            lon: "west".into(),
        }];
        let coords = Geocoder::first_hit_coordinates(&hits);
        assert_eq!(coords.latitude, 0.0);
        assert_eq!(coords.longitude, 0.0);
    }
}
