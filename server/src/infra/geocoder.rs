use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::error;

use crate::models::Coordinate;
use crate::services::Geocoder;
use crate::utils::AppError;

const USER_AGENT: &str = concat!("plot-server/", env!("CARGO_PKG_VERSION"));

/// Geocoder against a Nominatim-compatible `/search` endpoint.
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

impl Place {
    fn coordinate(&self) -> Option<Coordinate> {
        let latitude = self.lat.parse().ok()?;
        let longitude = self.lon.parse().ok()?;
        Some(Coordinate::new(latitude, longitude))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, AppError> {
        let res = self
            .client
            .get(format!("{}/search", self.base_url))
            .header("User-Agent", USER_AGENT)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Geocoder connection error: {}", e);
                error!("{}", msg);
                AppError::ExternalServiceError(msg)
            })?;

        if !res.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Geocoder failed. Status: {}",
                res.status()
            )));
        }

        let places = res
            .json::<Vec<Place>>()
            .await
            .map_err(|e| AppError::DecodeError(format!("Invalid geocoder response: {}", e)))?;
        Ok(places.first().and_then(Place::coordinate))
    }
}

/// Used when no geocoder is configured; every lookup finds nothing.
pub struct DisabledGeocoder;

#[async_trait]
impl Geocoder for DisabledGeocoder {
    async fn geocode(&self, _address: &str) -> Result<Option<Coordinate>, AppError> {
        Ok(None)
    }
}
