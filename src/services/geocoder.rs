// src/services/geocoder.rs
//! Forward geocoding against the Mapbox Geocoding API
//!
//! Best-effort by contract: every failure mode (missing token, short
//! query, HTTP error, malformed payload, network failure) yields
//! `None` rather than an error. Callers treat "no coordinate" as a
//! normal outcome.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Country filter applied to every query; the price map is Brazil-only.
const COUNTRY_FILTER: &str = "br";

/// Minimum query length after trimming; anything shorter is rejected
/// before a network call is made.
const MIN_QUERY_LEN: usize = 2;

/// A (lat, lng) pair in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub lat: f64,
    pub lng: f64,
}

// Mapbox feature collection; `center` is [lng, lat]-ordered.
#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Option<Vec<Feature>>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    center: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct GeocoderService {
    token: Option<String>,
    client: Client,
}

impl GeocoderService {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
            client: Client::new(),
        }
    }

    /// Geocode a free-text place description (e.g. "Store Name, City")
    ///
    /// Returns the first matching coordinate, or `None` when nothing
    /// usable comes back. A single transient failure is a permanent
    /// "no result" for this call; callers may re-invoke.
    pub async fn forward(&self, query: &str) -> Option<GeoCoordinate> {
        let query = query.trim();
        if query.len() < MIN_QUERY_LEN {
            debug!("Geocoding skipped: query too short");
            return None;
        }

        let token = match &self.token {
            Some(t) => t,
            None => {
                warn!("Geocoding skipped: no API token configured");
                return None;
            }
        };

        let url = format!(
            "https://api.mapbox.com/geocoding/v5/mapbox.places/{}.json",
            urlencoding::encode(query)
        );

        let response = match self
            .client
            .get(&url)
            .query(&[
                ("access_token", token.as_str()),
                ("country", COUNTRY_FILTER),
                ("limit", "1"),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Geocoding request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Geocoding returned non-success status");
            return None;
        }

        let collection = match response.json::<FeatureCollection>().await {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to parse geocoding response");
                return None;
            }
        };

        let center = collection
            .features
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|f| f.center)?;

        // Provider order is [lng, lat]; output order is (lat, lng).
        if center.len() < 2 {
            warn!("Geocoding feature has malformed center coordinate");
            return None;
        }

        let coordinate = GeoCoordinate {
            lat: center[1],
            lng: center[0],
        };
        debug!(lat = coordinate.lat, lng = coordinate.lng, "Geocoding hit");
        Some(coordinate)
    }
}
