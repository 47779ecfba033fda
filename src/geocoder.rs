use crate::errors::RoutyError;
use crate::models::Coordinate;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

pub trait Geocoder: Send + Sync {
    /// Resolves a free-form place name to a coordinate.
    fn geocode(
        &self,
        place_name: &str,
    ) -> impl Future<Output = Result<Coordinate, RoutyError>> + Send;
}

// nominatim returns coordinates as strings
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
}

pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl NominatimGeocoder {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout,
        }
    }
}

fn first_result_coordinate(
    place_name: &str,
    results: Vec<NominatimResult>,
) -> Result<Coordinate, RoutyError> {
    let first = results
        .into_iter()
        .next()
        .ok_or_else(|| RoutyError::LocationNotFound {
            query: place_name.to_string(),
        })?;

    let lat = first.lat.parse::<f64>().map_err(|e| {
        RoutyError::Transport(format!("invalid latitude {:?} from geocoder: {}", first.lat, e))
    })?;
    let lon = first.lon.parse::<f64>().map_err(|e| {
        RoutyError::Transport(format!("invalid longitude {:?} from geocoder: {}", first.lon, e))
    })?;

    Ok(Coordinate::new(lat, lon))
}

impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, place_name: &str) -> Result<Coordinate, RoutyError> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));

        tracing::info!("geocoding {:?} via {}", place_name, url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .query(&[("q", place_name), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RoutyError::Transport(format!(
                "Nominatim error: {}",
                status
            )));
        }

        let body = response.bytes().await?;
        let results: Vec<NominatimResult> = serde_json::from_slice(&body)?;

        let coordinate = first_result_coordinate(place_name, results)?;
        tracing::debug!(
            "geocoded {:?} to ({}, {})",
            place_name,
            coordinate.lat,
            coordinate.lon
        );

        Ok(coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_first_result() {
        let results: Vec<NominatimResult> = serde_json::from_str(
            r#"[{"place_id": 1, "lat": "41.0082", "lon": "28.9784", "display_name": "Istanbul"},
                {"place_id": 2, "lat": "1.0", "lon": "2.0"}]"#,
        )
        .unwrap();

        let coordinate = first_result_coordinate("Istanbul", results).unwrap();
        assert_eq!(coordinate, Coordinate::new(41.0082, 28.9784));
    }

    #[test]
    fn zero_results_is_location_not_found() {
        let result = first_result_coordinate("Nowhere", vec![]);
        assert!(matches!(
            result,
            Err(RoutyError::LocationNotFound { query }) if query == "Nowhere"
        ));
    }

    #[test]
    fn unparsable_coordinates_are_transport_errors() {
        let results = vec![NominatimResult {
            lat: String::from("north"),
            lon: String::from("28.9"),
        }];

        assert!(matches!(
            first_result_coordinate("Istanbul", results),
            Err(RoutyError::Transport(_))
        ));
    }
}
