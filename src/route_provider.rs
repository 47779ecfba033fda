use crate::errors::RoutyError;
use crate::models::{Coordinate, RoutePolyline};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

pub trait RouteProvider: Send + Sync {
    /// Driving geometry between two points.
    fn route(
        &self,
        start: Coordinate,
        end: Coordinate,
    ) -> impl Future<Output = Result<RoutePolyline, RoutyError>> + Send;
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    // geojson order: [lon, lat]
    coordinates: Vec<[f64; 2]>,
}

pub struct OsrmRouteProvider {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl OsrmRouteProvider {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout,
        }
    }
}

fn polyline_from_response(response: OsrmResponse) -> Result<RoutePolyline, RoutyError> {
    let route = match response.routes.into_iter().next() {
        Some(route) => route,
        None => {
            tracing::debug!("osrm returned no routes (code {:?})", response.code);
            return Err(RoutyError::RouteNotFound);
        }
    };

    let points: Vec<Coordinate> = route
        .geometry
        .coordinates
        .into_iter()
        .map(|[lon, lat]| Coordinate::new(lat, lon))
        .collect();

    if points.is_empty() {
        return Err(RoutyError::RouteNotFound);
    }

    Ok(RoutePolyline::new(points))
}

impl RouteProvider for OsrmRouteProvider {
    async fn route(&self, start: Coordinate, end: Coordinate) -> Result<RoutePolyline, RoutyError> {
        let url = format!(
            "{}/route/v1/driving/{:.6},{:.6};{:.6},{:.6}",
            self.base_url.trim_end_matches('/'),
            start.lon,
            start.lat,
            end.lon,
            end.lat
        );

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        // OSRM answers "NoRoute" with a 400 and a JSON body
        let parsed = match serde_json::from_slice::<OsrmResponse>(&body) {
            Ok(parsed) => parsed,
            Err(err) if status.is_success() => return Err(err.into()),
            Err(_) => {
                return Err(RoutyError::Transport(format!("OSRM error: {}", status)));
            }
        };

        let polyline = polyline_from_response(parsed)?;
        tracing::info!("route has {} points", polyline.len());

        Ok(polyline)
    }
}
