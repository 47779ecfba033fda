use crate::config::AggregationSettings;
use crate::errors::RoutyError;
use crate::geocoder::Geocoder;
use crate::models::{Coordinate, Place};
use crate::overpass::PoiProvider;
use crate::poi_cache::CacheStore;
use crate::poi_fetch::PoiFetcher;
use crate::route_provider::RouteProvider;
use crate::route_sampling::{fetch_along_route, filter_near};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteEndpoint {
    Start,
    End,
}

impl fmt::Display for RouteEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteEndpoint::Start => write!(f, "start"),
            RouteEndpoint::End => write!(f, "end"),
        }
    }
}

/// Failures that abort a whole aggregation. Only geocoding is fatal.
#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("could not geocode {endpoint} location: {source}")]
    Geocode {
        endpoint: RouteEndpoint,
        #[source]
        source: RoutyError,
    },
}

impl AggregationError {
    pub fn is_client_error(&self) -> bool {
        match self {
            AggregationError::Geocode { source, .. } => source.is_client_error(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteStops {
    pub start: Coordinate,
    pub end: Coordinate,
    pub stops: Vec<Place>,
}

pub struct RouteAggregator<G, R, P, S> {
    geocoder: Arc<G>,
    router: Arc<R>,
    fetcher: PoiFetcher<P, S>,
    settings: AggregationSettings,
}

impl<G, R, P, S> RouteAggregator<G, R, P, S>
where
    G: Geocoder,
    R: RouteProvider,
    P: PoiProvider,
    S: CacheStore,
{
    pub fn new(
        geocoder: Arc<G>,
        router: Arc<R>,
        fetcher: PoiFetcher<P, S>,
        settings: AggregationSettings,
    ) -> Self {
        Self {
            geocoder,
            router,
            fetcher,
            settings,
        }
    }

    pub fn settings(&self) -> &AggregationSettings {
        &self.settings
    }

    /// Geocodes both ends, finds stops along the driving route and optionally
    /// narrows them to those near `current`.
    ///
    /// Route and POI failures yield an empty stop list rather than an error.
    pub async fn stops_between(
        &self,
        start: &str,
        end: &str,
        current: Option<Coordinate>,
        interests: &[String],
    ) -> Result<RouteStops, AggregationError> {
        let start_coord = self.geocode(start, RouteEndpoint::Start).await?;
        let end_coord = self.geocode(end, RouteEndpoint::End).await?;

        if interests.is_empty() {
            return Ok(RouteStops {
                start: start_coord,
                end: end_coord,
                stops: vec![],
            });
        }

        let stops = match self.router.route(start_coord, end_coord).await {
            Ok(polyline) => {
                match fetch_along_route(&self.fetcher, &polyline, interests, &self.settings).await
                {
                    Ok(stops) => stops,
                    Err(err) => {
                        tracing::warn!("no stops for {:?} -> {:?}: {}", start, end, err);
                        vec![]
                    }
                }
            }
            Err(err) => {
                tracing::warn!("no route for {:?} -> {:?}: {}", start, end, err);
                vec![]
            }
        };

        let stops = match current {
            Some(reference) => {
                let near = filter_near(stops, reference, self.settings.proximity_meters);
                tracing::info!(
                    "{} stops within {} m of current location",
                    near.len(),
                    self.settings.proximity_meters
                );
                near
            }
            None => stops,
        };

        tracing::info!("{} stops for {:?} -> {:?}", stops.len(), start, end);

        Ok(RouteStops {
            start: start_coord,
            end: end_coord,
            stops,
        })
    }

    async fn geocode(
        &self,
        place_name: &str,
        endpoint: RouteEndpoint,
    ) -> Result<Coordinate, AggregationError> {
        self.geocoder
            .geocode(place_name)
            .await
            .map_err(|source| AggregationError::Geocode { endpoint, source })
    }
}
