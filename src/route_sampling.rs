use crate::config::{AggregationSettings, SampleFetchMode, SamplingPlan};
use crate::errors::RoutyError;
use crate::fan_out::fetch_all;
use crate::geo_distance::haversine_distance;
use crate::models::{Coordinate, Place, PlaceIdentity, RoutePolyline};
use crate::overpass::PoiProvider;
use crate::poi_cache::CacheStore;
use crate::poi_fetch::PoiFetcher;
use ahash::AHashSet;

pub fn sampling_stride(point_count: usize, max_samples: usize) -> usize {
    (point_count / max_samples.max(1)).max(1)
}

/// Picks the anchors to query along a route. The first vertex is always included, the last is not guaranteed.
pub fn sample_polyline(polyline: &RoutePolyline, plan: SamplingPlan) -> Vec<Coordinate> {
    let points = polyline.points();

    match plan {
        SamplingPlan::EvenStride { max_samples } => {
            let stride = sampling_stride(points.len(), max_samples);
            points.iter().step_by(stride).copied().collect()
        }
        SamplingPlan::DistanceInterval {
            interval_meters,
            max_samples,
        } => {
            let mut samples: Vec<Coordinate> = Vec::new();

            for point in points {
                if samples.len() >= max_samples.max(1) {
                    break;
                }

                match samples.last() {
                    Some(last) if haversine_distance(*last, *point) < interval_meters => {}
                    _ => samples.push(*point),
                }
            }

            samples
        }
    }
}

/// Collects places for every interest at sampled points of the route.
///
/// A failing sample point is logged and skipped. The accumulated places are
/// deduplicated by identity, filtered to the route corridor and capped.
pub async fn fetch_along_route<P: PoiProvider, S: CacheStore>(
    fetcher: &PoiFetcher<P, S>,
    polyline: &RoutePolyline,
    interests: &[String],
    settings: &AggregationSettings,
) -> Result<Vec<Place>, RoutyError> {
    if polyline.is_empty() {
        return Err(RoutyError::RouteNotFound);
    }

    let samples = sample_polyline(polyline, settings.sampling_plan);
    tracing::info!(
        "sampling {} of {} route points for {} interests",
        samples.len(),
        polyline.len(),
        interests.len()
    );

    let mut seen: AHashSet<PlaceIdentity> = AHashSet::new();
    let mut accumulated: Vec<Place> = Vec::new();

    for (index, anchor) in samples.into_iter().enumerate() {
        let found = match settings.sample_fetch_mode {
            SampleFetchMode::FanOut => match fetch_all(fetcher, anchor, interests).await {
                Ok(found) => found,
                Err(err) => {
                    let err = RoutyError::partial(format!("sample point {}", index), err);
                    tracing::warn!("{}", err);
                    continue;
                }
            },
            SampleFetchMode::PerInterest => {
                let mut found = Vec::new();
                for interest in interests {
                    match fetcher.fetch(anchor, interest).await {
                        Ok(places) => found.extend(places),
                        Err(err) => {
                            let err = RoutyError::partial(
                                format!("sample point {} interest {:?}", index, interest),
                                err,
                            );
                            tracing::warn!("{}", err);
                        }
                    }
                }
                found
            }
        };

        for place in found {
            if seen.insert(place.identity()) {
                accumulated.push(place);
            }
        }
    }

    let mut stops = filter_along_route(polyline, accumulated, settings.route_filter_meters);
    stops.truncate(settings.max_stops);

    Ok(stops)
}

/// Keeps places within `max_meters` of `reference`, inclusive, in input order.
pub fn filter_near(places: Vec<Place>, reference: Coordinate, max_meters: f64) -> Vec<Place> {
    places
        .into_iter()
        .filter(|place| haversine_distance(reference, place.coordinate()) <= max_meters)
        .collect()
}

/// Keeps places within `max_meters` of at least one route vertex.
pub fn filter_along_route(polyline: &RoutePolyline, places: Vec<Place>, max_meters: f64) -> Vec<Place> {
    let before = places.len();

    let kept: Vec<Place> = places
        .into_iter()
        .filter(|place| {
            let position = place.coordinate();
            let near = polyline
                .points()
                .iter()
                .find(|vertex| haversine_distance(**vertex, position) <= max_meters);

            if let Some(vertex) = near {
                tracing::debug!(
                    "{} is within {} m of route vertex ({:.6}, {:.6})",
                    place.name,
                    max_meters,
                    vertex.lat,
                    vertex.lon
                );
            }

            near.is_some()
        })
        .collect();

    tracing::info!("{} of {} places lie along the route", kept.len(), before);

    kept
}
