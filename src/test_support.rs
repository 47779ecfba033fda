//! In-memory stand-ins for the upstream services, shared by the unit tests.

use crate::errors::RoutyError;
use crate::geocoder::Geocoder;
use crate::interest_filter::InterestFilter;
use crate::models::{Coordinate, OsmElementKind, RoutePolyline};
use crate::overpass::{OverpassCenter, OverpassElement, PoiProvider};
use crate::poi_cache::{CacheError, CacheStore};
use crate::route_provider::RouteProvider;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

type Responder =
    dyn Fn(Coordinate, InterestFilter) -> Result<Vec<OverpassElement>, RoutyError> + Send + Sync;

pub struct FakePoiProvider {
    responder: Box<Responder>,
    calls: AtomicUsize,
    anchors: Mutex<Vec<Coordinate>>,
}

impl FakePoiProvider {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(Coordinate, InterestFilter) -> Result<Vec<OverpassElement>, RoutyError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            anchors: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn anchors(&self) -> Vec<Coordinate> {
        self.anchors.lock().unwrap().clone()
    }
}

impl PoiProvider for FakePoiProvider {
    async fn query(
        &self,
        anchor: Coordinate,
        _radius_meters: f64,
        filter: InterestFilter,
    ) -> Result<Vec<OverpassElement>, RoutyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.anchors.lock().unwrap().push(anchor);
        (self.responder)(anchor, filter)
    }
}

pub fn node(id: i64, lat: f64, lon: f64, name: Option<&str>) -> OverpassElement {
    let mut tags = HashMap::new();
    if let Some(name) = name {
        tags.insert(String::from("name"), name.to_string());
    }

    OverpassElement {
        kind: OsmElementKind::Node,
        id,
        lat: Some(lat),
        lon: Some(lon),
        center: None,
        tags,
    }
}

pub fn way(id: i64, center_lat: f64, center_lon: f64, name: Option<&str>) -> OverpassElement {
    let mut element = node(id, center_lat, center_lon, name);
    element.kind = OsmElementKind::Way;
    element.lat = None;
    element.lon = None;
    element.center = Some(OverpassCenter {
        lat: center_lat,
        lon: center_lon,
    });
    element
}

pub struct FakeGeocoder {
    known: HashMap<String, Coordinate>,
}

impl FakeGeocoder {
    pub fn new(known: &[(&str, Coordinate)]) -> Self {
        Self {
            known: known
                .iter()
                .map(|(name, coordinate)| (name.to_string(), *coordinate))
                .collect(),
        }
    }
}

impl Geocoder for FakeGeocoder {
    async fn geocode(&self, place_name: &str) -> Result<Coordinate, RoutyError> {
        match place_name {
            "unreachable" => Err(RoutyError::Transport(String::from("geocoder timed out"))),
            _ => self
                .known
                .get(place_name)
                .copied()
                .ok_or_else(|| RoutyError::LocationNotFound {
                    query: place_name.to_string(),
                }),
        }
    }
}

pub struct FakeRouteProvider {
    polyline: Option<RoutePolyline>,
}

impl FakeRouteProvider {
    pub fn returning(polyline: RoutePolyline) -> Self {
        Self {
            polyline: Some(polyline),
        }
    }

    pub fn without_route() -> Self {
        Self { polyline: None }
    }
}

impl RouteProvider for FakeRouteProvider {
    async fn route(&self, _start: Coordinate, _end: Coordinate) -> Result<RoutePolyline, RoutyError> {
        self.polyline.clone().ok_or(RoutyError::RouteNotFound)
    }
}

/// Store whose every operation fails, to show the cache is never authoritative.
pub struct BrokenCacheStore;

impl CacheStore for BrokenCacheStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Err(CacheError::Backend(String::from("connection refused")))
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Backend(String::from("connection refused")))
    }
}

/// `count` vertices heading north from (41.0, 29.0), 0.001 degrees (~111 m) apart.
pub fn straight_polyline(count: usize) -> RoutePolyline {
    RoutePolyline::new(
        (0..count)
            .map(|i| Coordinate::new(41.0 + i as f64 * 0.001, 29.0))
            .collect(),
    )
}
