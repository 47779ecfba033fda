use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name given to places whose provider record carries no `name` tag.
pub const UNKNOWN_PLACE_NAME: &str = "Bilinmeyen";

// composite identity keys round coordinates to 6 decimals (~0.1 m)
const IDENTITY_SCALE: f64 = 1_000_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn as_lat_lon(&self) -> [f64; 2] {
        [self.lat, self.lon]
    }
}

/// Ordered driving geometry between two endpoints, produced once per request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoutePolyline {
    points: Vec<Coordinate>,
}

impl RoutePolyline {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl From<Vec<Coordinate>> for RoutePolyline {
    fn from(points: Vec<Coordinate>) -> Self {
        Self::new(points)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsmElementKind {
    Node,
    Way,
    Relation,
}

impl OsmElementKind {
    fn as_str(&self) -> &'static str {
        match self {
            OsmElementKind::Node => "node",
            OsmElementKind::Way => "way",
            OsmElementKind::Relation => "relation",
        }
    }
}

/// Provider-native identity of an OSM element, rendered as `node/123`.
///
/// Ids are only unique within one element kind, so the kind is part of the key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OsmElementRef {
    pub kind: OsmElementKind,
    pub id: i64,
}

impl fmt::Display for OsmElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.as_str(), self.id)
    }
}

impl FromStr for OsmElementRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once('/')
            .ok_or_else(|| format!("invalid osm element reference: {}", s))?;

        let kind = match kind {
            "node" => OsmElementKind::Node,
            "way" => OsmElementKind::Way,
            "relation" => OsmElementKind::Relation,
            other => return Err(format!("unknown osm element kind: {}", other)),
        };

        let id = id
            .parse::<i64>()
            .map_err(|e| format!("invalid osm element id in {}: {}", s, e))?;

        Ok(OsmElementRef { kind, id })
    }
}

impl TryFrom<String> for OsmElementRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OsmElementRef> for String {
    fn from(value: OsmElementRef) -> Self {
        value.to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    /// The interest keyword this place was requested under, not the raw OSM tag.
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osm_element: Option<OsmElementRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PlaceIdentity {
    Element(OsmElementRef),
    Composite {
        name: String,
        lat_e6: i64,
        lon_e6: i64,
    },
}

impl Place {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn identity(&self) -> PlaceIdentity {
        match self.osm_element {
            Some(element) => PlaceIdentity::Element(element),
            None => PlaceIdentity::Composite {
                name: self.name.clone(),
                lat_e6: (self.latitude * IDENTITY_SCALE).round() as i64,
                lon_e6: (self.longitude * IDENTITY_SCALE).round() as i64,
            },
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RouteRequest {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub interests: Vec<String>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct CurrentLocation {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RouteRequestWithCurrent {
    pub start: String,
    pub end: String,
    pub current: CurrentLocation,
    #[serde(default)]
    pub interests: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RouteResponse {
    pub start: String,
    pub end: String,
    pub stops: Vec<Place>,
    pub start_coord: [f64; 2],
    pub end_coord: [f64; 2],
}
