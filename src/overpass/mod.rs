use crate::errors::RoutyError;
use crate::interest_filter::InterestFilter;
use crate::models::{Coordinate, OsmElementKind, OsmElementRef};
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

/// Source of tagged map features around a point.
pub trait PoiProvider: Send + Sync {
    /// Every element matching `filter` within `radius_meters` of `anchor`.
    /// An empty list is a valid answer.
    fn query(
        &self,
        anchor: Coordinate,
        radius_meters: f64,
        filter: InterestFilter,
    ) -> impl Future<Output = Result<Vec<OverpassElement>, RoutyError>> + Send;
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct OverpassCenter {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub kind: OsmElementKind,
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<OverpassCenter>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl OverpassElement {
    pub fn element_ref(&self) -> OsmElementRef {
        OsmElementRef {
            kind: self.kind,
            id: self.id,
        }
    }

    /// Nodes report their own position, ways and relations the centroid from `out center`.
    pub fn position(&self) -> Option<Coordinate> {
        let own = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        };
        let center = self.center.map(|c| Coordinate::new(c.lat, c.lon));

        match self.kind {
            OsmElementKind::Node => own.or(center),
            OsmElementKind::Way | OsmElementKind::Relation => center.or(own),
        }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
    // set on server-side timeouts and memory exhaustion, which still answer 200
    remark: Option<String>,
}

/// Decodes an Overpass JSON body. A runtime remark means the element list is
/// truncated, so it is reported as a failure rather than an answer.
pub fn parse_overpass_response(body: &[u8]) -> Result<Vec<OverpassElement>, RoutyError> {
    let parsed: OverpassResponse = serde_json::from_slice(body)?;

    if let Some(remark) = parsed.remark.as_deref().map(str::trim) {
        if remark.starts_with("runtime error") || remark.starts_with("runtime remark") {
            return Err(RoutyError::Transport(format!("Overpass {}", remark)));
        }
        tracing::debug!("overpass remark: {}", remark);
    }

    Ok(parsed.elements)
}

fn escape_overpass_string(input: &str) -> String {
    input.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Builds an Overpass QL query matching nodes, ways and relations around a point.
pub fn build_overpass_query(
    anchor: Coordinate,
    radius_meters: f64,
    filter: InterestFilter,
    timeout_secs: u64,
) -> String {
    let selector = format!(
        "[\"{}\"=\"{}\"]",
        escape_overpass_string(filter.key),
        escape_overpass_string(filter.value)
    );
    let around = format!(
        "(around:{:.0},{:.6},{:.6})",
        radius_meters, anchor.lat, anchor.lon
    );

    format!(
        "[out:json][timeout:{timeout}];\n(\n  node{selector}{around};\n  way{selector}{around};\n  relation{selector}{around};\n);\nout center;",
        timeout = timeout_secs,
        selector = selector,
        around = around,
    )
}

pub struct OverpassClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl OverpassClient {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

impl PoiProvider for OverpassClient {
    async fn query(
        &self,
        anchor: Coordinate,
        radius_meters: f64,
        filter: InterestFilter,
    ) -> Result<Vec<OverpassElement>, RoutyError> {
        let query = build_overpass_query(anchor, radius_meters, filter, self.timeout.as_secs());

        tracing::debug!(
            "overpass query {} around ({:.6}, {:.6})",
            filter,
            anchor.lat,
            anchor.lon
        );

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .form(&[("data", query.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RoutyError::Transport(format!(
                "Overpass API error: {}",
                status
            )));
        }

        let body = response.bytes().await?;

        parse_overpass_response(&body)
    }
}
