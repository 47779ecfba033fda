use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_OSRM_URL: &str = "http://router.project-osrm.org";
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_USER_AGENT: &str = "routy-api/1.0";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// How sample points are picked from a route polyline.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub enum SamplingPlan {
    /// Every `len / max_samples`-th vertex, starting at the first.
    EvenStride { max_samples: usize },
    /// The first vertex, then each vertex at least `interval_meters` past the last kept one.
    DistanceInterval {
        interval_meters: f64,
        max_samples: usize,
    },
}

/// How the interests are fetched at one sample point.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SampleFetchMode {
    /// Concurrent fan-out over all interests; any failure drops the whole point.
    FanOut,
    /// Interests fetched one after another; a failed interest is skipped on its own.
    PerInterest,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AggregationSettings {
    pub fetch_radius_meters: f64,
    pub route_filter_meters: f64,
    pub proximity_meters: f64,
    pub max_stops: usize,
    pub cache_ttl_secs: u64,
    pub cache_key_precision: usize,
    pub sampling_plan: SamplingPlan,
    pub sample_fetch_mode: SampleFetchMode,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            fetch_radius_meters: 300.0,
            route_filter_meters: 3000.0,
            proximity_meters: 5000.0,
            max_stops: 15,
            cache_ttl_secs: 6 * 60 * 60,
            cache_key_precision: 4,
            sampling_plan: SamplingPlan::EvenStride { max_samples: 15 },
            sample_fetch_mode: SampleFetchMode::FanOut,
        }
    }
}

impl AggregationSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn from_ron_str(input: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str::<AggregationSettings>(input)?)
    }

    pub fn from_ron_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_ron_str(&data)
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub nominatim_url: String,
    pub osrm_url: String,
    pub overpass_url: String,
    pub user_agent: String,
    pub geocode_timeout: Duration,
    pub route_timeout: Duration,
    pub overpass_timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            osrm_url: DEFAULT_OSRM_URL.to_string(),
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            geocode_timeout: Duration::from_secs(10),
            route_timeout: Duration::from_secs(15),
            overpass_timeout: Duration::from_secs(25),
        }
    }
}

impl UpstreamConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            nominatim_url: env_or("NOMINATIM_URL", defaults.nominatim_url),
            osrm_url: env_or("OSRM_URL", defaults.osrm_url),
            overpass_url: env_or("OVERPASS_URL", defaults.overpass_url),
            user_agent: env_or("ROUTY_USER_AGENT", defaults.user_agent),
            geocode_timeout: env_secs_or("GEOCODE_TIMEOUT_SECS", defaults.geocode_timeout),
            route_timeout: env_secs_or("ROUTE_TIMEOUT_SECS", defaults.route_timeout),
            overpass_timeout: env_secs_or("OVERPASS_TIMEOUT_SECS", defaults.overpass_timeout),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default,
    }
}

fn env_secs_or(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
