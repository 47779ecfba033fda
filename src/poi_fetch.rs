use crate::errors::RoutyError;
use crate::interest_filter::map_interest_filter;
use crate::models::{Coordinate, OsmElementRef, Place, UNKNOWN_PLACE_NAME};
use crate::overpass::{OverpassElement, PoiProvider};
use crate::poi_cache::{CacheStore, PoiCache};
use ahash::AHashSet;
use std::sync::Arc;

/// One POI query: a single anchor, a single interest, a fixed radius.
pub struct PoiFetcher<P, S> {
    provider: Arc<P>,
    cache: PoiCache<S>,
    radius_meters: f64,
}

impl<P: PoiProvider, S: CacheStore> PoiFetcher<P, S> {
    pub fn new(provider: Arc<P>, cache: PoiCache<S>, radius_meters: f64) -> Self {
        Self {
            provider,
            cache,
            radius_meters,
        }
    }

    pub async fn fetch(&self, anchor: Coordinate, interest: &str) -> Result<Vec<Place>, RoutyError> {
        let cache_key = self.cache.key_for(interest, anchor);

        if let Some(cached) = self.cache.get(&cache_key).await {
            tracing::debug!("cache hit {} ({} places)", cache_key, cached.len());
            return Ok(cached);
        }
        tracing::debug!("cache miss {}", cache_key);

        let filter = map_interest_filter(interest);
        let elements = self
            .provider
            .query(anchor, self.radius_meters, filter)
            .await?;

        let places = normalize_elements(elements, interest);
        tracing::debug!(
            "fetched {} places for {:?} around ({:.6}, {:.6})",
            places.len(),
            interest,
            anchor.lat,
            anchor.lon
        );

        self.cache.set(&cache_key, &places).await;

        Ok(places)
    }
}

/// Turns raw provider elements into places, keeping the first of each element id.
pub fn normalize_elements(elements: Vec<OverpassElement>, interest: &str) -> Vec<Place> {
    let mut seen: AHashSet<OsmElementRef> = AHashSet::new();
    let mut places = Vec::with_capacity(elements.len());

    for element in elements {
        if !seen.insert(element.element_ref()) {
            continue;
        }

        match place_from_element(&element, interest) {
            Some(place) => places.push(place),
            None => tracing::debug!("skipping {} without coordinates", element.element_ref()),
        }
    }

    places
}

fn place_from_element(element: &OverpassElement, interest: &str) -> Option<Place> {
    let position = element.position()?;

    Some(Place {
        name: element
            .tag("name")
            .unwrap_or(UNKNOWN_PLACE_NAME)
            .to_string(),
        address: address_from_tags(element),
        phone: element
            .tag("phone")
            .or_else(|| element.tag("contact:phone"))
            .map(String::from),
        website: element
            .tag("website")
            .or_else(|| element.tag("contact:website"))
            .map(String::from),
        opening_hours: element.tag("opening_hours").map(String::from),
        latitude: position.lat,
        longitude: position.lon,
        category: interest.to_string(),
        rating: element
            .tag("stars")
            .and_then(|stars| stars.parse::<f64>().ok()),
        osm_element: Some(element.element_ref()),
    })
}

fn address_from_tags(element: &OverpassElement) -> Option<String> {
    let street = element.tag("addr:street");
    let number = element.tag("addr:housenumber");
    let city = element.tag("addr:city");

    let street_line = match (street, number) {
        (Some(street), Some(number)) => Some(format!("{} {}", street, number)),
        (Some(street), None) => Some(street.to_string()),
        _ => None,
    };

    match (street_line, city) {
        (Some(line), Some(city)) => Some(format!("{}, {}", line, city)),
        (Some(line), None) => Some(line),
        (None, Some(city)) => Some(city.to_string()),
        (None, None) => None,
    }
}
