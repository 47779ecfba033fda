use std::fmt;

/// A single OSM tag match (`key=value`) sent to the POI provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InterestFilter {
    pub key: &'static str,
    pub value: &'static str,
}

impl InterestFilter {
    const fn new(key: &'static str, value: &'static str) -> Self {
        Self { key, value }
    }
}

impl fmt::Display for InterestFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

pub const CAFE: InterestFilter = InterestFilter::new("amenity", "cafe");
pub const RESTAURANT: InterestFilter = InterestFilter::new("amenity", "restaurant");
pub const PARK: InterestFilter = InterestFilter::new("leisure", "park");
pub const VIEWPOINT: InterestFilter = InterestFilter::new("tourism", "viewpoint");
pub const MUSEUM: InterestFilter = InterestFilter::new("tourism", "museum");
pub const BAR: InterestFilter = InterestFilter::new("amenity", "bar");
pub const CAR_REPAIR: InterestFilter = InterestFilter::new("shop", "car_repair");

/// Maps a client interest keyword to its OSM tag filter.
///
/// Matching is exact and case-sensitive. The Turkish keywords are the ones the
/// mobile client sends; the English ones are accepted as aliases. Anything else
/// falls back to restaurants.
pub fn map_interest_filter(interest: &str) -> InterestFilter {
    match interest {
        "kafe" | "cafe" => CAFE,
        "restoran" | "restaurant" => RESTAURANT,
        "park" => PARK,
        "manzara" | "gezilecek" | "viewpoint" | "sightseeing" => VIEWPOINT,
        "müze" | "museum" => MUSEUM,
        "bar" => BAR,
        "oto tamircisi" | "car_repair" => CAR_REPAIR,
        _ => RESTAURANT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keywords() {
        assert_eq!(map_interest_filter("kafe"), CAFE);
        assert_eq!(map_interest_filter("park"), PARK);
        assert_eq!(map_interest_filter("manzara"), VIEWPOINT);
        assert_eq!(map_interest_filter("gezilecek"), VIEWPOINT);
        assert_eq!(map_interest_filter("müze"), MUSEUM);
        assert_eq!(map_interest_filter("oto tamircisi"), CAR_REPAIR);
        assert_eq!(map_interest_filter("bar").to_string(), "amenity=bar");
    }

    #[test]
    fn unknown_keywords_fall_back_to_restaurants() {
        assert_eq!(map_interest_filter("kütüphane"), RESTAURANT);
        assert_eq!(map_interest_filter(""), RESTAURANT);
        // case-sensitive
        assert_eq!(map_interest_filter("Kafe"), RESTAURANT);
        assert_eq!(map_interest_filter("\"];out;"), RESTAURANT);
    }
}
