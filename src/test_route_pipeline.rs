use crate::aggregation::RouteAggregator;
use crate::config::AggregationSettings;
use crate::models::{Coordinate, PlaceIdentity};
use crate::poi_cache::{MemoryCacheStore, PoiCache};
use crate::poi_fetch::PoiFetcher;
use crate::test_support::{FakeGeocoder, FakePoiProvider, FakeRouteProvider, node, straight_polyline};
use ahash::AHashSet;
use std::sync::Arc;

#[tokio::test]
async fn kafe_stops_between_a_and_b() {
    let settings = AggregationSettings::default();
    let polyline = straight_polyline(150);

    // every anchor sees the same landmark, one nearby cafe and one far outside the corridor
    let provider = Arc::new(FakePoiProvider::new(|anchor, filter| {
        assert_eq!(filter.value, "cafe");
        let index = ((anchor.lat - 41.0) * 1000.0).round() as i64;
        Ok(vec![
            node(1, 41.0, 29.0, Some("Galata Kahvesi")),
            node(1000 + index, anchor.lat + 0.0005, anchor.lon, None),
            node(5000 + index, anchor.lat, anchor.lon + 0.1, Some("Far Away")),
        ])
    }));

    let store = Arc::new(MemoryCacheStore::new());
    let cache = PoiCache::new(
        Arc::clone(&store),
        settings.cache_ttl(),
        settings.cache_key_precision,
    );
    let fetcher = PoiFetcher::new(Arc::clone(&provider), cache, settings.fetch_radius_meters);

    let aggregator = RouteAggregator::new(
        Arc::new(FakeGeocoder::new(&[
            ("A", Coordinate::new(41.0, 29.0)),
            ("B", Coordinate::new(41.149, 29.0)),
        ])),
        Arc::new(FakeRouteProvider::returning(polyline.clone())),
        fetcher,
        settings,
    );

    let result = aggregator
        .stops_between("A", "B", None, &[String::from("kafe")])
        .await
        .unwrap();

    // stride 10 over 150 points
    assert_eq!(provider.calls(), 15);
    let expected_anchors: Vec<Coordinate> = polyline.points().iter().step_by(10).copied().collect();
    assert_eq!(expected_anchors.len(), 15);
    assert_eq!(expected_anchors[14], polyline.points()[140]);
    assert_eq!(provider.anchors(), expected_anchors);
    assert_eq!(store.len(), 15);

    assert_eq!(result.stops.len(), 15);
    assert!(result.stops.len() <= aggregator.settings().max_stops);

    let identities: AHashSet<PlaceIdentity> = result.stops.iter().map(|p| p.identity()).collect();
    assert_eq!(identities.len(), result.stops.len());

    assert_eq!(result.stops[0].name, "Galata Kahvesi");
    assert!(result.stops.iter().all(|p| p.name != "Far Away"));
    assert!(result.stops.iter().all(|p| p.category == "kafe"));

    // a repeat request is served entirely from cache
    aggregator
        .stops_between("A", "B", None, &[String::from("kafe")])
        .await
        .unwrap();
    assert_eq!(provider.calls(), 15);
}
