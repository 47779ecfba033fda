use crate::errors::RoutyError;
use crate::models::{Coordinate, Place};
use crate::overpass::PoiProvider;
use crate::poi_cache::CacheStore;
use crate::poi_fetch::PoiFetcher;

/// Fetches every interest around one anchor concurrently.
///
/// All-or-nothing: the first failing interest fails the whole call and the
/// results of its siblings are dropped. The per-interest lists are concatenated
/// without any cross-interest deduplication.
pub async fn fetch_all<P: PoiProvider, S: CacheStore>(
    fetcher: &PoiFetcher<P, S>,
    anchor: Coordinate,
    interests: &[String],
) -> Result<Vec<Place>, RoutyError> {
    let requests = interests
        .iter()
        .map(|interest| fetcher.fetch(anchor, interest))
        .collect::<Vec<_>>();

    let results = futures::future::try_join_all(requests).await?;

    Ok(results.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poi_cache::{MemoryCacheStore, PoiCache};
    use crate::test_support::{FakePoiProvider, node};
    use std::sync::Arc;
    use std::time::Duration;

    fn interests(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn concatenates_every_interest() {
        let provider = Arc::new(FakePoiProvider::new(|anchor, filter| {
            let id = match filter.value {
                "cafe" => 1,
                "bar" => 2,
                _ => 3,
            };
            Ok(vec![node(id, anchor.lat, anchor.lon, Some(filter.value))])
        }));
        let cache = PoiCache::new(Arc::new(MemoryCacheStore::new()), Duration::from_secs(60), 4);
        let fetcher = PoiFetcher::new(Arc::clone(&provider), cache, 300.0);

        let places = fetch_all(
            &fetcher,
            Coordinate::new(41.0, 29.0),
            &interests(&["kafe", "bar", "park"]),
        )
        .await
        .unwrap();

        assert_eq!(places.len(), 3);
        assert_eq!(provider.calls(), 3);
        let mut categories: Vec<&str> = places.iter().map(|p| p.category.as_str()).collect();
        categories.sort_unstable();
        assert_eq!(categories, vec!["bar", "kafe", "park"]);
    }

    #[tokio::test]
    async fn one_failing_interest_fails_the_whole_fan_out() {
        let provider = Arc::new(FakePoiProvider::new(|anchor, filter| {
            if filter.value == "bar" {
                Err(RoutyError::Transport(String::from("HTTP 429")))
            } else {
                Ok(vec![node(1, anchor.lat, anchor.lon, None)])
            }
        }));
        let cache = PoiCache::new(Arc::new(MemoryCacheStore::new()), Duration::from_secs(60), 4);
        let fetcher = PoiFetcher::new(Arc::clone(&provider), cache, 300.0);

        let result = fetch_all(
            &fetcher,
            Coordinate::new(41.0, 29.0),
            &interests(&["kafe", "bar", "park"]),
        )
        .await;

        assert!(matches!(result, Err(RoutyError::Transport(_))));
    }

    #[tokio::test]
    async fn no_interests_means_no_places() {
        let provider = Arc::new(FakePoiProvider::new(|_, _| Ok(vec![])));
        let cache = PoiCache::new(Arc::new(MemoryCacheStore::new()), Duration::from_secs(60), 4);
        let fetcher = PoiFetcher::new(Arc::clone(&provider), cache, 300.0);

        let places = fetch_all(&fetcher, Coordinate::new(41.0, 29.0), &[])
            .await
            .unwrap();

        assert!(places.is_empty());
        assert_eq!(provider.calls(), 0);
    }
}
