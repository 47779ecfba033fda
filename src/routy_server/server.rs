// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use clap::Parser;
use routy::geocoder::NominatimGeocoder;
use routy::overpass::OverpassClient;
use routy::poi_cache::{MemoryCacheStore, PoiCache};
use routy::poi_fetch::PoiFetcher;
use routy::route_provider::OsrmRouteProvider;
use routy::{AggregationSettings, RouteAggregator, UpstreamConfig};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

pub type LiveAggregator =
    RouteAggregator<NominatimGeocoder, OsrmRouteProvider, OverpassClient, MemoryCacheStore>;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0")]
    address: String,
    #[arg(short, long, default_value_t = 8080)]
    port: u16,
    #[arg(short, long, default_value_t = 4)]
    workers: usize,
    /// RON file overriding the aggregation thresholds
    #[arg(long)]
    settings: Option<PathBuf>,
    #[arg(long)]
    verbose: bool,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let settings = match &args.settings {
        Some(path) => AggregationSettings::from_ron_file(path)?,
        None => AggregationSettings::default(),
    };
    let upstream = UpstreamConfig::from_env();

    tracing::info!("settings: {:?}", settings);
    tracing::info!(
        "upstreams: nominatim {}, osrm {}, overpass {}",
        upstream.nominatim_url,
        upstream.osrm_url,
        upstream.overpass_url
    );

    let client = reqwest::Client::builder()
        .user_agent(upstream.user_agent.clone())
        .gzip(true)
        .build()?;

    let cache = PoiCache::new(
        Arc::new(MemoryCacheStore::new()),
        settings.cache_ttl(),
        settings.cache_key_precision,
    );
    let fetcher = PoiFetcher::new(
        Arc::new(OverpassClient::new(
            client.clone(),
            upstream.overpass_url.clone(),
            upstream.overpass_timeout,
        )),
        cache,
        settings.fetch_radius_meters,
    );

    let aggregator: Arc<LiveAggregator> = Arc::new(RouteAggregator::new(
        Arc::new(NominatimGeocoder::new(
            client.clone(),
            upstream.nominatim_url.clone(),
            upstream.geocode_timeout,
        )),
        Arc::new(OsrmRouteProvider::new(
            client,
            upstream.osrm_url.clone(),
            upstream.route_timeout,
        )),
        fetcher,
        settings,
    ));

    tracing::info!("listening on {}:{}", args.address, args.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Compress::default())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                tracing::debug!("rejecting request body: {}", err);
                actix_web::error::InternalError::from_response(
                    err,
                    HttpResponse::BadRequest().json(json!({"error": "Invalid request"})),
                )
                .into()
            }))
            .app_data(web::Data::new(Arc::clone(&aggregator)))
            .configure(handlers::config)
    })
    .workers(args.workers)
    .bind((args.address.as_str(), args.port))?
    .run()
    .await?;

    Ok(())
}
