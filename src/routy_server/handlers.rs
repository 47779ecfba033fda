use crate::LiveAggregator;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use futures::FutureExt;
use qstring::QString;
use routy::models::{RouteRequest, RouteRequestWithCurrent, RouteResponse};
use routy::{AggregationError, Coordinate, RouteEndpoint, RouteStops};
use serde_json::json;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(ping)
        .service(route_from_query)
        .service(route)
        .service(route_with_current);
}

#[actix_web::get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({"message": "Routy API is live!"}))
}

#[actix_web::get("/ping")]
async fn ping() -> impl Responder {
    HttpResponse::Ok().json(json!({"message": "pong"}))
}

#[actix_web::get("/route")]
async fn route_from_query(
    req: HttpRequest,
    aggregator: web::Data<Arc<LiveAggregator>>,
) -> impl Responder {
    let qs = QString::from(req.query_string());

    let (from, to) = match (non_empty(qs.get("from")), non_empty(qs.get("to"))) {
        (Some(from), Some(to)) => (from.to_string(), to.to_string()),
        _ => {
            return HttpResponse::BadRequest().json(json!({"error": "from and to are required"}));
        }
    };
    let interests = categories_from_query(&qs);

    guarded(async move {
        let result = aggregator
            .stops_between(&from, &to, None, &interests)
            .await;
        respond(from, to, result)
    })
    .await
}

#[actix_web::post("/route")]
async fn route(
    body: web::Json<RouteRequest>,
    aggregator: web::Data<Arc<LiveAggregator>>,
) -> impl Responder {
    let request = body.into_inner();

    guarded(async move {
        let result = aggregator
            .stops_between(&request.start, &request.end, None, &request.interests)
            .await;
        respond(request.start, request.end, result)
    })
    .await
}

#[actix_web::post("/route_with_current")]
async fn route_with_current(
    body: web::Json<RouteRequestWithCurrent>,
    aggregator: web::Data<Arc<LiveAggregator>>,
) -> impl Responder {
    let request = body.into_inner();
    let current = Coordinate::new(request.current.lat, request.current.lon);

    guarded(async move {
        let result = aggregator
            .stops_between(
                &request.start,
                &request.end,
                Some(current),
                &request.interests,
            )
            .await;
        respond(request.start, request.end, result)
    })
    .await
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Every `category` parameter, in order, e.g. `?category=kafe&category=park`.
pub fn categories_from_query(qs: &QString) -> Vec<String> {
    qs.to_pairs()
        .into_iter()
        .filter(|(key, value)| *key == "category" && !value.trim().is_empty())
        .map(|(_, value)| value.trim().to_string())
        .collect()
}

pub fn respond(
    start: String,
    end: String,
    result: Result<RouteStops, AggregationError>,
) -> HttpResponse {
    match result {
        Ok(found) => HttpResponse::Ok().json(RouteResponse {
            start,
            end,
            stops: found.stops,
            start_coord: found.start.as_lat_lon(),
            end_coord: found.end.as_lat_lon(),
        }),
        Err(err) if err.is_client_error() => {
            tracing::info!("rejecting route request: {}", err);
            let message = match err {
                AggregationError::Geocode {
                    endpoint: RouteEndpoint::Start,
                    ..
                } => "Invalid start location",
                AggregationError::Geocode {
                    endpoint: RouteEndpoint::End,
                    ..
                } => "Invalid end location",
            };
            HttpResponse::BadRequest().json(json!({ "error": message }))
        }
        Err(err) => {
            tracing::error!("geocoding failed: {}", err);
            HttpResponse::BadGateway().json(json!({"error": "Geocoding service unavailable"}))
        }
    }
}

/// Turns a panic inside a request into a plain 500.
pub async fn guarded<F>(handler: F) -> HttpResponse
where
    F: Future<Output = HttpResponse>,
{
    match AssertUnwindSafe(handler).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| String::from("unknown panic"));
            tracing::error!("request handler panicked: {}", reason);
            HttpResponse::InternalServerError().json(json!({"error": "Internal server error"}))
        }
    }
}
