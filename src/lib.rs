// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

#![deny(
    clippy::mutable_key_type,
    clippy::map_entry,
    clippy::boxed_local,
    clippy::let_unit_value,
    clippy::redundant_allocation,
    clippy::bool_comparison,
    clippy::bind_instead_of_map,
    clippy::vec_box,
    clippy::while_let_loop,
    clippy::useless_asref,
    clippy::repeat_once,
    clippy::deref_addrof,
    clippy::suspicious_map,
    clippy::arc_with_non_send_sync,
    clippy::single_char_pattern,
    clippy::for_kv_map,
    clippy::let_and_return,
    clippy::iter_nth,
    clippy::iter_cloned_collect,
    clippy::bytes_nth,
    clippy::match_result_ok,
    clippy::cmp_owned,
    clippy::cmp_null,
    clippy::op_ref
)]

pub mod aggregation;
pub mod config;
pub mod errors;
pub mod fan_out;
pub mod geo_distance;
pub mod geocoder;
pub mod interest_filter;
pub mod models;
pub mod overpass;
pub mod poi_cache;
pub mod poi_fetch;
pub mod route_provider;
pub mod route_sampling;

#[cfg(test)]
mod test_route_pipeline;
#[cfg(test)]
mod test_support;

pub use aggregation::{AggregationError, RouteAggregator, RouteEndpoint, RouteStops};
pub use config::{AggregationSettings, UpstreamConfig};
pub use errors::RoutyError;
pub use models::{Coordinate, Place, RoutePolyline};
