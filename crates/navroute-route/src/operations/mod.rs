//! Route Operations
//!
//! Every route carries the operations of its provenance:
//!
//! - `Decoded`: route parsed into structured fields by this crate. Supports
//!   refresh, client side updates, conversion to a refresh response and
//!   serialization.
//! - `Native`: route parsed by the native engine into an opaque handle.
//!   Only refresh is supported; it is delegated to the handle.
//!
//! Unsupported operations fail with [`RouteOperationError::NotSupported`].

mod decoded;
mod native;

pub use decoded::{DecodedRouteOperations, SERIALIZATION_VERSION};
pub(crate) use decoded::{deserialize_state, RestoredRoute};
pub use native::{NativeRefreshedRoute, NativeRouteHandle, NativeRouteOperations};

use std::sync::Arc;

use navroute_types::{Closure, DirectionsRefreshResponse, DirectionsRoute, DirectionsWaypoint};

use crate::error::{RouteOperationError, RouteOperationResult};
use crate::optionally_refreshed::OptionallyRefreshedData;
use crate::types::{CongestionNumericOverride, ParsedRouteData, RouteRefreshMetadata};

/// Route data together with the operations bound to it
#[derive(Debug, Clone)]
pub struct RouteModel {
    pub data: Arc<ParsedRouteData>,
    pub operations: RouteOperations,
}

/// Result of an operation producing a new route
#[derive(Debug, Clone)]
pub struct RouteUpdate {
    pub model: RouteModel,

    /// `None` keeps the current metadata
    pub refresh_metadata: Option<RouteRefreshMetadata>,

    pub new_expiration_time_elapsed_seconds: OptionallyRefreshedData<Option<u64>>,

    pub overridden_traffic: OptionallyRefreshedData<Option<CongestionNumericOverride>>,
}

/// Operations of a route, by provenance
#[derive(Debug, Clone)]
pub enum RouteOperations {
    Decoded(DecodedRouteOperations),
    Native(NativeRouteOperations),
}

impl RouteOperations {
    /// Merge a refresh response body into the route
    pub fn refresh(
        &self,
        payload: &[u8],
        leg_index: usize,
        leg_geometry_index: Option<usize>,
        response_time_elapsed_seconds: u64,
    ) -> RouteOperationResult<RouteUpdate> {
        match self {
            RouteOperations::Decoded(ops) => {
                ops.refresh(payload, leg_index, leg_geometry_index, response_time_elapsed_seconds)
            }
            RouteOperations::Native(ops) => {
                ops.refresh(payload, leg_index, leg_geometry_index, response_time_elapsed_seconds)
            }
        }
    }

    /// Apply local changes to the route without a network round trip
    pub fn client_side_route_update<R, W>(
        &self,
        route_block: R,
        waypoints_block: W,
        overridden_traffic: Option<CongestionNumericOverride>,
        refresh_metadata: Option<RouteRefreshMetadata>,
    ) -> RouteOperationResult<RouteUpdate>
    where
        R: FnOnce(DirectionsRoute) -> DirectionsRoute,
        W: FnOnce(Option<Vec<DirectionsWaypoint>>) -> Option<Vec<DirectionsWaypoint>>,
    {
        match self {
            RouteOperations::Decoded(ops) => Ok(ops.client_side_route_update(
                route_block,
                waypoints_block,
                overridden_traffic,
                refresh_metadata,
            )),
            RouteOperations::Native(_) => Err(RouteOperationError::NotSupported {
                operation: "client side route update",
            }),
        }
    }

    /// Refresh response carrying the route's current traffic data
    pub fn to_directions_refresh_response(&self) -> RouteOperationResult<DirectionsRefreshResponse> {
        match self {
            RouteOperations::Decoded(ops) => ops.to_directions_refresh_response(),
            RouteOperations::Native(_) => Err(RouteOperationError::NotSupported {
                operation: "conversion to a refresh response",
            }),
        }
    }

    /// Serialize the route into a versioned JSON state
    pub fn serialize(
        &self,
        unavoidable_closures: &[Vec<Closure>],
        expiration_time_elapsed_seconds: Option<u64>,
    ) -> RouteOperationResult<String> {
        match self {
            RouteOperations::Decoded(ops) => ops.serialize(unavoidable_closures, expiration_time_elapsed_seconds),
            RouteOperations::Native(_) => Err(RouteOperationError::NotSupported {
                operation: "serialization",
            }),
        }
    }

    /// Provenance name for logging
    pub fn name(&self) -> &'static str {
        match self {
            RouteOperations::Decoded(_) => "decoded",
            RouteOperations::Native(_) => "native",
        }
    }
}
