//! Operations of routes decoded by this crate

use std::sync::Arc;

use navroute_types::{
    Closure, DirectionsRefreshResponse, DirectionsRoute, DirectionsRouteRefresh, DirectionsWaypoint,
    JsonProperties, ResponseOriginApi, RouteLegRefresh, RouteOptions, RouterOrigin, KEY_WAYPOINTS,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{RouteModel, RouteOperations, RouteUpdate};
use crate::error::{RouteOperationError, RouteOperationResult};
use crate::optionally_refreshed::OptionallyRefreshedData;
use crate::refresh::{merge_route_refresh, parse_route_refresh};
use crate::types::{CongestionNumericOverride, ParsedRouteData, RouteRefreshMetadata};

/// Version written into serialized routes
pub const SERIALIZATION_VERSION: u64 = 1;

const UNKNOWN_UUID: &str = "unknown-uuid";
const REFRESH_RESPONSE_CODE: &str = "200";

/// Operations bound to decoded route data
#[derive(Debug, Clone)]
pub struct DecodedRouteOperations {
    data: Arc<ParsedRouteData>,
    overridden_traffic: Option<CongestionNumericOverride>,
}

impl DecodedRouteOperations {
    /// Create operations over `data`
    pub fn new(data: Arc<ParsedRouteData>, overridden_traffic: Option<CongestionNumericOverride>) -> Self {
        Self {
            data,
            overridden_traffic,
        }
    }

    fn model(data: ParsedRouteData, overridden_traffic: Option<CongestionNumericOverride>) -> RouteModel {
        let data = Arc::new(data);
        RouteModel {
            operations: RouteOperations::Decoded(Self::new(data.clone(), overridden_traffic)),
            data,
        }
    }

    pub(crate) fn refresh(
        &self,
        payload: &[u8],
        leg_index: usize,
        leg_geometry_index: Option<usize>,
        response_time_elapsed_seconds: u64,
    ) -> RouteOperationResult<RouteUpdate> {
        let route_id = self.data.id();
        let refresh = parse_route_refresh(payload).map_err(|e| {
            debug!(route_id = %route_id, error = %e, "Failed to parse route refresh response");
            e
        })?;
        debug!(route_id = %route_id, "Parsed route refresh response");

        let merged = merge_route_refresh(
            &self.data,
            &refresh,
            leg_index,
            leg_geometry_index,
            response_time_elapsed_seconds,
            self.overridden_traffic.as_ref(),
        );

        Ok(RouteUpdate {
            model: Self::model(merged.data, self.overridden_traffic.clone()),
            refresh_metadata: Some(RouteRefreshMetadata::new(true)),
            new_expiration_time_elapsed_seconds: merged.new_expiration_time_elapsed_seconds,
            overridden_traffic: OptionallyRefreshedData::NoUpdates,
        })
    }

    pub(crate) fn client_side_route_update<R, W>(
        &self,
        route_block: R,
        waypoints_block: W,
        overridden_traffic: Option<CongestionNumericOverride>,
        refresh_metadata: Option<RouteRefreshMetadata>,
    ) -> RouteUpdate
    where
        R: FnOnce(DirectionsRoute) -> DirectionsRoute,
        W: FnOnce(Option<Vec<DirectionsWaypoint>>) -> Option<Vec<DirectionsWaypoint>>,
    {
        let data = ParsedRouteData {
            route: route_block(self.data.route.clone()),
            waypoints: waypoints_block(self.data.waypoints.clone()),
            ..(*self.data).clone()
        };

        RouteUpdate {
            model: Self::model(data, overridden_traffic.clone()),
            refresh_metadata,
            // expiration only moves with server data
            new_expiration_time_elapsed_seconds: OptionallyRefreshedData::NoUpdates,
            overridden_traffic: OptionallyRefreshedData::Updated(overridden_traffic),
        }
    }

    pub(crate) fn to_directions_refresh_response(&self) -> RouteOperationResult<DirectionsRefreshResponse> {
        let legs = self.data.route.legs.as_ref().map(|legs| {
            legs.iter()
                .map(|leg| RouteLegRefresh {
                    annotation: leg.annotation.clone(),
                    incidents: leg.incidents.clone(),
                    notifications: leg.notifications.clone(),
                    ..Default::default()
                })
                .collect()
        });

        let mut unrecognized = JsonProperties::new();
        if let Some(waypoints) = &self.data.waypoints {
            unrecognized.insert(KEY_WAYPOINTS.to_string(), serde_json::to_value(waypoints)?);
        }

        Ok(DirectionsRefreshResponse {
            code: REFRESH_RESPONSE_CODE.to_string(),
            message: None,
            route: Some(DirectionsRouteRefresh { legs, unrecognized }),
            unrecognized: JsonProperties::new(),
        })
    }

    pub(crate) fn serialize(
        &self,
        unavoidable_closures: &[Vec<Closure>],
        expiration_time_elapsed_seconds: Option<u64>,
    ) -> RouteOperationResult<String> {
        let state = SerializationState {
            version: SERIALIZATION_VERSION,
            route: self.data.route.clone(),
            route_options: self.data.route_options.clone(),
            waypoints: self.data.waypoints.clone(),
            route_index: self.data.route_index,
            router_origin: self.data.router_origin,
            unavoidable_closures: unavoidable_closures.to_vec(),
            response_origin_api: self.data.response_origin_api,
            response_uuid: self
                .data
                .request_uuid
                .clone()
                .unwrap_or_else(|| UNKNOWN_UUID.to_string()),
            expiration_time_elapsed_seconds,
            // restored routes are always considered outdated
            route_refresh_metadata: RouteRefreshMetadata::new(false),
        };
        Ok(serde_json::to_string(&state)?)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializationState {
    version: u64,
    route: DirectionsRoute,
    route_options: RouteOptions,
    waypoints: Option<Vec<DirectionsWaypoint>>,
    route_index: usize,
    router_origin: RouterOrigin,
    unavoidable_closures: Vec<Vec<Closure>>,
    response_origin_api: ResponseOriginApi,
    response_uuid: String,
    expiration_time_elapsed_seconds: Option<u64>,
    route_refresh_metadata: RouteRefreshMetadata,
}

/// Route restored from a serialized state
pub(crate) struct RestoredRoute {
    pub data: ParsedRouteData,
    pub unavoidable_closures: Vec<Vec<Closure>>,
    pub expiration_time_elapsed_seconds: Option<u64>,
}

pub(crate) fn deserialize_state(value: &str) -> RouteOperationResult<RestoredRoute> {
    let raw: Value = serde_json::from_str(value)?;
    let version = raw.get("version").and_then(Value::as_u64).unwrap_or(0);
    if version != SERIALIZATION_VERSION {
        return Err(RouteOperationError::UnsupportedVersion(version));
    }

    let state: SerializationState = serde_json::from_value(raw)?;
    Ok(RestoredRoute {
        data: ParsedRouteData {
            route: state.route,
            waypoints: state.waypoints,
            request_uuid: Some(state.response_uuid),
            route_options: state.route_options,
            route_index: state.route_index,
            router_origin: state.router_origin,
            response_origin_api: state.response_origin_api,
        },
        unavoidable_closures: state.unavoidable_closures,
        expiration_time_elapsed_seconds: state.expiration_time_elapsed_seconds,
    })
}
