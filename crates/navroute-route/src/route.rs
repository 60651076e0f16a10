//! Navigation route value

use std::sync::Arc;

use navroute_core::ElapsedClock;
use navroute_types::{
    Closure, DirectionsRefreshResponse, DirectionsResponse, DirectionsRoute, DirectionsWaypoint,
    ResponseOriginApi, RouteOptions, RouterOrigin,
};
use tracing::{debug, info};

use crate::error::RouteOperationResult;
use crate::operations::{
    deserialize_state, DecodedRouteOperations, NativeRouteHandle, NativeRouteOperations,
    RouteOperations, RouteUpdate,
};
use crate::types::{CongestionNumericOverride, ParsedRouteData, RouteRefreshMetadata};

/// Immutable snapshot of a route.
///
/// Refreshes and updates return a new value; the original stays valid.
#[derive(Debug, Clone)]
pub struct NavigationRoute {
    id: String,
    data: Arc<ParsedRouteData>,
    operations: RouteOperations,
    expiration_time_elapsed_seconds: Option<u64>,
    unavoidable_closures: Vec<Vec<Closure>>,
    refresh_metadata: Option<RouteRefreshMetadata>,
    overridden_traffic: Option<CongestionNumericOverride>,
}

impl NavigationRoute {
    // ========== Construction ==========

    /// Parse every route of a directions response body.
    ///
    /// `response_time_elapsed_seconds` is the clock reading when the response
    /// arrived; it anchors the refresh TTL of each route.
    pub fn parse_directions_response(
        body: &[u8],
        route_options: &RouteOptions,
        router_origin: RouterOrigin,
        response_time_elapsed_seconds: u64,
    ) -> RouteOperationResult<Vec<NavigationRoute>> {
        let response = DirectionsResponse::from_slice(body)?;
        let per_route_waypoints = route_options.waypoints_per_route == Some(true);

        let routes: Vec<NavigationRoute> = response
            .routes
            .iter()
            .enumerate()
            .map(|(index, route)| {
                let route = DirectionsRoute {
                    route_index: Some(index),
                    request_uuid: response.uuid.clone(),
                    ..route.clone()
                };
                let waypoints = if per_route_waypoints {
                    route.waypoints.clone()
                } else {
                    response.waypoints.clone()
                };
                let expiration = route
                    .refresh_ttl()
                    .map(|ttl| u64::from(ttl) + response_time_elapsed_seconds);
                let unavoidable_closures = route
                    .legs
                    .iter()
                    .flatten()
                    .map(|leg| leg.closures.clone().unwrap_or_default())
                    .collect();

                let data = ParsedRouteData {
                    route,
                    waypoints,
                    request_uuid: response.uuid.clone(),
                    route_options: route_options.clone(),
                    route_index: index,
                    router_origin,
                    response_origin_api: ResponseOriginApi::DirectionsApi,
                };
                Self::decoded(data, expiration, unavoidable_closures)
            })
            .collect();

        info!(
            uuid = ?response.uuid,
            routes = routes.len(),
            origin = %router_origin,
            "Parsed directions response"
        );
        Ok(routes)
    }

    /// Create a decoded route
    pub fn decoded(
        data: ParsedRouteData,
        expiration_time_elapsed_seconds: Option<u64>,
        unavoidable_closures: Vec<Vec<Closure>>,
    ) -> Self {
        let data = Arc::new(data);
        Self {
            id: data.id(),
            operations: RouteOperations::Decoded(DecodedRouteOperations::new(data.clone(), None)),
            data,
            expiration_time_elapsed_seconds,
            unavoidable_closures,
            refresh_metadata: None,
            overridden_traffic: None,
        }
    }

    /// Wrap a route owned by the native engine
    pub fn from_native(
        handle: Arc<dyn NativeRouteHandle>,
        data: ParsedRouteData,
        expiration_time_elapsed_seconds: Option<u64>,
        unavoidable_closures: Vec<Vec<Closure>>,
    ) -> Self {
        let data = Arc::new(data);
        Self {
            id: data.id(),
            operations: RouteOperations::Native(NativeRouteOperations::new(handle, data.clone())),
            data,
            expiration_time_elapsed_seconds,
            unavoidable_closures,
            refresh_metadata: None,
            overridden_traffic: None,
        }
    }

    /// Restore a route written by [`NavigationRoute::serialize`].
    ///
    /// Restored routes are decoded, considered outdated, and carry no
    /// overridden traffic.
    pub fn deserialize(value: &str) -> RouteOperationResult<Self> {
        let restored = deserialize_state(value)?;
        let mut route = Self::decoded(
            restored.data,
            restored.expiration_time_elapsed_seconds,
            restored.unavoidable_closures,
        );
        route.refresh_metadata = Some(RouteRefreshMetadata::new(false));
        Ok(route)
    }

    // ========== Accessors ==========

    /// Route identifier, `{request_uuid}#{route_index}`
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data(&self) -> &ParsedRouteData {
        &self.data
    }

    pub fn directions_route(&self) -> &DirectionsRoute {
        &self.data.route
    }

    pub fn waypoints(&self) -> Option<&[DirectionsWaypoint]> {
        self.data.waypoints.as_deref()
    }

    pub fn route_options(&self) -> &RouteOptions {
        &self.data.route_options
    }

    pub fn request_uuid(&self) -> Option<&str> {
        self.data.request_uuid.as_deref()
    }

    pub fn route_index(&self) -> usize {
        self.data.route_index
    }

    pub fn router_origin(&self) -> RouterOrigin {
        self.data.router_origin
    }

    pub fn response_origin_api(&self) -> ResponseOriginApi {
        self.data.response_origin_api
    }

    pub fn expiration_time_elapsed_seconds(&self) -> Option<u64> {
        self.expiration_time_elapsed_seconds
    }

    pub fn unavoidable_closures(&self) -> &[Vec<Closure>] {
        &self.unavoidable_closures
    }

    pub fn refresh_metadata(&self) -> Option<RouteRefreshMetadata> {
        self.refresh_metadata
    }

    pub fn overridden_traffic(&self) -> Option<&CongestionNumericOverride> {
        self.overridden_traffic.as_ref()
    }

    pub fn operations(&self) -> &RouteOperations {
        &self.operations
    }

    /// Whether the route is owned by the native engine
    pub fn is_native(&self) -> bool {
        matches!(self.operations, RouteOperations::Native(_))
    }

    /// Whether the refresh TTL has run out
    pub fn is_expired(&self, clock: &dyn ElapsedClock) -> bool {
        self.expiration_time_elapsed_seconds
            .is_some_and(|expiration| clock.elapsed_seconds() >= expiration)
    }

    /// Copy with a different expiration time
    pub fn with_expiration_time_elapsed_seconds(&self, expiration: Option<u64>) -> Self {
        Self {
            expiration_time_elapsed_seconds: expiration,
            ..self.clone()
        }
    }

    // ========== Operations ==========

    /// Merge a refresh response body into a new route
    pub fn refresh(
        &self,
        payload: &[u8],
        leg_index: usize,
        leg_geometry_index: Option<usize>,
        response_time_elapsed_seconds: u64,
    ) -> RouteOperationResult<Self> {
        let update = self.operations.refresh(
            payload,
            leg_index,
            leg_geometry_index,
            response_time_elapsed_seconds,
        )?;
        debug!(route_id = %self.id, operations = self.operations.name(), "Route refreshed");
        Ok(self.apply_update(update))
    }

    /// Apply local changes and produce a new route
    pub fn client_side_update<R, W>(
        &self,
        route_block: R,
        waypoints_block: W,
        overridden_traffic: Option<CongestionNumericOverride>,
        refresh_metadata: Option<RouteRefreshMetadata>,
    ) -> RouteOperationResult<Self>
    where
        R: FnOnce(DirectionsRoute) -> DirectionsRoute,
        W: FnOnce(Option<Vec<DirectionsWaypoint>>) -> Option<Vec<DirectionsWaypoint>>,
    {
        let update = self.operations.client_side_route_update(
            route_block,
            waypoints_block,
            overridden_traffic,
            refresh_metadata,
        )?;
        Ok(self.apply_update(update))
    }

    /// Current traffic data as a refresh response
    pub fn to_directions_refresh_response(&self) -> RouteOperationResult<DirectionsRefreshResponse> {
        self.operations.to_directions_refresh_response()
    }

    /// Serialize into a versioned JSON state
    pub fn serialize(&self) -> RouteOperationResult<String> {
        self.operations
            .serialize(&self.unavoidable_closures, self.expiration_time_elapsed_seconds)
    }

    fn apply_update(&self, update: RouteUpdate) -> Self {
        let RouteUpdate {
            model,
            refresh_metadata,
            new_expiration_time_elapsed_seconds,
            overridden_traffic,
        } = update;

        Self {
            id: model.data.id(),
            data: model.data,
            operations: model.operations,
            expiration_time_elapsed_seconds: new_expiration_time_elapsed_seconds
                .apply(self.expiration_time_elapsed_seconds),
            unavoidable_closures: self.unavoidable_closures.clone(),
            refresh_metadata: refresh_metadata.or(self.refresh_metadata),
            overridden_traffic: overridden_traffic.apply(self.overridden_traffic.clone()),
        }
    }
}
