//! Operations of routes owned by the native engine

use std::fmt;
use std::sync::Arc;

use navroute_types::{DirectionsRoute, DirectionsWaypoint};
use tracing::debug;

use super::{RouteModel, RouteOperations, RouteUpdate};
use crate::error::{RouteOperationError, RouteOperationResult};
use crate::optionally_refreshed::OptionallyRefreshedData;
use crate::types::{ParsedRouteData, RouteRefreshMetadata};

/// Opaque route handle of the native engine
pub trait NativeRouteHandle: Send + Sync + fmt::Debug {
    /// Refresh the route with a raw refresh response body
    fn refresh(
        &self,
        payload: &[u8],
        leg_index: usize,
        leg_geometry_index: Option<usize>,
    ) -> Result<NativeRefreshedRoute, String>;

    /// Whether the engine can refresh this route at all
    fn supports_refresh(&self) -> bool {
        true
    }
}

/// Route produced by a native refresh
#[derive(Debug, Clone)]
pub struct NativeRefreshedRoute {
    pub handle: Arc<dyn NativeRouteHandle>,

    /// Decoded view of the refreshed route
    pub route: DirectionsRoute,

    pub waypoints: Option<Vec<DirectionsWaypoint>>,

    pub refresh_ttl: Option<u32>,
}

/// Operations delegating to a native route handle
#[derive(Debug, Clone)]
pub struct NativeRouteOperations {
    handle: Arc<dyn NativeRouteHandle>,
    data: Arc<ParsedRouteData>,
}

impl NativeRouteOperations {
    pub fn new(handle: Arc<dyn NativeRouteHandle>, data: Arc<ParsedRouteData>) -> Self {
        Self { handle, data }
    }

    pub fn handle(&self) -> &Arc<dyn NativeRouteHandle> {
        &self.handle
    }

    pub(crate) fn refresh(
        &self,
        payload: &[u8],
        leg_index: usize,
        leg_geometry_index: Option<usize>,
        response_time_elapsed_seconds: u64,
    ) -> RouteOperationResult<RouteUpdate> {
        if !self.handle.supports_refresh() {
            return Err(RouteOperationError::NotSupported { operation: "refresh" });
        }
        let refreshed = self
            .handle
            .refresh(payload, leg_index, leg_geometry_index)
            .map_err(RouteOperationError::NativeRefresh)?;
        debug!(route_id = %self.data.id(), "Native route refreshed");

        let data = Arc::new(ParsedRouteData {
            route: refreshed.route,
            waypoints: refreshed.waypoints,
            ..(*self.data).clone()
        });
        let new_expiration_time_elapsed_seconds = match refreshed.refresh_ttl {
            Some(ttl) => OptionallyRefreshedData::Updated(Some(u64::from(ttl) + response_time_elapsed_seconds)),
            None => OptionallyRefreshedData::NoUpdates,
        };

        Ok(RouteUpdate {
            model: RouteModel {
                operations: RouteOperations::Native(Self::new(refreshed.handle, data.clone())),
                data,
            },
            refresh_metadata: Some(RouteRefreshMetadata::new(true)),
            new_expiration_time_elapsed_seconds,
            overridden_traffic: OptionallyRefreshedData::NoUpdates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::route_data;

    /// Native handle echoing its route with a fixed duration
    #[derive(Debug)]
    struct EchoHandle {
        route: DirectionsRoute,
        fail: bool,
    }

    #[derive(Debug)]
    struct FrozenHandle;

    impl NativeRouteHandle for FrozenHandle {
        fn refresh(
            &self,
            _payload: &[u8],
            _leg_index: usize,
            _leg_geometry_index: Option<usize>,
        ) -> Result<NativeRefreshedRoute, String> {
            Err("unreachable".to_string())
        }

        fn supports_refresh(&self) -> bool {
            false
        }
    }

    impl NativeRouteHandle for EchoHandle {
        fn refresh(
            &self,
            payload: &[u8],
            _leg_index: usize,
            _leg_geometry_index: Option<usize>,
        ) -> Result<NativeRefreshedRoute, String> {
            if self.fail {
                return Err(String::from_utf8_lossy(payload).into_owned());
            }
            let route = DirectionsRoute {
                duration: 42.0,
                ..self.route.clone()
            };
            Ok(NativeRefreshedRoute {
                handle: Arc::new(EchoHandle {
                    route: route.clone(),
                    fail: false,
                }),
                route,
                waypoints: None,
                refresh_ttl: Some(30),
            })
        }
    }

    fn operations(fail: bool) -> RouteOperations {
        let data = Arc::new(route_data("native-uuid"));
        let handle = Arc::new(EchoHandle {
            route: data.route.clone(),
            fail,
        });
        RouteOperations::Native(NativeRouteOperations::new(handle, data))
    }

    #[test]
    fn test_refresh_delegates_to_handle() {
        let update = operations(false).refresh(b"{}", 0, None, 100).unwrap();

        assert_eq!(update.model.data.route.duration, 42.0);
        assert!(update.model.data.waypoints.is_none());
        assert_eq!(
            update.new_expiration_time_elapsed_seconds,
            OptionallyRefreshedData::Updated(Some(130))
        );
        assert!(matches!(update.model.operations, RouteOperations::Native(_)));
    }

    #[test]
    fn test_refresh_failure() {
        let error = operations(true).refresh(b"boom", 0, None, 100).unwrap_err();
        assert!(matches!(error, RouteOperationError::NativeRefresh(ref message) if message == "boom"));
    }

    #[test]
    fn test_refresh_not_supported_by_handle() {
        let data = Arc::new(route_data("frozen-uuid"));
        let ops = RouteOperations::Native(NativeRouteOperations::new(Arc::new(FrozenHandle), data));

        let error = ops.refresh(b"{}", 0, None, 100).unwrap_err();
        assert!(error.is_not_supported());
    }

    #[test]
    fn test_other_operations_not_supported() {
        let ops = operations(false);

        assert!(ops.to_directions_refresh_response().unwrap_err().is_not_supported());
        assert!(ops.serialize(&[], None).unwrap_err().is_not_supported());
        assert!(ops
            .client_side_route_update(|route| route, |waypoints| waypoints, None, None)
            .unwrap_err()
            .is_not_supported());
    }
}
