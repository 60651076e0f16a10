//! Common types for route operations

use navroute_types::{DirectionsRoute, DirectionsWaypoint, ResponseOriginApi, RouteOptions, RouterOrigin};
use serde::{Deserialize, Serialize};

/// Route data as decoded from a directions response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRouteData {
    pub route: DirectionsRoute,

    /// Waypoints of this route (per-route or response level)
    pub waypoints: Option<Vec<DirectionsWaypoint>>,

    pub request_uuid: Option<String>,

    pub route_options: RouteOptions,

    pub route_index: usize,

    pub router_origin: RouterOrigin,

    pub response_origin_api: ResponseOriginApi,
}

impl ParsedRouteData {
    /// Route identifier, `{request_uuid}#{route_index}`
    pub fn id(&self) -> String {
        format!(
            "{}#{}",
            self.request_uuid.as_deref().unwrap_or_default(),
            self.route_index
        )
    }

    /// Request UUID, if present and not blank
    pub fn refreshable_uuid(&self) -> Option<&str> {
        self.request_uuid
            .as_deref()
            .filter(|uuid| !uuid.trim().is_empty())
    }
}

/// Refresh state of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRefreshMetadata {
    /// `false` once the route's traffic data may be stale
    pub is_up_to_date: bool,
}

impl RouteRefreshMetadata {
    pub fn new(is_up_to_date: bool) -> Self {
        Self { is_up_to_date }
    }
}

/// Client side congestion override of a leg section.
///
/// Refreshes keep the congestion inside
/// `[start_index, start_index + length)` of `leg_index` as it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CongestionNumericOverride {
    pub leg_index: usize,

    pub start_index: usize,

    pub length: usize,

    pub congestion_numeric: Vec<Option<i32>>,
}

impl CongestionNumericOverride {
    /// Overridden `(start, end_exclusive)` window if it applies to `leg_index`.
    ///
    /// A window whose end does not fit in `usize` applies nowhere.
    pub fn window_for_leg(&self, leg_index: usize) -> Option<(usize, usize)> {
        if self.leg_index != leg_index {
            return None;
        }
        let end = self.start_index.checked_add(self.length)?;
        Some((self.start_index, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_window() {
        let traffic = CongestionNumericOverride {
            leg_index: 1,
            start_index: 4,
            length: 3,
            congestion_numeric: vec![Some(90); 3],
        };
        assert_eq!(traffic.window_for_leg(1), Some((4, 7)));
        assert_eq!(traffic.window_for_leg(0), None);
    }

    #[test]
    fn test_override_window_overflow() {
        let traffic = CongestionNumericOverride {
            leg_index: 0,
            start_index: usize::MAX - 1,
            length: 2,
            congestion_numeric: vec![Some(90); 2],
        };
        assert_eq!(traffic.window_for_leg(0), None);
    }
}
