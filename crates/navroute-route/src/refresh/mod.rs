//! Route refresh merging
//!
//! Splices a partial refresh response into an existing route. The vehicle
//! may already be part way along the route, so refreshed data starts at
//! `leg_index` and, within that leg, at `leg_geometry_index`:
//!
//! ```text
//! leg:      0           1                 2
//!       [ kept ]  [ kept | refreshed ]  [ refreshed ]
//!                        ^
//!                leg_geometry_index
//! ```
//!
//! Merging never fails once the payload has been parsed; a leg whose
//! refresh data is unusable is merged in a degraded way and logged.

mod annotations;
mod road_objects;
mod steps;

use navroute_types::{
    DirectionsRefreshResponse, DirectionsRoute, DirectionsRouteRefresh, DirectionsWaypoint,
    LegAnnotation, RouteLeg, RouteLegRefresh, KEY_REFRESH_TTL,
};
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{RouteOperationError, RouteOperationResult};
use crate::optionally_refreshed::OptionallyRefreshedData;
use crate::types::{CongestionNumericOverride, ParsedRouteData};

use annotations::merge_annotation;
use road_objects::{merge_notifications, merge_road_objects, retain_within_leg};
use steps::{redistribute_step_durations, route_duration};

/// Result of merging a refresh into route data
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRefresh {
    pub data: ParsedRouteData,

    /// `Updated(ttl + response time)` when the refresh carried a TTL
    pub new_expiration_time_elapsed_seconds: OptionallyRefreshedData<Option<u64>>,
}

/// Parse a refresh response body into its refreshed route
pub fn parse_route_refresh(body: &[u8]) -> RouteOperationResult<DirectionsRouteRefresh> {
    let response = DirectionsRefreshResponse::from_slice(body)?;
    response.route.ok_or(RouteOperationError::MissingRefreshRoute)
}

/// Merge `refresh` into `data`.
///
/// Legs before `leg_index` are returned untouched. Within the first
/// refreshed leg new data starts at `leg_geometry_index` (0 when absent),
/// in later legs at 0.
pub fn merge_route_refresh(
    data: &ParsedRouteData,
    refresh: &DirectionsRouteRefresh,
    leg_index: usize,
    leg_geometry_index: Option<usize>,
    response_time_elapsed_seconds: u64,
    overridden_traffic: Option<&CongestionNumericOverride>,
) -> MergedRefresh {
    let route_id = data.id();
    let precision = data.route_options.polyline_precision();
    debug!(
        route_id = %route_id,
        leg_index = leg_index,
        leg_geometry_index = ?leg_geometry_index,
        "Merging route refresh"
    );

    let legs = data.route.legs.as_ref().map(|legs| {
        legs.iter()
            .enumerate()
            .map(|(index, leg)| {
                if index < leg_index {
                    return leg.clone();
                }
                let start = if index == leg_index {
                    leg_geometry_index.unwrap_or(0)
                } else {
                    0
                };
                let override_window = overridden_traffic.and_then(|traffic| traffic.window_for_leg(index));
                merge_leg(leg, refresh.leg(index), index, start, override_window, precision, &route_id)
            })
            .collect::<Vec<_>>()
    });

    let updated_waypoints = refresh.waypoints();
    let waypoints = replace_waypoints(data.waypoints.as_ref(), updated_waypoints.as_deref());

    let mut route = DirectionsRoute {
        waypoints: replace_waypoints(data.route.waypoints.as_ref(), updated_waypoints.as_deref()),
        legs,
        ..data.route.clone()
    };
    if let Some(duration) = route
        .legs
        .as_deref()
        .and_then(|legs| route_duration(legs, waypoints.as_ref()))
    {
        route.duration = duration;
    }

    let refresh_ttl = refresh.refresh_ttl();
    let new_expiration_time_elapsed_seconds = match refresh_ttl {
        Some(ttl) => {
            route
                .unrecognized
                .insert(KEY_REFRESH_TTL.to_string(), Value::from(ttl));
            OptionallyRefreshedData::Updated(Some(u64::from(ttl) + response_time_elapsed_seconds))
        }
        None => {
            route.unrecognized.remove(KEY_REFRESH_TTL);
            OptionallyRefreshedData::NoUpdates
        }
    };

    MergedRefresh {
        data: ParsedRouteData {
            route,
            waypoints,
            ..data.clone()
        },
        new_expiration_time_elapsed_seconds,
    }
}

fn merge_leg(
    leg: &RouteLeg,
    refreshed: Option<&RouteLegRefresh>,
    leg_index: usize,
    start: usize,
    override_window: Option<(usize, usize)>,
    precision: u32,
    route_id: &str,
) -> RouteLeg {
    let new_annotation = refreshed.and_then(|refreshed| refreshed.annotation.as_ref());
    let last = match new_annotation.and_then(LegAnnotation::size).filter(|size| *size > 0) {
        Some(size) => start + size - 1,
        None => {
            error!(
                route_id = %route_id,
                leg_index = leg_index,
                "Refresh annotation is missing or empty, merging road objects at the offset only"
            );
            start
        }
    };

    let annotation = merge_annotation(leg.annotation.as_ref(), new_annotation, start, override_window);
    let last_point_index = annotation
        .as_ref()
        .and_then(LegAnnotation::size)
        .filter(|size| *size > 0)
        .or_else(|| leg.point_count(precision).map(|points| points.saturating_sub(1)));

    let incidents = retain_within_leg(
        merge_road_objects(
            leg.incidents.as_ref(),
            refreshed.and_then(|refreshed| refreshed.incidents.as_ref()),
            start,
            last,
        ),
        last_point_index,
        leg_index,
        "incident",
    );
    let closures = retain_within_leg(
        merge_road_objects(
            leg.closures.as_ref(),
            refreshed.and_then(|refreshed| refreshed.closures.as_ref()),
            start,
            last,
        ),
        last_point_index,
        leg_index,
        "closure",
    );
    let notifications = retain_within_leg(
        merge_notifications(
            leg.notifications.as_ref(),
            refreshed.and_then(|refreshed| refreshed.notifications.as_ref()),
            start,
            last,
        ),
        last_point_index,
        leg_index,
        "notification",
    );

    let steps = leg
        .steps
        .as_ref()
        .map(|steps| redistribute_step_durations(steps, annotation.as_ref(), leg_index, precision));
    let duration = annotation
        .as_ref()
        .and_then(LegAnnotation::total_duration)
        .or(leg.duration);

    RouteLeg {
        duration,
        steps,
        annotation,
        incidents,
        closures,
        notifications,
        ..leg.clone()
    }
}

/// Replace waypoints positionally with the non-null refreshed ones
fn replace_waypoints(
    current: Option<&Vec<DirectionsWaypoint>>,
    updated: Option<&[Option<DirectionsWaypoint>]>,
) -> Option<Vec<DirectionsWaypoint>> {
    let current = current?;
    let Some(updated) = updated else {
        return Some(current.clone());
    };
    Some(
        current
            .iter()
            .enumerate()
            .map(|(index, waypoint)| {
                updated
                    .get(index)
                    .and_then(Option::as_ref)
                    .unwrap_or(waypoint)
                    .clone()
            })
            .collect(),
    )
}
