//! Shared test fixtures

use navroute_types::{
    DirectionsResponse, DirectionsWaypoint, RouteOptions, ResponseOriginApi, RouterOrigin,
};
use serde_json::{json, Value};

use crate::ParsedRouteData;

pub(crate) fn route_options() -> RouteOptions {
    RouteOptions::new(
        "https://api.example.com",
        "driving-traffic",
        vec![[13.40, 52.50], [13.41, 52.51], [13.42, 52.52]],
    )
    .with_annotations(&["duration", "distance", "congestion_numeric"])
    .with_refresh(true)
}

/// Leg with 6 points split over steps of 3 and 4 points
fn leg_json() -> Value {
    json!({
        "distance": 50.0,
        "duration": 50.0,
        "summary": "leg",
        "annotation": {
            "distance": [10.0, 10.0, 10.0, 10.0, 10.0],
            "duration": [10.0, 10.0, 10.0, 10.0, 10.0],
            "congestion_numeric": [5, 5, 5, 5, 5]
        },
        "incidents": [
            { "id": "early", "type": "congestion", "geometry_index_start": 0, "geometry_index_end": 1 },
            { "id": "late", "type": "congestion", "geometry_index_start": 3, "geometry_index_end": 5 }
        ],
        "closures": [{ "geometry_index_start": 4, "geometry_index_end": 5 }],
        "steps": [
            {
                "distance": 20.0,
                "duration": 20.0,
                "geometry": { "type": "LineString", "coordinates": [[0.0, 0.0], [0.1, 0.0], [0.2, 0.0]] }
            },
            {
                "distance": 30.0,
                "duration": 30.0,
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[0.2, 0.0], [0.3, 0.0], [0.4, 0.0], [0.5, 0.0]]
                }
            }
        ]
    })
}

pub(crate) fn directions_response_json(uuid: &str) -> Value {
    json!({
        "code": "Ok",
        "uuid": uuid,
        "waypoints": [
            { "name": "origin", "location": [13.40, 52.50] },
            { "name": "stop", "location": [13.41, 52.51] },
            { "name": "destination", "location": [13.42, 52.52] }
        ],
        "routes": [
            {
                "distance": 100.0,
                "duration": 100.0,
                "refresh_ttl": 120,
                "legs": [leg_json(), leg_json()]
            },
            {
                "distance": 120.0,
                "duration": 130.0,
                "legs": [leg_json(), leg_json()]
            }
        ]
    })
}

/// First route of [`directions_response_json`] as parsed route data
pub(crate) fn route_data(uuid: &str) -> ParsedRouteData {
    let response: DirectionsResponse =
        serde_json::from_value(directions_response_json(uuid)).unwrap();
    let mut route = response.routes[0].clone();
    route.route_index = Some(0);
    route.request_uuid = Some(uuid.to_string());

    ParsedRouteData {
        route,
        waypoints: response.waypoints,
        request_uuid: Some(uuid.to_string()),
        route_options: route_options(),
        route_index: 0,
        router_origin: RouterOrigin::Online,
        response_origin_api: ResponseOriginApi::DirectionsApi,
    }
}

pub(crate) fn waypoint(name: &str, charge_time: Option<f64>) -> DirectionsWaypoint {
    let mut waypoint = json!({ "name": name, "location": [13.41, 52.51] });
    if let Some(charge_time) = charge_time {
        waypoint["metadata"] = json!({ "charge_time": charge_time });
    }
    serde_json::from_value(waypoint).unwrap()
}
