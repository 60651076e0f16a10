//! Directions response model
//!
//! Mirrors the JSON shape returned by the routing backend:
//!
//! ```text
//! DirectionsResponse
//!   ├── waypoints[]
//!   └── routes[]
//!         └── legs[]
//!               ├── annotation { distance[], duration[], congestion[], ... }
//!               ├── incidents[] / closures[] / notifications[]
//!               └── steps[] (each with its own geometry)
//! ```
//!
//! Every struct keeps the properties it does not model in a flattened
//! `unrecognized` map, so a parse/serialize pass is lossless.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::annotation::LegAnnotation;
use crate::road_object::{Closure, Incident, Notification};
use crate::{JsonProperties, ModelError, ModelResult};

/// Unrecognized route property holding the refresh TTL in seconds
pub const KEY_REFRESH_TTL: &str = "refresh_ttl";

/// Unrecognized refresh property holding updated waypoints
pub const KEY_WAYPOINTS: &str = "waypoints";

const KEY_WAYPOINT_METADATA: &str = "metadata";
const KEY_CHARGE_TIME: &str = "charge_time";

/// Top level directions response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DirectionsResponse {
    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,

    /// Response level waypoints (absent when waypoints are returned per route)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waypoints: Option<Vec<DirectionsWaypoint>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(flatten)]
    pub unrecognized: JsonProperties,
}

impl DirectionsResponse {
    /// Parse a response body
    pub fn from_slice(body: &[u8]) -> ModelResult<Self> {
        Ok(serde_json::from_slice(body)?)
    }
}

/// A single route of a directions response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DirectionsRoute {
    pub distance: f64,

    pub duration: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_typical: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legs: Option<Vec<RouteLeg>>,

    /// Per-route waypoints (present when `waypoints_per_route` was requested)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waypoints: Option<Vec<DirectionsWaypoint>>,

    /// Position of the route inside its response, assigned on parse
    #[serde(rename = "routeIndex", default, skip_serializing_if = "Option::is_none")]
    pub route_index: Option<usize>,

    /// UUID of the response the route came from, assigned on parse
    #[serde(rename = "requestUuid", default, skip_serializing_if = "Option::is_none")]
    pub request_uuid: Option<String>,

    #[serde(flatten)]
    pub unrecognized: JsonProperties,
}

impl DirectionsRoute {
    /// Refresh TTL stored in the unrecognized properties, if any
    pub fn refresh_ttl(&self) -> Option<u32> {
        self.unrecognized
            .get(KEY_REFRESH_TTL)
            .and_then(Value::as_u64)
            .and_then(|ttl| u32::try_from(ttl).ok())
    }
}

/// One origin-to-destination segment of a route
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteLeg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<LegStep>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<LegAnnotation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incidents: Option<Vec<Incident>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closures: Option<Vec<Closure>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<Vec<Notification>>,

    #[serde(flatten)]
    pub unrecognized: JsonProperties,
}

impl RouteLeg {
    /// Number of geometry points along the leg, derived from step geometries.
    ///
    /// Consecutive steps share their boundary point, so every step
    /// contributes `points - 1` segments. Encoded step geometries are
    /// decoded with `precision`.
    pub fn point_count(&self, precision: u32) -> Option<usize> {
        let steps = self.steps.as_ref()?;
        if steps.is_empty() {
            return None;
        }
        let mut segments = 0;
        for step in steps {
            segments += step.point_count(precision).checked_sub(1)?;
        }
        Some(segments + 1)
    }
}

/// A maneuver-to-maneuver piece of a leg
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LegStep {
    pub distance: f64,

    pub duration: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_typical: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,

    #[serde(flatten)]
    pub unrecognized: JsonProperties,
}

impl LegStep {
    /// Number of points in the step geometry, 0 when it is absent or
    /// cannot be decoded
    pub fn point_count(&self, precision: u32) -> usize {
        self.geometry
            .as_ref()
            .and_then(|geometry| geometry.point_count(precision))
            .unwrap_or(0)
    }
}

/// Route or step geometry.
///
/// The backend returns an encoded polyline unless GeoJSON was requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Geometry {
    Encoded(String),
    LineString(LineString),
}

impl Geometry {
    /// `[longitude, latitude]` points, decoding polylines with `precision`
    pub fn points(&self, precision: u32) -> ModelResult<Vec<[f64; 2]>> {
        match self {
            Self::LineString(line) => Ok(line.coordinates.clone()),
            Self::Encoded(encoded) => {
                let line = polyline::decode_polyline(encoded, precision)
                    .map_err(|e| ModelError::InvalidGeometry(e.to_string()))?;
                Ok(line.0.into_iter().map(|coord| [coord.x, coord.y]).collect())
            }
        }
    }

    /// Number of points, `None` when an encoded polyline is malformed
    pub fn point_count(&self, precision: u32) -> Option<usize> {
        match self {
            Self::LineString(line) => Some(line.coordinates.len()),
            Self::Encoded(_) => self.points(precision).ok().map(|points| points.len()),
        }
    }
}

impl From<LineString> for Geometry {
    fn from(line: LineString) -> Self {
        Self::LineString(line)
    }
}

/// GeoJSON line string, `[longitude, latitude]` pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    #[serde(rename = "type", default = "LineString::geojson_type")]
    pub kind: String,

    pub coordinates: Vec<[f64; 2]>,
}

impl LineString {
    /// Build a line string from coordinates
    pub fn new(coordinates: Vec<[f64; 2]>) -> Self {
        Self {
            kind: Self::geojson_type(),
            coordinates,
        }
    }

    fn geojson_type() -> String {
        "LineString".to_string()
    }
}

/// A snapped waypoint of the request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DirectionsWaypoint {
    #[serde(default)]
    pub name: String,

    pub location: [f64; 2],

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,

    #[serde(flatten)]
    pub unrecognized: JsonProperties,
}

impl DirectionsWaypoint {
    /// Charging time spent at this waypoint, read from `metadata.charge_time`.
    ///
    /// The metadata bag has no schema of its own: anything other than a
    /// number is treated as absent.
    pub fn charge_time(&self) -> Option<f64> {
        self.raw_charge_time()?.as_f64()
    }

    /// Raw `metadata.charge_time` value, whatever its type
    pub fn raw_charge_time(&self) -> Option<&Value> {
        self.unrecognized
            .get(KEY_WAYPOINT_METADATA)?
            .as_object()?
            .get(KEY_CHARGE_TIME)
    }
}
