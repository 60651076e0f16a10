// ========== Core Modules ==========
pub mod annotation;
pub mod directions;
pub mod options;
pub mod origin;
pub mod refresh;
pub mod road_object;

// Export commonly used types
pub use annotation::{LegAnnotation, MaxSpeed};
pub use directions::{
    DirectionsResponse, DirectionsRoute, DirectionsWaypoint, Geometry, LegStep, LineString, RouteLeg,
    KEY_REFRESH_TTL, KEY_WAYPOINTS,
};
pub use options::{
    redact_query_param, RouteOptions, ACCESS_TOKEN_QUERY_PARAM, GEOMETRY_POLYLINE, GEOMETRY_POLYLINE6,
};
pub use origin::{ResponseOriginApi, RouterOrigin};
pub use refresh::{DirectionsRefreshResponse, DirectionsRouteRefresh, RouteLegRefresh};
pub use road_object::{Closure, GeometryRange, Incident, Notification, REFRESH_TYPE_DYNAMIC};

/// Unrecognized JSON properties carried verbatim through parse and serialize
pub type JsonProperties = serde_json::Map<String, serde_json::Value>;

// Error types
pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("Invalid route options: {0}")]
    InvalidOptions(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}
