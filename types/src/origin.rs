//! Provenance tags of routes and responses

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which router produced a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouterOrigin {
    /// Directions backend
    Online,
    /// On-device router
    Offline,
    /// Supplied by the application
    Custom,
}

impl fmt::Display for RouterOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterOrigin::Online => write!(f, "online"),
            RouterOrigin::Offline => write!(f, "offline"),
            RouterOrigin::Custom => write!(f, "custom"),
        }
    }
}

/// Backend API a response originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOriginApi {
    #[default]
    DirectionsApi,
    MapMatchingApi,
}

impl fmt::Display for ResponseOriginApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseOriginApi::DirectionsApi => write!(f, "directions"),
            ResponseOriginApi::MapMatchingApi => write!(f, "map_matching"),
        }
    }
}
