//! Route refresh response model
//!
//! Same per-leg shape as a directions route, restricted to the
//! traffic-sensitive fields. Top level `refresh_ttl` and `waypoints` travel
//! in the unrecognized properties of the refreshed route.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::annotation::LegAnnotation;
use crate::directions::{DirectionsWaypoint, KEY_REFRESH_TTL, KEY_WAYPOINTS};
use crate::road_object::{Closure, Incident, Notification};
use crate::{JsonProperties, ModelResult};

/// Top level refresh response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DirectionsRefreshResponse {
    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<DirectionsRouteRefresh>,

    #[serde(flatten)]
    pub unrecognized: JsonProperties,
}

impl DirectionsRefreshResponse {
    /// Parse a refresh response body
    pub fn from_slice(body: &[u8]) -> ModelResult<Self> {
        Ok(serde_json::from_slice(body)?)
    }
}

/// Refreshed data of one route
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DirectionsRouteRefresh {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legs: Option<Vec<RouteLegRefresh>>,

    #[serde(flatten)]
    pub unrecognized: JsonProperties,
}

impl DirectionsRouteRefresh {
    /// Refresh TTL in seconds, if the backend sent one
    pub fn refresh_ttl(&self) -> Option<u32> {
        self.unrecognized
            .get(KEY_REFRESH_TTL)
            .and_then(Value::as_u64)
            .and_then(|ttl| u32::try_from(ttl).ok())
    }

    /// Positional waypoint updates; `None` entries leave the waypoint as is.
    ///
    /// Entries that fail to parse are treated like `null`.
    pub fn waypoints(&self) -> Option<Vec<Option<DirectionsWaypoint>>> {
        let entries = self.unrecognized.get(KEY_WAYPOINTS)?.as_array()?;
        Some(
            entries
                .iter()
                .map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect(),
        )
    }

    /// Refreshed data of leg `index`
    pub fn leg(&self, index: usize) -> Option<&RouteLegRefresh> {
        self.legs.as_ref()?.get(index)
    }
}

/// Refreshed data of one leg
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteLegRefresh {
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
