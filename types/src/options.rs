//! Route request options
//!
//! Immutable request parameters supplied by the caller, and the request URL
//! derived from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ModelError, ModelResult};

/// Query parameter carrying the access token
pub const ACCESS_TOKEN_QUERY_PARAM: &str = "access_token";

const REDACTED: &str = "***";

/// `geometries` value requesting polylines with 5 decimal digits
pub const GEOMETRY_POLYLINE: &str = "polyline";

/// `geometries` value requesting polylines with 6 decimal digits, the backend default
pub const GEOMETRY_POLYLINE6: &str = "polyline6";

/// Route request parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOptions {
    pub base_url: String,

    pub user: String,

    /// Routing profile, e.g. `driving-traffic`
    pub profile: String,

    /// `[longitude, latitude]` of every waypoint, origin first
    pub coordinates: Vec<[f64; 2]>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometries: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waypoints_per_route: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_refresh: Option<bool>,

    /// Extra query parameters passed through untouched
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub unrecognized: BTreeMap<String, String>,
}

impl RouteOptions {
    /// Create options for a trip through `coordinates`
    pub fn new(base_url: &str, profile: &str, coordinates: Vec<[f64; 2]>) -> Self {
        Self {
            base_url: base_url.to_string(),
            user: "mapbox".to_string(),
            profile: profile.to_string(),
            coordinates,
            alternatives: None,
            annotations: None,
            geometries: None,
            overview: None,
            steps: None,
            waypoints_per_route: None,
            enable_refresh: None,
            unrecognized: BTreeMap::new(),
        }
    }

    /// Set the account the profile belongs to
    pub fn with_user(mut self, user: &str) -> Self {
        self.user = user.to_string();
        self
    }

    /// Request annotations
    pub fn with_annotations(mut self, annotations: &[&str]) -> Self {
        self.annotations = Some(annotations.iter().map(|a| a.to_string()).collect());
        self
    }

    /// Request a geometry format, e.g. [`GEOMETRY_POLYLINE`]
    pub fn with_geometries(mut self, geometries: &str) -> Self {
        self.geometries = Some(geometries.to_string());
        self
    }

    /// Precision of encoded geometries in the response
    pub fn polyline_precision(&self) -> u32 {
        match self.geometries.as_deref() {
            Some(GEOMETRY_POLYLINE) => 5,
            _ => 6,
        }
    }

    /// Request per-route waypoints
    pub fn with_waypoints_per_route(mut self, enabled: bool) -> Self {
        self.waypoints_per_route = Some(enabled);
        self
    }

    /// Request a refreshable route
    pub fn with_refresh(mut self, enabled: bool) -> Self {
        self.enable_refresh = Some(enabled);
        self
    }

    /// Build the directions request URL
    pub fn to_url(&self, access_token: Option<&str>) -> ModelResult<Url> {
        if self.coordinates.len() < 2 {
            return Err(ModelError::InvalidOptions(format!(
                "at least 2 coordinates are required, got {}",
                self.coordinates.len()
            )));
        }

        let coordinates = self
            .coordinates
            .iter()
            .map(|[lon, lat]| format!("{},{}", lon, lat))
            .collect::<Vec<_>>()
            .join(";");

        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| ModelError::InvalidOptions(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(["directions", "v5", &self.user, &self.profile, &coordinates]);

        {
            let mut query = url.query_pairs_mut();
            if let Some(token) = access_token {
                query.append_pair(ACCESS_TOKEN_QUERY_PARAM, token);
            }
            if let Some(alternatives) = self.alternatives {
                query.append_pair("alternatives", &alternatives.to_string());
            }
            if let Some(annotations) = &self.annotations {
                query.append_pair("annotations", &annotations.join(","));
            }
            if let Some(geometries) = &self.geometries {
                query.append_pair("geometries", geometries);
            }
            if let Some(overview) = &self.overview {
                query.append_pair("overview", overview);
            }
            if let Some(steps) = self.steps {
                query.append_pair("steps", &steps.to_string());
            }
            if let Some(per_route) = self.waypoints_per_route {
                query.append_pair("waypoints_per_route", &per_route.to_string());
            }
            if let Some(refresh) = self.enable_refresh {
                query.append_pair("enable_refresh", &refresh.to_string());
            }
            for (key, value) in &self.unrecognized {
                query.append_pair(key, value);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        Ok(url)
    }
}

/// Copy of `url` with the value of query parameter `name` masked, for logs
pub fn redact_query_param(url: &Url, name: &str) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == name { REDACTED.to_string() } else { value.into_owned() };
            (key.into_owned(), value)
        })
        .collect();

    let mut redacted = url.clone();
    if pairs.is_empty() {
        return redacted;
    }
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted
}
