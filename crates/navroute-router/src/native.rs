//! Native router contract
//!
//! The native router computes routes and refreshes asynchronously and
//! reports back through a one-shot callback, possibly from any thread and
//! possibly before the request call has even returned.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use navroute_types::RouterOrigin;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::RouterFailureType;

/// Request identifier, unique per native router instance
pub type RequestId = u64;

/// Id returned when a request failed before reaching the native router
pub const REQUEST_FAILURE: RequestId = u64::MAX;

/// Response body or the list of errors the router reported
pub type NativeResult = Result<Vec<u8>, Vec<NativeRouterError>>;

/// Completion callback of a route request
pub type RouteResultCallback = Box<dyn FnOnce(NativeResult, RouterOrigin) + Send + 'static>;

/// Completion callback of a route refresh request
pub type RefreshResultCallback = Box<dyn FnOnce(NativeResult, RouterOrigin) + Send + 'static>;

/// Async routing backend
pub trait NativeRouterClient: Send + Sync {
    /// Request routes for `url`
    fn get_route(
        &self,
        url: &Url,
        options: &GetRouteOptions,
        signature: &GetRouteSignature,
        callback: RouteResultCallback,
    ) -> RequestId;

    /// Request fresh traffic data for an existing route
    fn get_route_refresh(&self, options: &RouteRefreshOptions, callback: RefreshResultCallback) -> RequestId;

    fn cancel_route_request(&self, id: RequestId);

    fn cancel_route_refresh_request(&self, id: RequestId);

    fn cancel_all(&self);
}

/// Error type reported by the native router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeRouterErrorType {
    Unknown,
    Throttling,
    Input,
    Network,
    Authentication,
    RouteCreation,
    MapMatchingCreation,
    MissingTiles,
    RequestCancelled,
}

impl NativeRouterErrorType {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NativeRouterErrorType::Network
                | NativeRouterErrorType::Throttling
                | NativeRouterErrorType::Unknown
        )
    }

    /// Failure type of the error, `None` for cancellation
    pub fn failure_type(&self) -> Option<RouterFailureType> {
        let failure_type = match self {
            NativeRouterErrorType::Unknown => RouterFailureType::UnknownError,
            NativeRouterErrorType::Throttling => RouterFailureType::ThrottlingError,
            NativeRouterErrorType::Input => RouterFailureType::InputError,
            NativeRouterErrorType::Network => RouterFailureType::NetworkError,
            NativeRouterErrorType::Authentication => RouterFailureType::AuthenticationError,
            NativeRouterErrorType::RouteCreation | NativeRouterErrorType::MapMatchingCreation => {
                RouterFailureType::RouteCreationError
            }
            NativeRouterErrorType::MissingTiles => RouterFailureType::MissingTilesError,
            NativeRouterErrorType::RequestCancelled => return None,
        };
        Some(failure_type)
    }
}

/// Error reported by the native router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeRouterError {
    pub message: String,
    pub error_type: NativeRouterErrorType,
    pub request_id: RequestId,
    /// Refresh TTL in seconds the backend sent along with a refresh failure
    pub refresh_ttl: Option<u32>,
}

impl NativeRouterError {
    pub fn new(message: &str, error_type: NativeRouterErrorType, request_id: RequestId) -> Self {
        Self {
            message: message.to_string(),
            error_type,
            request_id,
            refresh_ttl: None,
        }
    }

    pub fn with_refresh_ttl(mut self, refresh_ttl: u32) -> Self {
        self.refresh_ttl = Some(refresh_ttl);
        self
    }
}

impl fmt::Display for NativeRouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.error_type, self.message)
    }
}

/// Per-request options handed to the native router
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetRouteOptions {
    pub timeout: Option<Duration>,
}

/// Why a route was requested
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestReason {
    #[default]
    NewRoute,
    Reroute,
    Alternatives,
}

/// Who requested a route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestOrigin {
    #[default]
    Platform,
    Application,
}

/// Signature of a route request, forwarded for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRouteSignature {
    pub reason: RequestReason,
    pub origin: RequestOrigin,
}

impl GetRouteSignature {
    pub fn new(reason: RequestReason, origin: RequestOrigin) -> Self {
        Self { reason, origin }
    }
}

/// Routing profile of a refreshed route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingProfile {
    pub account: String,
    pub profile: String,
}

/// Position of the vehicle on the route when requesting a refresh
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRefreshRequestData {
    pub leg_index: usize,

    /// Point index along the whole route geometry
    pub route_geometry_index: usize,

    /// Point index within the current leg
    pub leg_geometry_index: Option<usize>,

    #[serde(default)]
    pub experimental_properties: BTreeMap<String, String>,
}

impl RouteRefreshRequestData {
    pub fn new(leg_index: usize, route_geometry_index: usize, leg_geometry_index: Option<usize>) -> Self {
        Self {
            leg_index,
            route_geometry_index,
            leg_geometry_index,
            experimental_properties: BTreeMap::new(),
        }
    }
}

/// Refresh request handed to the native router
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRefreshOptions {
    pub request_uuid: String,
    pub route_index: usize,
    pub leg_index: usize,
    pub profile: RoutingProfile,
    pub base_url: String,
    pub route_geometry_index: usize,
    pub experimental_properties: BTreeMap<String, String>,
}
