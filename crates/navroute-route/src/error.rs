//! Error types for route operations

use navroute_types::ModelError;
use thiserror::Error;

pub type RouteOperationResult<T> = Result<T, RouteOperationError>;

/// Route operation error types
#[derive(Debug, Error)]
pub enum RouteOperationError {
    /// Response body is not valid JSON for the expected model
    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] ModelError),

    /// Refresh response without a `route`
    #[error("No route refresh returned")]
    MissingRefreshRoute,

    /// Operation is unavailable for routes parsed by the native engine
    #[error("{operation} is not supported for native routes")]
    NotSupported { operation: &'static str },

    /// Native engine rejected the refresh
    #[error("Native refresh failed: {0}")]
    NativeRefresh(String),

    /// Route state could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Serialized route was written by an incompatible version
    #[error("Unsupported serialization version: {0}")]
    UnsupportedVersion(u64),
}

impl RouteOperationError {
    /// Whether the operation is unsupported for the route's provenance
    pub fn is_not_supported(&self) -> bool {
        matches!(self, RouteOperationError::NotSupported { .. })
    }
}
