//! Error types for the router module

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use navroute_types::{redact_query_param, RouterOrigin, ACCESS_TOKEN_QUERY_PARAM};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::native::NativeRouterError;

/// Shared error cause
pub type FailureCause = Arc<dyn StdError + Send + Sync>;

/// Registry error types
#[derive(Debug, Error)]
pub enum RouterError {
    /// Registry task has stopped
    #[error("Request registry is shut down")]
    Closed,
}

/// Kind of a route request failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouterFailureType {
    InputError,
    NetworkError,
    AuthenticationError,
    ThrottlingError,
    /// Also covers map matching creation errors
    RouteCreationError,
    MissingTilesError,
    ResponseParsingError,
    RouterRecreationError,
    RefreshNotSupported,
    UnknownError,
}

impl fmt::Display for RouterFailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RouterFailureType::InputError => "input",
            RouterFailureType::NetworkError => "network",
            RouterFailureType::AuthenticationError => "authentication",
            RouterFailureType::ThrottlingError => "throttling",
            RouterFailureType::RouteCreationError => "route_creation",
            RouterFailureType::MissingTilesError => "missing_tiles",
            RouterFailureType::ResponseParsingError => "response_parsing",
            RouterFailureType::RouterRecreationError => "router_recreation",
            RouterFailureType::RefreshNotSupported => "refresh_not_supported",
            RouterFailureType::UnknownError => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// One reason a request failed
#[derive(Debug, Clone)]
pub struct RouterFailure {
    /// Request URL with the access token redacted
    pub url: Option<Url>,
    pub router_origin: RouterOrigin,
    pub message: String,
    pub failure_type: RouterFailureType,
    pub cause: Option<FailureCause>,
    pub is_retryable: bool,
}

impl RouterFailure {
    /// Create a failure; the URL is redacted before it is stored
    pub fn new(
        url: Option<&Url>,
        router_origin: RouterOrigin,
        message: impl Into<String>,
        failure_type: RouterFailureType,
        is_retryable: bool,
    ) -> Self {
        Self {
            url: url.map(|url| redact_query_param(url, ACCESS_TOKEN_QUERY_PARAM)),
            router_origin,
            message: message.into(),
            failure_type,
            cause: None,
            is_retryable,
        }
    }

    /// Attach the underlying error
    pub fn with_cause(mut self, cause: FailureCause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Map a native error; `None` for cancellation
    pub fn from_native(error: &NativeRouterError, url: Option<&Url>, router_origin: RouterOrigin) -> Option<Self> {
        let failure_type = error.error_type.failure_type()?;
        Some(Self::new(
            url,
            router_origin,
            error.message.clone(),
            failure_type,
            error.error_type.is_retryable(),
        ))
    }

    /// Late response of a router that has been replaced
    pub fn router_recreation(url: Option<&Url>, router_origin: RouterOrigin) -> Self {
        Self::new(
            url,
            router_origin,
            "Router was recreated while the request was in flight",
            RouterFailureType::RouterRecreationError,
            true,
        )
    }
}

impl fmt::Display for RouterFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failure: {}", self.failure_type, self.message)?;
        if let Some(url) = &self.url {
            write!(f, " ({})", url)?;
        }
        Ok(())
    }
}

/// Failure of a route refresh
#[derive(Debug, Clone)]
pub struct RouteRefreshError {
    pub message: String,
    pub cause: Option<FailureCause>,
    pub failure: Option<RouterFailure>,
    /// Refresh TTL the backend sent with the failure
    pub refresh_ttl: Option<u32>,
    /// `refresh_ttl` added to the response time
    pub new_expiration_time_elapsed_seconds: Option<u64>,
}

impl RouteRefreshError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
            failure: None,
            refresh_ttl: None,
            new_expiration_time_elapsed_seconds: None,
        }
    }

    pub fn with_failure(mut self, failure: RouterFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn with_cause(mut self, cause: FailureCause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Record the backend TTL and the expiration it implies
    pub fn with_refresh_ttl(mut self, refresh_ttl: Option<u32>, response_time_elapsed_seconds: u64) -> Self {
        self.refresh_ttl = refresh_ttl;
        self.new_expiration_time_elapsed_seconds =
            refresh_ttl.map(|ttl| u64::from(ttl) + response_time_elapsed_seconds);
        self
    }
}

impl fmt::Display for RouteRefreshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for RouteRefreshError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn StdError + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::NativeRouterErrorType;

    fn url() -> Url {
        Url::parse("https://api.example.com/directions/v5/mapbox/driving/1,2;3,4?access_token=secret&steps=true")
            .unwrap()
    }

    #[test]
    fn test_from_native_redacts_url() {
        let error = NativeRouterError::new("timeout", NativeRouterErrorType::Network, 7);
        let failure = RouterFailure::from_native(&error, Some(&url()), RouterOrigin::Online).unwrap();

        assert_eq!(failure.failure_type, RouterFailureType::NetworkError);
        assert!(failure.is_retryable);
        let redacted = failure.url.unwrap();
        assert!(!redacted.as_str().contains("secret"));
        assert!(redacted.as_str().contains("steps=true"));
    }

    #[test]
    fn test_cancellation_is_not_a_failure() {
        let error = NativeRouterError::new("cancelled", NativeRouterErrorType::RequestCancelled, 7);
        assert!(RouterFailure::from_native(&error, None, RouterOrigin::Online).is_none());
    }

    #[test]
    fn test_refresh_error_expiration() {
        let error = RouteRefreshError::new("failed").with_refresh_ttl(Some(60), 1000);
        assert_eq!(error.refresh_ttl, Some(60));
        assert_eq!(error.new_expiration_time_elapsed_seconds, Some(1060));

        let error = RouteRefreshError::new("failed").with_refresh_ttl(None, 1000);
        assert_eq!(error.new_expiration_time_elapsed_seconds, None);
    }

    #[test]
    fn test_router_recreation_is_retryable() {
        let failure = RouterFailure::router_recreation(None, RouterOrigin::Offline);
        assert_eq!(failure.failure_type, RouterFailureType::RouterRecreationError);
        assert!(failure.is_retryable);
        assert_eq!(failure.to_string(), "router_recreation failure: Router was recreated while the request was in flight");
    }
}
