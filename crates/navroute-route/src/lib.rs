//! Navroute Route - Route value and refresh merging
//!
//! A [`NavigationRoute`] is an immutable snapshot of one route of a
//! directions response. Every route carries the [`RouteOperations`] matching
//! its provenance:
//!
//! ```text
//! NavigationRoute
//!     │
//!     ▼
//! ┌─────────────────────────┐
//! │    RouteOperations      │
//! ├────────────┬────────────┤
//! │  Decoded   │   Native   │
//! │ (merger,   │ (opaque    │
//! │  serde)    │  handle)   │
//! └────────────┴────────────┘
//! ```
//!
//! Refreshing or updating a route never mutates it; a new
//! [`NavigationRoute`] is produced from the resulting [`RouteUpdate`].
//!
//! # Example
//!
//! ```rust,ignore
//! use navroute_route::NavigationRoute;
//!
//! let routes = NavigationRoute::parse_directions_response(body, options, origin, now)?;
//! let refreshed = routes[0].refresh(refresh_body, 0, Some(12), now)?;
//! ```

// Core modules
mod error;
mod optionally_refreshed;
mod types;

// Operations and refresh merging
pub mod operations;
pub mod refresh;

// Route value
mod route;

#[cfg(test)]
mod fixtures;

pub use error::{RouteOperationError, RouteOperationResult};
pub use operations::{
    DecodedRouteOperations, NativeRefreshedRoute, NativeRouteHandle, NativeRouteOperations,
    RouteModel, RouteOperations, RouteUpdate, SERIALIZATION_VERSION,
};
pub use optionally_refreshed::OptionallyRefreshedData;
pub use refresh::{merge_route_refresh, parse_route_refresh, MergedRefresh};
pub use route::NavigationRoute;
pub use types::{CongestionNumericOverride, ParsedRouteData, RouteRefreshMetadata};
