//! Navroute Router - In-flight request registry
//!
//! Issues route and route refresh requests to a native router and tracks
//! them until exactly one terminal callback has been delivered.
//!
//! # Architecture
//!
//! ```text
//!  RouterHandle (Clone)          native callbacks (any thread)
//!        │                                 │
//!        └──────────────┬──────────────────┘
//!                       ▼ commands
//! ┌──────────────────────────────────────────┐
//! │            RequestRegistry task          │
//! │  routes / refreshes: PendingRequests     │
//! │  router slot: ArcSwap<ActiveRouter>      │
//! └───────────────┬──────────────────────────┘
//!                 ▼
//! ┌──────────────────────────────────────────┐
//! │   ParsingPool (spawn_blocking, bounded)  │
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use navroute_router::RequestRegistry;
//!
//! let (registry, handle) = RequestRegistry::new(client, RouterConfig::from_env());
//! tokio::spawn(registry.run());
//!
//! let id = handle.get_route(options, signature, callback).await;
//! handle.cancel_route_request(id).await?;
//! ```

// Core modules
mod callback;
mod error;
mod native;

// Registry internals
mod parsing;
mod pending;
mod registry;

pub use callback::{RouteCallback, RouteRefreshCallback};
pub use error::{RouteRefreshError, RouterError, RouterFailure, RouterFailureType};
pub use native::{
    GetRouteOptions, GetRouteSignature, NativeResult, NativeRouterClient, NativeRouterError,
    NativeRouterErrorType, RefreshResultCallback, RequestId, RequestOrigin, RequestReason,
    RouteRefreshOptions, RouteRefreshRequestData, RouteResultCallback, RoutingProfile,
    REQUEST_FAILURE,
};
pub use parsing::{DecodedResponseParser, ParsingError, ParsingPool, RouteResponseParser};
pub use pending::{OngoingRequest, PendingRequestError, PendingRequests};
pub use registry::{PendingCounts, RequestRegistry, RouterHandle};
