//! Callbacks delivering request outcomes to the caller
//!
//! Exactly one method of a callback is invoked per request, exactly once.

use navroute_route::NavigationRoute;
use navroute_types::{RouteOptions, RouterOrigin};

use crate::error::{RouteRefreshError, RouterFailure};

/// Outcome of a route request
pub trait RouteCallback: Send + Sync {
    fn on_routes_ready(&self, routes: Vec<NavigationRoute>, router_origin: RouterOrigin);

    /// Every reason the request failed, in the order the router reported them
    fn on_failure(&self, reasons: Vec<RouterFailure>, route_options: &RouteOptions);

    /// The request was cancelled; this is not a failure
    fn on_canceled(&self, route_options: &RouteOptions, router_origin: RouterOrigin);
}

/// Outcome of a route refresh request
pub trait RouteRefreshCallback: Send + Sync {
    fn on_refresh_ready(&self, route: NavigationRoute);

    fn on_failure(&self, error: RouteRefreshError);
}
