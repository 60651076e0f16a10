//! Request registry
//!
//! A single task owns every in-flight request. Handles and native callbacks
//! talk to it through one command channel, so bookkeeping never needs a
//! lock and every request reaches exactly one terminal outcome:
//!
//! ```text
//! PENDING ──response──▶ PARSING ──parsed──▶ COMPLETED | FAILED
//!    │                     │
//!    └──────cancel─────────┴──────────────▶ CANCELLED
//! ```
//!
//! The active native router sits in a swappable slot tagged with a
//! generation. Entries remember the generation that issued them; a late
//! response from a replaced router is reported as a recreation failure.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use navroute_core::{ElapsedClock, RouterConfig, SystemElapsedClock};
use navroute_route::{NavigationRoute, RouteOperationResult};
use navroute_types::{redact_query_param, RouteOptions, RouterOrigin, ACCESS_TOKEN_QUERY_PARAM};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use url::Url;

use crate::callback::{RouteCallback, RouteRefreshCallback};
use crate::error::{FailureCause, RouteRefreshError, RouterError, RouterFailure, RouterFailureType};
use crate::native::{
    GetRouteOptions, GetRouteSignature, NativeResult, NativeRouterClient, NativeRouterErrorType,
    RefreshResultCallback, RequestId, RouteRefreshOptions, RouteRefreshRequestData, RouteResultCallback,
    RoutingProfile, REQUEST_FAILURE,
};
use crate::parsing::{DecodedResponseParser, ParsingError, ParsingPool, RouteResponseParser};
use crate::pending::{OngoingRequest, PendingRequests};

/// Native router installed in the slot
struct ActiveRouter {
    client: Arc<dyn NativeRouterClient>,
    generation: u64,
}

/// Live entry counts of the registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingCounts {
    pub routes: usize,
    pub refreshes: usize,
}

struct RouteContext {
    options: RouteOptions,
    url: Url,
    callback: Arc<dyn RouteCallback>,
}

struct RefreshContext {
    route: NavigationRoute,
    request_data: RouteRefreshRequestData,
    callback: Arc<dyn RouteRefreshCallback>,
}

enum Command {
    GetRoute {
        options: RouteOptions,
        signature: GetRouteSignature,
        callback: Arc<dyn RouteCallback>,
        reply: oneshot::Sender<RequestId>,
    },
    GetRouteRefresh {
        route: NavigationRoute,
        request_data: RouteRefreshRequestData,
        callback: Arc<dyn RouteRefreshCallback>,
        reply: oneshot::Sender<RequestId>,
    },
    RouteResult {
        /// `None` when the router answered before returning the id
        request: Option<RequestId>,
        generation: u64,
        result: NativeResult,
        origin: RouterOrigin,
        context: Arc<RouteContext>,
        tx: mpsc::UnboundedSender<Command>,
    },
    RefreshResult {
        request: Option<RequestId>,
        generation: u64,
        result: NativeResult,
        origin: RouterOrigin,
        context: Arc<RefreshContext>,
        tx: mpsc::UnboundedSender<Command>,
    },
    RouteParsed {
        request: Option<RequestId>,
        generation: u64,
        result: Result<Vec<NavigationRoute>, ParsingError>,
        origin: RouterOrigin,
        context: Arc<RouteContext>,
    },
    RefreshParsed {
        request: Option<RequestId>,
        generation: u64,
        result: Result<NavigationRoute, ParsingError>,
        origin: RouterOrigin,
        context: Arc<RefreshContext>,
    },
    CancelRoute {
        id: RequestId,
        reply: oneshot::Sender<()>,
    },
    CancelRefresh {
        id: RequestId,
        reply: oneshot::Sender<()>,
    },
    CancelAll {
        reply: oneshot::Sender<()>,
    },
    ResetRouter {
        client: Arc<dyn NativeRouterClient>,
        reply: oneshot::Sender<()>,
    },
    PendingCounts {
        reply: oneshot::Sender<PendingCounts>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Tells a request whether its native callback ran before the id was known
#[derive(Debug, Default)]
struct CallbackTicket {
    state: Mutex<TicketState>,
}

#[derive(Debug, Default)]
struct TicketState {
    request_id: Option<RequestId>,
    invoked: bool,
}

impl CallbackTicket {
    /// Mark the callback as invoked, returning the registered id
    fn invoke(&self) -> Option<RequestId> {
        let mut state = self.state.lock();
        state.invoked = true;
        state.request_id
    }

    /// Record the id; `false` if the callback already ran
    fn register(&self, id: RequestId) -> bool {
        let mut state = self.state.lock();
        if state.invoked {
            return false;
        }
        state.request_id = Some(id);
        true
    }
}

/// Owner of all in-flight route and refresh requests
pub struct RequestRegistry {
    router: Arc<ArcSwap<ActiveRouter>>,
    next_generation: u64,
    routes: PendingRequests,
    refreshes: PendingRequests,
    parser: Arc<dyn RouteResponseParser>,
    pool: ParsingPool,
    clock: Arc<dyn ElapsedClock>,
    config: RouterConfig,

    /// Weak so that the task stops once handles and callbacks are gone
    sender: mpsc::WeakUnboundedSender<Command>,
    receiver: mpsc::UnboundedReceiver<Command>,
}

impl RequestRegistry {
    /// Create a new registry and the handle to drive it
    pub fn new(client: Arc<dyn NativeRouterClient>, config: RouterConfig) -> (Self, RouterHandle) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let router = Arc::new(ArcSwap::from_pointee(ActiveRouter { client, generation: 0 }));

        info!(
            parsing_workers = config.parsing_workers,
            timeout = ?config.request_timeout,
            "Creating request registry"
        );

        let registry = Self {
            router: router.clone(),
            next_generation: 1,
            routes: PendingRequests::new("route"),
            refreshes: PendingRequests::new("refresh"),
            parser: Arc::new(DecodedResponseParser),
            pool: ParsingPool::new(config.parsing_workers),
            clock: Arc::new(SystemElapsedClock::new()),
            config,
            sender: sender.downgrade(),
            receiver,
        };
        (registry, RouterHandle { sender, router })
    }

    /// Replace the response parser
    pub fn with_parser(mut self, parser: Arc<dyn RouteResponseParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Replace the clock used to stamp responses
    pub fn with_clock(mut self, clock: Arc<dyn ElapsedClock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run the registry until shutdown or until every sender is gone
    pub async fn run(mut self) {
        info!("Request registry started");

        while let Some(command) = self.receiver.recv().await {
            if let Command::Shutdown { reply } = command {
                self.cancel_all();
                let _ = reply.send(());
                info!("Request registry shut down");
                return;
            }
            self.handle(command);
        }

        self.cancel_all();
        info!("Request registry stopped, all senders dropped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::GetRoute {
                options,
                signature,
                callback,
                reply,
            } => {
                let id = self.get_route(options, signature, callback);
                let _ = reply.send(id);
            }
            Command::GetRouteRefresh {
                route,
                request_data,
                callback,
                reply,
            } => {
                let id = self.get_route_refresh(route, request_data, callback);
                let _ = reply.send(id);
            }
            Command::RouteResult {
                request,
                generation,
                result,
                origin,
                context,
                tx,
            } => self.on_route_result(request, generation, result, origin, context, tx),
            Command::RefreshResult {
                request,
                generation,
                result,
                origin,
                context,
                tx,
            } => self.on_refresh_result(request, generation, result, origin, context, tx),
            Command::RouteParsed {
                request,
                generation,
                result,
                origin,
                context,
            } => self.on_route_parsed(request, generation, result, origin, context),
            Command::RefreshParsed {
                request,
                generation,
                result,
                origin,
                context,
            } => self.on_refresh_parsed(request, generation, result, origin, context),
            Command::CancelRoute { id, reply } => {
                self.cancel_route_request(id);
                let _ = reply.send(());
            }
            Command::CancelRefresh { id, reply } => {
                self.cancel_route_refresh_request(id);
                let _ = reply.send(());
            }
            Command::CancelAll { reply } => {
                self.cancel_all();
                let _ = reply.send(());
            }
            Command::ResetRouter { client, reply } => {
                self.reset_router(client);
                let _ = reply.send(());
            }
            Command::PendingCounts { reply } => {
                let _ = reply.send(PendingCounts {
                    routes: self.routes.len(),
                    refreshes: self.refreshes.len(),
                });
            }
            Command::Shutdown { reply } => {
                let _ = reply.send(());
            }
        }
    }

    fn current_generation(&self) -> u64 {
        self.router.load().generation
    }

    // ========== Route Requests ==========

    fn get_route(
        &mut self,
        options: RouteOptions,
        signature: GetRouteSignature,
        callback: Arc<dyn RouteCallback>,
    ) -> RequestId {
        let url = match options.to_url(self.config.access_token.as_deref()) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, base_url = %options.base_url, "Cannot build route request URL");
                let message = e.to_string();
                let failure = RouterFailure::new(
                    None,
                    RouterOrigin::Online,
                    message,
                    RouterFailureType::InputError,
                    false,
                )
                .with_cause(Arc::new(e));
                callback.on_failure(vec![failure], &options);
                return REQUEST_FAILURE;
            }
        };
        let Some(tx) = self.sender.upgrade() else {
            callback.on_failure(vec![closed_failure()], &options);
            return REQUEST_FAILURE;
        };

        let active = self.router.load_full();
        let generation = active.generation;
        let context = Arc::new(RouteContext { options, url, callback });
        let ticket = Arc::new(CallbackTicket::default());

        let on_result: RouteResultCallback = {
            let ticket = ticket.clone();
            let context = context.clone();
            Box::new(move |result, origin| {
                let request = ticket.invoke();
                let command = Command::RouteResult {
                    request,
                    generation,
                    result,
                    origin,
                    context,
                    tx: tx.clone(),
                };
                if tx.send(command).is_err() {
                    debug!(?request, "Route result dropped, registry is gone");
                }
            })
        };

        let request_options = GetRouteOptions {
            timeout: self.config.request_timeout,
        };
        let id = active
            .client
            .get_route(&context.url, &request_options, &signature, on_result);
        let redacted = redact_query_param(&context.url, ACCESS_TOKEN_QUERY_PARAM);

        if !ticket.register(id) {
            debug!(request_id = id, url = %redacted, "Route request completed synchronously");
            return id;
        }

        let cancel_context = context.clone();
        let request = OngoingRequest::new(generation, move || {
            cancel_context
                .callback
                .on_canceled(&cancel_context.options, RouterOrigin::Offline);
        });
        if let Some(displaced) = self.routes.insert(id, request) {
            displaced.cancel();
        }

        info!(
            request_id = id,
            generation,
            reason = ?signature.reason,
            url = %redacted,
            "Route requested"
        );
        id
    }

    fn on_route_result(
        &mut self,
        request: Option<RequestId>,
        generation: u64,
        result: NativeResult,
        origin: RouterOrigin,
        context: Arc<RouteContext>,
        tx: mpsc::UnboundedSender<Command>,
    ) {
        if let Some(id) = request {
            if let Err(e) = self.routes.check_owned(id, generation) {
                warn!(request_id = id, error = %e, "Ignoring route result");
                return;
            }
        }

        if generation != self.current_generation() {
            self.take_route(request, generation);
            warn!(?request, generation, "Route result from a replaced router");
            let failure = RouterFailure::router_recreation(Some(&context.url), origin);
            context.callback.on_failure(vec![failure], &context.options);
            return;
        }

        let body = match result {
            Ok(body) => body,
            Err(errors) => {
                self.take_route(request, generation);
                if errors
                    .iter()
                    .any(|e| e.error_type == NativeRouterErrorType::RequestCancelled)
                {
                    info!(?request, origin = %origin, "Route request cancelled by the router");
                    context.callback.on_canceled(&context.options, origin);
                } else {
                    let failures: Vec<RouterFailure> = errors
                        .iter()
                        .filter_map(|e| RouterFailure::from_native(e, Some(&context.url), origin))
                        .collect();
                    warn!(?request, failures = failures.len(), origin = %origin, "Route request failed");
                    context.callback.on_failure(failures, &context.options);
                }
                return;
            }
        };

        let response_time = self.clock.elapsed_seconds();
        let parser = self.parser.clone();
        let job_context = context.clone();
        let job = self.pool.spawn(
            move || parser.parse(&body, &job_context.options, origin, response_time),
            move |result: Result<RouteOperationResult<Vec<NavigationRoute>>, ParsingError>| {
                let result = result.and_then(|routes| routes.map_err(ParsingError::from));
                let command = Command::RouteParsed {
                    request,
                    generation,
                    result,
                    origin,
                    context,
                };
                if tx.send(command).is_err() {
                    debug!(?request, "Parsed routes dropped, registry is gone");
                }
            },
        );

        if let Some(id) = request {
            if let Err(e) = self.routes.attach_parsing_job(id, job) {
                warn!(request_id = id, error = %e, "Parsing started for an unknown request");
            }
        }
    }

    fn on_route_parsed(
        &mut self,
        request: Option<RequestId>,
        generation: u64,
        result: Result<Vec<NavigationRoute>, ParsingError>,
        origin: RouterOrigin,
        context: Arc<RouteContext>,
    ) {
        if let Some(id) = request {
            if let Err(e) = self.routes.take_owned(id, generation) {
                debug!(request_id = id, error = %e, "Dropping parsed routes");
                return;
            }
        }

        match result {
            Ok(routes) => {
                info!(?request, routes = routes.len(), origin = %origin, "Routes ready");
                context.callback.on_routes_ready(routes, origin);
            }
            Err(e) => {
                warn!(?request, error = %e, "Failed to parse directions response");
                let failure = RouterFailure::new(
                    Some(&context.url),
                    origin,
                    format!("Failed to parse directions response: {}", e),
                    RouterFailureType::ResponseParsingError,
                    false,
                )
                .with_cause(Arc::new(e));
                context.callback.on_failure(vec![failure], &context.options);
            }
        }
    }

    fn take_route(&mut self, request: Option<RequestId>, generation: u64) {
        if let Some(id) = request {
            let _ = self.routes.take_owned(id, generation);
        }
    }

    // ========== Refresh Requests ==========

    fn get_route_refresh(
        &mut self,
        route: NavigationRoute,
        request_data: RouteRefreshRequestData,
        callback: Arc<dyn RouteRefreshCallback>,
    ) -> RequestId {
        let Some(request_uuid) = route.data().refreshable_uuid().map(str::to_string) else {
            callback.on_failure(blank_uuid_error(&route));
            return REQUEST_FAILURE;
        };
        let Some(tx) = self.sender.upgrade() else {
            callback.on_failure(RouteRefreshError::new(RouterError::Closed.to_string()));
            return REQUEST_FAILURE;
        };

        let route_options = route.route_options();
        let refresh_options = RouteRefreshOptions {
            request_uuid,
            route_index: route.route_index(),
            leg_index: request_data.leg_index,
            profile: RoutingProfile {
                account: route_options.user.clone(),
                profile: route_options.profile.clone(),
            },
            base_url: route_options.base_url.clone(),
            route_geometry_index: request_data.route_geometry_index,
            experimental_properties: request_data.experimental_properties.clone(),
        };

        let active = self.router.load_full();
        let generation = active.generation;
        let context = Arc::new(RefreshContext {
            route,
            request_data,
            callback,
        });
        let ticket = Arc::new(CallbackTicket::default());

        let on_result: RefreshResultCallback = {
            let ticket = ticket.clone();
            let context = context.clone();
            Box::new(move |result, origin| {
                let request = ticket.invoke();
                let command = Command::RefreshResult {
                    request,
                    generation,
                    result,
                    origin,
                    context,
                    tx: tx.clone(),
                };
                if tx.send(command).is_err() {
                    debug!(?request, "Refresh result dropped, registry is gone");
                }
            })
        };

        let id = active.client.get_route_refresh(&refresh_options, on_result);
        if !ticket.register(id) {
            debug!(request_id = id, "Route refresh completed synchronously");
            return id;
        }

        let cancel_context = context.clone();
        let request = OngoingRequest::new(generation, move || {
            cancel_context
                .callback
                .on_failure(RouteRefreshError::new("Request cancelled"));
        });
        if let Some(displaced) = self.refreshes.insert(id, request) {
            displaced.cancel();
        }

        info!(
            request_id = id,
            generation,
            route_id = %context.route.id(),
            leg_index = refresh_options.leg_index,
            "Route refresh requested"
        );
        id
    }

    fn on_refresh_result(
        &mut self,
        request: Option<RequestId>,
        generation: u64,
        result: NativeResult,
        origin: RouterOrigin,
        context: Arc<RefreshContext>,
        tx: mpsc::UnboundedSender<Command>,
    ) {
        if let Some(id) = request {
            if let Err(e) = self.refreshes.check_owned(id, generation) {
                warn!(request_id = id, error = %e, "Ignoring refresh result");
                return;
            }
        }

        if generation != self.current_generation() {
            self.take_refresh(request, generation);
            warn!(?request, generation, "Refresh result from a replaced router");
            let error = RouteRefreshError::new("Router was recreated while the refresh was in flight")
                .with_failure(RouterFailure::router_recreation(None, origin));
            context.callback.on_failure(error);
            return;
        }

        let response_time = self.clock.elapsed_seconds();
        let body = match result {
            Ok(body) => body,
            Err(errors) => {
                self.take_refresh(request, generation);
                let error = match errors.first() {
                    Some(first) => {
                        let mut error = RouteRefreshError::new(first.message.clone())
                            .with_refresh_ttl(first.refresh_ttl, response_time);
                        error.failure = RouterFailure::from_native(first, None, origin);
                        error
                    }
                    None => RouteRefreshError::new("Route refresh failed"),
                };
                warn!(
                    ?request,
                    errors = errors.len(),
                    refresh_ttl = ?error.refresh_ttl,
                    message = %error.message,
                    "Route refresh failed"
                );
                context.callback.on_failure(error);
                return;
            }
        };

        let job_context = context.clone();
        let job = self.pool.spawn(
            move || {
                let data = &job_context.request_data;
                job_context.route.refresh(
                    &body,
                    data.leg_index,
                    data.leg_geometry_index,
                    response_time,
                )
            },
            move |result: Result<RouteOperationResult<NavigationRoute>, ParsingError>| {
                let result = result.and_then(|route| route.map_err(ParsingError::from));
                let command = Command::RefreshParsed {
                    request,
                    generation,
                    result,
                    origin,
                    context,
                };
                if tx.send(command).is_err() {
                    debug!(?request, "Refreshed route dropped, registry is gone");
                }
            },
        );

        if let Some(id) = request {
            if let Err(e) = self.refreshes.attach_parsing_job(id, job) {
                warn!(request_id = id, error = %e, "Refresh merge started for an unknown request");
            }
        }
    }

    fn on_refresh_parsed(
        &mut self,
        request: Option<RequestId>,
        generation: u64,
        result: Result<NavigationRoute, ParsingError>,
        origin: RouterOrigin,
        context: Arc<RefreshContext>,
    ) {
        if let Some(id) = request {
            if let Err(e) = self.refreshes.take_owned(id, generation) {
                debug!(request_id = id, error = %e, "Dropping refreshed route");
                return;
            }
        }

        match result {
            Ok(route) => {
                info!(?request, route_id = %route.id(), "Route refreshed");
                context.callback.on_refresh_ready(route);
            }
            Err(e) => {
                let failure_type = match &e {
                    ParsingError::Operation(op) if op.is_not_supported() => RouterFailureType::RefreshNotSupported,
                    _ => RouterFailureType::ResponseParsingError,
                };
                warn!(?request, error = %e, failure_type = %failure_type, "Failed to apply route refresh");
                let message = format!("Failed to apply route refresh: {}", e);
                let cause: FailureCause = Arc::new(e);
                let failure =
                    RouterFailure::new(None, origin, message.clone(), failure_type, false).with_cause(cause.clone());
                let error = RouteRefreshError::new(message)
                    .with_failure(failure)
                    .with_cause(cause);
                context.callback.on_failure(error);
            }
        }
    }

    fn take_refresh(&mut self, request: Option<RequestId>, generation: u64) {
        if let Some(id) = request {
            let _ = self.refreshes.take_owned(id, generation);
        }
    }

    // ========== Cancellation ==========

    fn cancel_route_request(&mut self, id: RequestId) {
        match self.routes.remove(id) {
            Some(request) => {
                info!(request_id = id, "Cancelling route request");
                request.cancel();
            }
            None => debug!(request_id = id, "Route request not pending, nothing to cancel"),
        }
        self.router.load().client.cancel_route_request(id);
    }

    fn cancel_route_refresh_request(&mut self, id: RequestId) {
        match self.refreshes.remove(id) {
            Some(request) => {
                info!(request_id = id, "Cancelling route refresh");
                request.cancel();
            }
            None => debug!(request_id = id, "Route refresh not pending, nothing to cancel"),
        }
        self.router.load().client.cancel_route_refresh_request(id);
    }

    fn cancel_all(&mut self) {
        let routes = self.routes.drain();
        let refreshes = self.refreshes.drain();
        info!(
            routes = routes.len(),
            refreshes = refreshes.len(),
            "Cancelling all requests"
        );

        for (_, request) in routes.into_iter().chain(refreshes) {
            request.cancel();
        }
        self.router.load().client.cancel_all();
    }

    fn reset_router(&mut self, client: Arc<dyn NativeRouterClient>) {
        let generation = self.next_generation;
        self.next_generation += 1;

        let previous = self.router.swap(Arc::new(ActiveRouter { client, generation }));
        info!(
            previous_generation = previous.generation,
            generation,
            pending_routes = self.routes.len(),
            pending_refreshes = self.refreshes.len(),
            "Router replaced"
        );
        previous.client.cancel_all();
    }
}

/// Cloneable handle to a running [`RequestRegistry`]
#[derive(Clone)]
pub struct RouterHandle {
    sender: mpsc::UnboundedSender<Command>,
    router: Arc<ArcSwap<ActiveRouter>>,
}

impl RouterHandle {
    /// Request routes.
    ///
    /// Returns [`REQUEST_FAILURE`] when the request never reached the native
    /// router; the callback has been told why by then.
    pub async fn get_route(
        &self,
        options: RouteOptions,
        signature: GetRouteSignature,
        callback: Arc<dyn RouteCallback>,
    ) -> RequestId {
        let (reply, rx) = oneshot::channel();
        let command = Command::GetRoute {
            options: options.clone(),
            signature,
            callback: callback.clone(),
            reply,
        };
        if self.sender.send(command).is_err() {
            callback.on_failure(vec![closed_failure()], &options);
            return REQUEST_FAILURE;
        }
        match rx.await {
            Ok(id) => id,
            Err(_) => {
                callback.on_failure(vec![closed_failure()], &options);
                REQUEST_FAILURE
            }
        }
    }

    /// Request fresh traffic data for `route`.
    ///
    /// A route without a request UUID cannot be refreshed: the callback fails
    /// before this returns and the backend is not contacted.
    pub async fn get_route_refresh(
        &self,
        route: &NavigationRoute,
        request_data: RouteRefreshRequestData,
        callback: Arc<dyn RouteRefreshCallback>,
    ) -> RequestId {
        if route.data().refreshable_uuid().is_none() {
            let error = blank_uuid_error(route);
            warn!(route_id = %route.id(), "{}", error.message);
            callback.on_failure(error);
            return REQUEST_FAILURE;
        }

        let (reply, rx) = oneshot::channel();
        let command = Command::GetRouteRefresh {
            route: route.clone(),
            request_data,
            callback: callback.clone(),
            reply,
        };
        if self.sender.send(command).is_err() {
            callback.on_failure(RouteRefreshError::new(RouterError::Closed.to_string()));
            return REQUEST_FAILURE;
        }
        match rx.await {
            Ok(id) => id,
            Err(_) => {
                callback.on_failure(RouteRefreshError::new(RouterError::Closed.to_string()));
                REQUEST_FAILURE
            }
        }
    }

    /// Cancel a route request; unknown ids are ignored
    pub async fn cancel_route_request(&self, id: RequestId) -> Result<(), RouterError> {
        self.request(|reply| Command::CancelRoute { id, reply }).await
    }

    /// Cancel a route refresh; unknown ids are ignored
    pub async fn cancel_route_refresh_request(&self, id: RequestId) -> Result<(), RouterError> {
        self.request(|reply| Command::CancelRefresh { id, reply }).await
    }

    /// Cancel every pending request
    pub async fn cancel_all(&self) -> Result<(), RouterError> {
        self.request(|reply| Command::CancelAll { reply }).await
    }

    /// Install a new native router; the previous one is told to cancel all
    pub async fn reset_router(&self, client: Arc<dyn NativeRouterClient>) -> Result<(), RouterError> {
        self.request(|reply| Command::ResetRouter { client, reply }).await
    }

    pub async fn pending_counts(&self) -> Result<PendingCounts, RouterError> {
        self.request(|reply| Command::PendingCounts { reply }).await
    }

    /// Cancel everything and stop the registry task
    pub async fn shutdown(&self) -> Result<(), RouterError> {
        self.request(|reply| Command::Shutdown { reply }).await
    }

    /// Currently installed native router
    pub fn router(&self) -> Arc<dyn NativeRouterClient> {
        self.router.load().client.clone()
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, RouterError> {
        let (reply, rx) = oneshot::channel();
        self.sender.send(command(reply)).map_err(|_| RouterError::Closed)?;
        rx.await.map_err(|_| RouterError::Closed)
    }
}

impl fmt::Debug for RouterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterHandle")
            .field("generation", &self.router.load().generation)
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

fn closed_failure() -> RouterFailure {
    RouterFailure::new(
        None,
        RouterOrigin::Online,
        RouterError::Closed.to_string(),
        RouterFailureType::UnknownError,
        false,
    )
}

fn blank_uuid_error(route: &NavigationRoute) -> RouteRefreshError {
    RouteRefreshError::new(format!(
        "Route refresh failed because of a empty or null param: requestUuid = {:?}",
        route.request_uuid()
    ))
}
