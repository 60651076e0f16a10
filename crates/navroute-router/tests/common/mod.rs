//! Shared helpers for registry integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use navroute_core::RouterConfig;
use navroute_route::{NavigationRoute, RouteOperationResult};
use navroute_router::{
    DecodedResponseParser, GetRouteOptions, GetRouteSignature, NativeResult, NativeRouterClient,
    RefreshResultCallback, RequestId, RequestRegistry, RouteCallback, RouteRefreshCallback,
    RouteRefreshError, RouteRefreshOptions, RouteResponseParser, RouteResultCallback, RouterFailure,
    RouterHandle,
};
use navroute_types::{RouteOptions, RouterOrigin};
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::mpsc;
use url::Url;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

// ========== Mock Native Router ==========

/// How the mock answers requests
#[derive(Debug, Clone)]
pub enum Mode {
    /// Keep callbacks until the test completes them
    Deferred,
    /// Invoke the callback before returning the id
    Immediate(NativeResult),
}

pub struct MockRouterClient {
    mode: Mode,
    next_id: AtomicU64,
    route_callbacks: Mutex<HashMap<RequestId, RouteResultCallback>>,
    refresh_callbacks: Mutex<HashMap<RequestId, RefreshResultCallback>>,
    pub route_urls: Mutex<Vec<Url>>,
    pub route_options: Mutex<Vec<GetRouteOptions>>,
    pub refresh_requests: Mutex<Vec<RouteRefreshOptions>>,
    pub cancelled_routes: Mutex<Vec<RequestId>>,
    pub cancelled_refreshes: Mutex<Vec<RequestId>>,
    cancel_all_calls: AtomicUsize,
}

impl MockRouterClient {
    pub fn new(mode: Mode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            next_id: AtomicU64::new(1),
            route_callbacks: Mutex::new(HashMap::new()),
            refresh_callbacks: Mutex::new(HashMap::new()),
            route_urls: Mutex::new(Vec::new()),
            route_options: Mutex::new(Vec::new()),
            refresh_requests: Mutex::new(Vec::new()),
            cancelled_routes: Mutex::new(Vec::new()),
            cancelled_refreshes: Mutex::new(Vec::new()),
            cancel_all_calls: AtomicUsize::new(0),
        })
    }

    pub fn deferred() -> Arc<Self> {
        Self::new(Mode::Deferred)
    }

    pub fn immediate(result: NativeResult) -> Arc<Self> {
        Self::new(Mode::Immediate(result))
    }

    /// Answer a pending route request; `false` if it is not held
    pub fn complete_route(&self, id: RequestId, result: NativeResult) -> bool {
        let callback = self.route_callbacks.lock().remove(&id);
        match callback {
            Some(callback) => {
                callback(result, RouterOrigin::Online);
                true
            }
            None => false,
        }
    }

    /// Answer a pending refresh request; `false` if it is not held
    pub fn complete_refresh(&self, id: RequestId, result: NativeResult) -> bool {
        let callback = self.refresh_callbacks.lock().remove(&id);
        match callback {
            Some(callback) => {
                callback(result, RouterOrigin::Online);
                true
            }
            None => false,
        }
    }

    pub fn cancel_all_calls(&self) -> usize {
        self.cancel_all_calls.load(Ordering::SeqCst)
    }

    fn next_id(&self) -> RequestId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

impl NativeRouterClient for MockRouterClient {
    fn get_route(
        &self,
        url: &Url,
        options: &GetRouteOptions,
        _signature: &GetRouteSignature,
        callback: RouteResultCallback,
    ) -> RequestId {
        let id = self.next_id();
        self.route_urls.lock().push(url.clone());
        self.route_options.lock().push(options.clone());
        match &self.mode {
            Mode::Deferred => {
                self.route_callbacks.lock().insert(id, callback);
            }
            Mode::Immediate(result) => callback(result.clone(), RouterOrigin::Online),
        }
        id
    }

    fn get_route_refresh(&self, options: &RouteRefreshOptions, callback: RefreshResultCallback) -> RequestId {
        let id = self.next_id();
        self.refresh_requests.lock().push(options.clone());
        match &self.mode {
            Mode::Deferred => {
                self.refresh_callbacks.lock().insert(id, callback);
            }
            Mode::Immediate(result) => callback(result.clone(), RouterOrigin::Online),
        }
        id
    }

    fn cancel_route_request(&self, id: RequestId) {
        self.cancelled_routes.lock().push(id);
    }

    fn cancel_route_refresh_request(&self, id: RequestId) {
        self.cancelled_refreshes.lock().push(id);
    }

    fn cancel_all(&self) {
        self.cancel_all_calls.fetch_add(1, Ordering::SeqCst);
    }
}

// ========== Recording Callbacks ==========

#[derive(Debug)]
pub enum RouteEvent {
    Ready(Vec<NavigationRoute>, RouterOrigin),
    Failure(Vec<RouterFailure>),
    Canceled(RouterOrigin),
}

pub struct RecordingRouteCallback {
    tx: mpsc::UnboundedSender<RouteEvent>,
}

impl RouteCallback for RecordingRouteCallback {
    fn on_routes_ready(&self, routes: Vec<NavigationRoute>, router_origin: RouterOrigin) {
        let _ = self.tx.send(RouteEvent::Ready(routes, router_origin));
    }

    fn on_failure(&self, reasons: Vec<RouterFailure>, _route_options: &RouteOptions) {
        let _ = self.tx.send(RouteEvent::Failure(reasons));
    }

    fn on_canceled(&self, _route_options: &RouteOptions, router_origin: RouterOrigin) {
        let _ = self.tx.send(RouteEvent::Canceled(router_origin));
    }
}

pub fn route_callback() -> (Arc<RecordingRouteCallback>, mpsc::UnboundedReceiver<RouteEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(RecordingRouteCallback { tx }), rx)
}

#[derive(Debug)]
pub enum RefreshEvent {
    Ready(NavigationRoute),
    Failure(RouteRefreshError),
}

pub struct RecordingRefreshCallback {
    tx: mpsc::UnboundedSender<RefreshEvent>,
}

impl RouteRefreshCallback for RecordingRefreshCallback {
    fn on_refresh_ready(&self, route: NavigationRoute) {
        let _ = self.tx.send(RefreshEvent::Ready(route));
    }

    fn on_failure(&self, error: RouteRefreshError) {
        let _ = self.tx.send(RefreshEvent::Failure(error));
    }
}

pub fn refresh_callback() -> (Arc<RecordingRefreshCallback>, mpsc::UnboundedReceiver<RefreshEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(RecordingRefreshCallback { tx }), rx)
}

/// Wait for the next event, failing the test after two seconds
pub async fn next_event<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for a callback")
        .expect("callback channel closed")
}

/// Assert that nothing else is delivered for a short while
pub async fn assert_no_event<T: std::fmt::Debug>(rx: &mut mpsc::UnboundedReceiver<T>) {
    tokio::time::sleep(Duration::from_millis(100)).await;
    if let Ok(event) = rx.try_recv() {
        panic!("unexpected callback: {:?}", event);
    }
}

// ========== Gated Parser ==========

/// Parser that blocks until the test opens the gate
pub struct GatedParser {
    started: mpsc::UnboundedSender<()>,
    gate: Mutex<std::sync::mpsc::Receiver<()>>,
}

impl GatedParser {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<()>, std::sync::mpsc::Sender<()>) {
        let (started, started_rx) = mpsc::unbounded_channel();
        let (gate_tx, gate) = std::sync::mpsc::channel();
        let parser = Arc::new(Self {
            started,
            gate: Mutex::new(gate),
        });
        (parser, started_rx, gate_tx)
    }
}

impl RouteResponseParser for GatedParser {
    fn parse(
        &self,
        body: &[u8],
        route_options: &RouteOptions,
        router_origin: RouterOrigin,
        response_time_elapsed_seconds: u64,
    ) -> RouteOperationResult<Vec<NavigationRoute>> {
        let _ = self.started.send(());
        let _ = self.gate.lock().recv();
        DecodedResponseParser.parse(body, route_options, router_origin, response_time_elapsed_seconds)
    }
}

// ========== Registry ==========

pub fn start_registry(client: Arc<MockRouterClient>) -> RouterHandle {
    start_registry_with(client, RouterConfig::default(), |registry| registry)
}

pub fn start_registry_with(
    client: Arc<MockRouterClient>,
    config: RouterConfig,
    customize: impl FnOnce(RequestRegistry) -> RequestRegistry,
) -> RouterHandle {
    let (registry, handle) = RequestRegistry::new(client, config);
    tokio::spawn(customize(registry).run());
    handle
}

// ========== Fixtures ==========

pub fn route_options() -> RouteOptions {
    RouteOptions::new(
        "https://api.example.com",
        "driving-traffic",
        vec![[13.40, 52.50], [13.42, 52.52]],
    )
    .with_annotations(&["duration", "congestion_numeric"])
    .with_refresh(true)
}

pub fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn leg_json() -> serde_json::Value {
    json!({
        "distance": 40.0,
        "duration": 40.0,
        "annotation": {
            "duration": [10.0, 10.0, 10.0, 10.0],
            "congestion_numeric": [5, 5, 5, 5]
        },
        "steps": [
            {
                "distance": 40.0,
                "duration": 40.0,
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[0.0, 0.0], [0.1, 0.0], [0.2, 0.0], [0.3, 0.0], [0.4, 0.0]]
                }
            }
        ]
    })
}

/// Directions response with two single-leg routes
pub fn directions_body(uuid: &str) -> Vec<u8> {
    json!({
        "code": "Ok",
        "uuid": uuid,
        "waypoints": [
            { "name": "origin", "location": [13.40, 52.50] },
            { "name": "destination", "location": [13.42, 52.52] }
        ],
        "routes": [
            { "distance": 40.0, "duration": 40.0, "refresh_ttl": 120, "legs": [leg_json()] },
            { "distance": 45.0, "duration": 50.0, "legs": [leg_json()] }
        ]
    })
    .to_string()
    .into_bytes()
}

/// Refresh response replacing the leg durations
pub fn refresh_body(refresh_ttl: u32) -> Vec<u8> {
    json!({
        "code": "Ok",
        "route": {
            "refresh_ttl": refresh_ttl,
            "legs": [{
                "annotation": {
                    "duration": [20.0, 20.0, 20.0, 20.0],
                    "congestion_numeric": [50, 50, 50, 50]
                }
            }]
        }
    })
    .to_string()
    .into_bytes()
}

/// First decoded route of [`directions_body`]
pub fn parsed_route(uuid: &str) -> NavigationRoute {
    NavigationRoute::parse_directions_response(&directions_body(uuid), &route_options(), RouterOrigin::Online, 0)
        .expect("fixture parses")
        .remove(0)
}
