//! Response parsing off the registry task
//!
//! Directions responses can be large, so they are decoded on the blocking
//! pool. The number of concurrent jobs is bounded by a semaphore, and every
//! job can be aborted until it reports back.

use std::sync::Arc;

use navroute_route::{NavigationRoute, RouteOperationError, RouteOperationResult};
use navroute_types::{RouteOptions, RouterOrigin};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::AbortHandle;
use tracing::error;

/// Parsing job errors
#[derive(Debug, Error)]
pub enum ParsingError {
    #[error(transparent)]
    Operation(#[from] RouteOperationError),

    #[error("Parsing job panicked")]
    Panicked,

    #[error("Parsing pool is closed")]
    Closed,
}

/// Turns a directions response body into routes
pub trait RouteResponseParser: Send + Sync {
    fn parse(
        &self,
        body: &[u8],
        route_options: &RouteOptions,
        router_origin: RouterOrigin,
        response_time_elapsed_seconds: u64,
    ) -> RouteOperationResult<Vec<NavigationRoute>>;
}

/// Parser producing decoded routes
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodedResponseParser;

impl RouteResponseParser for DecodedResponseParser {
    fn parse(
        &self,
        body: &[u8],
        route_options: &RouteOptions,
        router_origin: RouterOrigin,
        response_time_elapsed_seconds: u64,
    ) -> RouteOperationResult<Vec<NavigationRoute>> {
        NavigationRoute::parse_directions_response(
            body,
            route_options,
            router_origin,
            response_time_elapsed_seconds,
        )
    }
}

/// Bounded pool of blocking parsing jobs
#[derive(Debug, Clone)]
pub struct ParsingPool {
    permits: Arc<Semaphore>,
}

impl ParsingPool {
    /// Create a pool running at most `workers` jobs at once
    pub fn new(workers: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Run `job` on the blocking pool and hand its outcome to `on_done`.
    ///
    /// Aborting the returned handle before the job finishes drops its
    /// outcome; `on_done` is not called.
    pub fn spawn<T, J, D>(&self, job: J, on_done: D) -> AbortHandle
    where
        T: Send + 'static,
        J: FnOnce() -> T + Send + 'static,
        D: FnOnce(Result<T, ParsingError>) + Send + 'static,
    {
        let permits = self.permits.clone();
        let task = tokio::spawn(async move {
            let result = match permits.acquire_owned().await {
                Ok(permit) => tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    job()
                })
                .await
                .map_err(|e| {
                    if e.is_panic() {
                        error!("Parsing job panicked");
                        ParsingError::Panicked
                    } else {
                        ParsingError::Closed
                    }
                }),
                Err(_) => Err(ParsingError::Closed),
            };
            on_done(result);
        });
        task.abort_handle()
    }

    /// Permits not held by a running job
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}
