//! Pending map of in-flight requests
//!
//! Entries are keyed by the request id the native router returned and
//! tagged with the generation of the router that issued them, so a late
//! response can be matched against the entry it belongs to.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::native::RequestId;

/// Pending map errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PendingRequestError {
    #[error("Request not found: {0}")]
    RequestNotFound(RequestId),

    #[error("Request {id} belongs to router generation {owner}, not {generation}")]
    NotOwned {
        id: RequestId,
        owner: u64,
        generation: u64,
    },
}

/// Bookkeeping of one in-flight request
pub struct OngoingRequest {
    /// Generation of the router that issued the request
    pub generation: u64,

    /// Response parsing job, once the response has arrived
    pub parsing_job: Option<AbortHandle>,

    on_cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl OngoingRequest {
    /// Create a new ongoing request
    pub fn new(generation: u64, on_cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            generation,
            parsing_job: None,
            on_cancel: Some(Box::new(on_cancel)),
        }
    }

    /// Notify the caller and abort the parsing job
    pub fn cancel(mut self) {
        if let Some(on_cancel) = self.on_cancel.take() {
            on_cancel();
        }
        if let Some(job) = self.parsing_job.take() {
            job.abort();
        }
    }
}

impl fmt::Debug for OngoingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OngoingRequest")
            .field("generation", &self.generation)
            .field("parsing", &self.parsing_job.is_some())
            .finish()
    }
}

/// In-flight requests of one kind
#[derive(Debug)]
pub struct PendingRequests {
    /// Request kind, for logs
    kind: &'static str,

    entries: HashMap<RequestId, OngoingRequest>,
}

impl PendingRequests {
    /// Create a new pending map
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
        }
    }

    /// Store a request, returning the entry it displaced
    pub fn insert(&mut self, id: RequestId, request: OngoingRequest) -> Option<OngoingRequest> {
        let generation = request.generation;
        let displaced = self.entries.insert(id, request);
        if let Some(displaced) = &displaced {
            warn!(
                kind = self.kind,
                request_id = id,
                displaced_generation = displaced.generation,
                generation,
                "Request id reused while still pending"
            );
        }
        debug!(kind = self.kind, request_id = id, pending = self.entries.len(), "Request registered");
        displaced
    }

    /// Remove a request regardless of its owner
    pub fn remove(&mut self, id: RequestId) -> Option<OngoingRequest> {
        let removed = self.entries.remove(&id);
        if removed.is_some() {
            debug!(kind = self.kind, request_id = id, pending = self.entries.len(), "Request removed");
        }
        removed
    }

    /// Check that `id` is pending and was issued by `generation`
    pub fn check_owned(&self, id: RequestId, generation: u64) -> Result<(), PendingRequestError> {
        let request = self
            .entries
            .get(&id)
            .ok_or(PendingRequestError::RequestNotFound(id))?;
        if request.generation != generation {
            return Err(PendingRequestError::NotOwned {
                id,
                owner: request.generation,
                generation,
            });
        }
        Ok(())
    }

    /// Remove `id` if it was issued by `generation`
    pub fn take_owned(&mut self, id: RequestId, generation: u64) -> Result<OngoingRequest, PendingRequestError> {
        self.check_owned(id, generation)?;
        self.remove(id).ok_or(PendingRequestError::RequestNotFound(id))
    }

    /// Track the parsing job of a pending request
    pub fn attach_parsing_job(&mut self, id: RequestId, job: AbortHandle) -> Result<(), PendingRequestError> {
        let request = self
            .entries
            .get_mut(&id)
            .ok_or(PendingRequestError::RequestNotFound(id))?;
        request.parsing_job = Some(job);
        Ok(())
    }

    /// Remove every request
    pub fn drain(&mut self) -> Vec<(RequestId, OngoingRequest)> {
        let drained: Vec<_> = self.entries.drain().collect();
        if !drained.is_empty() {
            debug!(kind = self.kind, count = drained.len(), "Pending requests drained");
        }
        drained
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of all pending requests, unordered
    pub fn ids(&self) -> Vec<RequestId> {
        self.entries.keys().copied().collect()
    }
}
