#![forbid(unsafe_code)]

//! Response service boundary and background resolution.
//!
//! A recognized gesture becomes a [`ResponseRequest`]: the intent prompt,
//! the conversation so far, and a [`ResponseTicket`]. Whoever owns the
//! session resolves the request against a [`ResponseService`], either inline
//! or on a [`ResponseWorker`] thread, and hands the [`ResponseCompletion`]
//! back to the session.
//!
//! # Design Notes
//!
//! - The session never blocks on a resolution. It enters `responding` as soon
//!   as the request is issued.
//! - Tickets carry the conversation generation. Clearing the conversation
//!   bumps the generation, so completions for earlier requests are dropped.
//! - There is no resolver timeout.

use std::fmt;
use std::sync::mpsc;
use std::thread;

use serde::{Deserialize, Serialize};
use touchlang_core::{Context, GestureClassification, ResponsePayload, resolve_response};
use web_time::Duration;

use crate::error::ServiceError;

/// What a service returns for one request.
pub type ResponseReply = ResponsePayload;

/// Text shown when the service fails.
pub const FALLBACK_REPLY: &str = "I couldn't process that right now. Try again!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One exchange half in the conversation sent to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Identifies an issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResponseTicket {
    /// Sequence number, unique per session.
    pub id: u64,
    /// Conversation generation at issue time.
    pub generation: u64,
}

impl fmt::Display for ResponseTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@g{}", self.id, self.generation)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRequest {
    pub ticket: ResponseTicket,
    pub classification: GestureClassification,
    pub context: Context,
    /// Intent label resolved for the gesture.
    pub intent: String,
    /// Natural-language prompt describing the gesture.
    pub prompt: String,
    /// Conversation before this request, oldest first.
    pub history: Vec<ConversationTurn>,
}

/// The outcome of resolving one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCompletion {
    pub ticket: ResponseTicket,
    pub result: Result<ResponseReply, ServiceError>,
}

impl ResponseCompletion {
    /// Resolve `request` on `service` right now.
    pub fn resolve(service: &dyn ResponseService, request: &ResponseRequest) -> Self {
        Self {
            ticket: request.ticket,
            result: service.resolve(request),
        }
    }
}

/// Something that turns an intent prompt into a reply.
pub trait ResponseService: Send {
    fn resolve(&self, request: &ResponseRequest) -> Result<ResponseReply, ServiceError>;
}

/// Offline responder backed by the built-in response tables.
///
/// An optional delay simulates network latency; it blocks the calling
/// thread, so use it from a [`ResponseWorker`].
#[derive(Debug, Clone, Default)]
pub struct LocalResponder {
    delay: Duration,
}

impl LocalResponder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl ResponseService for LocalResponder {
    fn resolve(&self, request: &ResponseRequest) -> Result<ResponseReply, ServiceError> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        Ok(resolve_response(&request.classification.kind, request.context))
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// Resolves requests on a background thread.
///
/// Requests are processed in submission order. Dropping the worker closes
/// the request channel; the thread exits after finishing its current item.
pub struct ResponseWorker {
    requests: Option<mpsc::Sender<ResponseRequest>>,
    completions: mpsc::Receiver<ResponseCompletion>,
    thread: Option<thread::JoinHandle<()>>,
}

impl fmt::Debug for ResponseWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseWorker")
            .field("running", &self.requests.is_some())
            .finish_non_exhaustive()
    }
}

impl ResponseWorker {
    /// Start a worker thread that owns `service`.
    pub fn spawn<S: ResponseService + 'static>(service: S) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<ResponseRequest>();
        let (done_tx, done_rx) = mpsc::channel();
        let thread = thread::spawn(move || {
            for request in req_rx {
                let completion = ResponseCompletion::resolve(&service, &request);
                if done_tx.send(completion).is_err() {
                    break;
                }
            }
            tracing::trace!(target: "touchlang.response", "response worker exiting");
        });
        Self {
            requests: Some(req_tx),
            completions: done_rx,
            thread: Some(thread),
        }
    }

    /// Queue `request` for resolution.
    pub fn submit(&self, request: ResponseRequest) -> Result<(), ServiceError> {
        let ticket = request.ticket;
        let sender = self.requests.as_ref().ok_or(ServiceError::Disconnected)?;
        sender.send(request).map_err(|_| ServiceError::Disconnected)?;
        tracing::trace!(target: "touchlang.response", ticket = %ticket, "request queued");
        Ok(())
    }

    /// A finished completion, if one is ready.
    #[must_use]
    pub fn try_recv(&self) -> Option<ResponseCompletion> {
        self.completions.try_recv().ok()
    }

    /// Wait up to `timeout` for the next completion.
    #[must_use]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ResponseCompletion> {
        self.completions.recv_timeout(timeout).ok()
    }

    /// Stop accepting requests and wait for the thread to finish.
    ///
    /// Returns the completions produced for already-queued requests.
    pub fn shutdown(mut self) -> Vec<ResponseCompletion> {
        self.requests = None;
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
        self.completions.try_iter().collect()
    }
}

impl Drop for ResponseWorker {
    fn drop(&mut self) {
        // Closing the channel ends the thread; don't join to avoid blocking.
        self.requests = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use touchlang_core::{Emotion, GestureKind, Pressure};

    fn request(id: u64, kind: GestureKind, context: Context) -> ResponseRequest {
        ResponseRequest {
            ticket: ResponseTicket { id, generation: 0 },
            classification: GestureClassification {
                kind,
                pressure: Pressure::Medium,
                velocity: 0.0,
                fingers: 1,
            },
            context,
            intent: String::new(),
            prompt: String::new(),
            history: Vec::new(),
        }
    }

    struct Counting(Arc<AtomicUsize>);

    impl ResponseService for Counting {
        fn resolve(&self, _request: &ResponseRequest) -> Result<ResponseReply, ServiceError> {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            if n % 2 == 1 {
                Err(ServiceError::unavailable("odd"))
            } else {
                Ok(ResponsePayload {
                    text: format!("reply {n}"),
                    emotion: Emotion::Neutral,
                    options: Vec::new(),
                })
            }
        }
    }

    #[test]
    fn local_responder_uses_tables() {
        let reply = LocalResponder::new()
            .resolve(&request(1, GestureKind::Tap(Pressure::Heavy), Context::Brainstorming))
            .unwrap();
        assert_eq!(reply.emotion, Emotion::Joyful);
    }

    #[test]
    fn inline_completion_carries_ticket() {
        let req = request(7, GestureKind::Unknown, Context::General);
        let done = ResponseCompletion::resolve(&LocalResponder::new(), &req);
        assert_eq!(done.ticket.id, 7);
        assert!(done.result.is_ok());
    }

    #[test]
    fn worker_preserves_order_and_errors() {
        let worker = ResponseWorker::spawn(Counting(Arc::new(AtomicUsize::new(0))));
        for id in 0..4 {
            worker
                .submit(request(id, GestureKind::Tap(Pressure::Medium), Context::General))
                .unwrap();
        }
        let mut got = Vec::new();
        while got.len() < 4 {
            let done = worker
                .recv_timeout(Duration::from_secs(5))
                .expect("worker should reply");
            got.push(done);
        }
        let ids: Vec<u64> = got.iter().map(|c| c.ticket.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert!(got[0].result.is_ok());
        assert_eq!(got[1].result, Err(ServiceError::unavailable("odd")));
    }

    #[test]
    fn shutdown_drains_queue() {
        let worker = ResponseWorker::spawn(LocalResponder::new());
        worker
            .submit(request(1, GestureKind::Tap(Pressure::Medium), Context::General))
            .unwrap();
        let rest = worker.shutdown();
        assert_eq!(rest.len(), 1);
    }

    #[test]
    fn ticket_display() {
        let t = ResponseTicket { id: 3, generation: 2 };
        assert_eq!(t.to_string(), "#3@g2");
    }
}
