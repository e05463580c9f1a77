//! Scripted in-memory transport for tests.
//!
//! Replies are consumed in order; once the script runs out the last reply
//! repeats. Every request is recorded along with the tokio instant it
//! arrived, so paused-clock tests can assert on backoff spacing.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Respond with a status and body.
    Status(u16, String),
    /// Never respond.
    Hang,
    /// Fail below the HTTP level.
    Network(String),
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Reply::Status(200, body.into())
    }

    pub fn status(status: u16) -> Self {
        Reply::Status(status, String::new())
    }
}

/// A request as seen by the scripted transport.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub request: HttpRequest,
    pub at: Instant,
}

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<Reply>,
    last: Option<Reply>,
    recorded: Vec<Recorded>,
}

/// Transport that answers from a fixed script.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self { script: Mutex::new(Script { replies: replies.into_iter().collect(), ..Default::default() }) }
    }

    /// Number of requests received so far.
    pub fn calls(&self) -> usize {
        self.lock().recorded.len()
    }

    /// Snapshot of every received request.
    pub fn recorded(&self) -> Vec<Recorded> {
        self.lock().recorded.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_reply(&self, request: HttpRequest) -> Reply {
        let mut script = self.lock();
        script.recorded.push(Recorded { request, at: Instant::now() });

        match script.replies.pop_front() {
            Some(reply) => {
                script.last = Some(reply.clone());
                reply
            }
            None => script.last.clone().unwrap_or_else(|| Reply::Network("script exhausted".into())),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        match self.next_reply(request) {
            Reply::Status(status, body) => Ok(HttpResponse::new(status, body)),
            Reply::Hang => std::future::pending().await,
            Reply::Network(msg) => Err(TransportError::Network(msg)),
        }
    }
}
