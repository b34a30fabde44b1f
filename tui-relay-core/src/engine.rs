//! The engine boundary
//!
//! The engine is whatever consumes submitted actions: a backend process, an
//! IPC peer, a simulation in tests. The dispatcher only ever calls
//! [`Engine::submit`] and, on failure, [`Engine::report_error`].

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::action::ActionId;
use crate::error::EngineError;

/// Future returned by [`Engine::submit`].
pub type SubmitFuture = Pin<Box<dyn Future<Output = Result<(), EngineError>> + Send + 'static>>;

/// One action submitted to the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Identifier of the submitted action.
    pub action: ActionId,
    /// Debug symbol of the key that was dispatched, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_symbol: Option<String>,
    /// Payload converted from the key's payload type.
    pub payload: Value,
}

/// External collaborator receiving submitted actions.
pub trait Engine: Send + Sync + 'static {
    /// Submit an action and resolve with its outcome.
    ///
    /// The returned future is driven on a spawned task, never on the UI
    /// loop.
    fn submit(&self, submission: Submission) -> SubmitFuture;

    /// Error channel for failed submissions.
    fn report_error(&self, action: &ActionId, error: &EngineError) {
        tracing::error!(action = %action, error = %error, "Engine reported failure");
    }
}

/// A submission waiting for an answer from the engine side.
#[derive(Debug)]
pub struct PendingSubmission {
    submission: Submission,
    reply: oneshot::Sender<Result<(), EngineError>>,
}

impl PendingSubmission {
    /// The submitted action and payload.
    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// Identifier of the submitted action.
    pub fn action(&self) -> &ActionId {
        &self.submission.action
    }

    /// Payload of the submission.
    pub fn payload(&self) -> &Value {
        &self.submission.payload
    }

    /// Answer with an outcome.
    pub fn respond(self, outcome: Result<(), EngineError>) {
        // The dispatcher side may have been dropped on shutdown.
        let _ = self.reply.send(outcome);
    }

    /// Answer with success.
    pub fn succeed(self) {
        self.respond(Ok(()));
    }

    /// Answer with failure.
    pub fn fail(self, error: EngineError) {
        self.respond(Err(error));
    }
}

/// Receiving side of a [`ChannelEngine`].
#[derive(Debug)]
pub struct EngineInbox {
    rx: mpsc::UnboundedReceiver<PendingSubmission>,
}

impl EngineInbox {
    /// Wait for the next submission.
    pub async fn recv(&mut self) -> Option<PendingSubmission> {
        self.rx.recv().await
    }

    /// Take a submission if one is already queued.
    pub fn try_recv(&mut self) -> Option<PendingSubmission> {
        self.rx.try_recv().ok()
    }

    /// Take every queued submission.
    pub fn drain(&mut self) -> Vec<PendingSubmission> {
        let mut pending = Vec::new();
        while let Ok(p) = self.rx.try_recv() {
            pending.push(p);
        }
        pending
    }
}

/// Engine adapter that forwards submissions over a channel.
///
/// The other end, an [`EngineInbox`], answers each [`PendingSubmission`].
/// Dropping a pending submission without answering resolves it as
/// [`EngineError::Disconnected`].
///
/// # Example
///
/// ```ignore
/// let (engine, mut inbox) = ChannelEngine::new();
/// tokio::spawn(async move {
///     while let Some(pending) = inbox.recv().await {
///         backend.handle(pending.submission()).await;
///         pending.succeed();
///     }
/// });
/// ```
#[derive(Debug, Clone)]
pub struct ChannelEngine {
    tx: mpsc::UnboundedSender<PendingSubmission>,
    deadline: Option<Duration>,
}

impl ChannelEngine {
    /// Create a connected engine/inbox pair.
    pub fn new() -> (Self, EngineInbox) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, deadline: None }, EngineInbox { rx })
    }

    /// Fail submissions that are not answered within `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Configured deadline, if any.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}

impl Engine for ChannelEngine {
    fn submit(&self, submission: Submission) -> SubmitFuture {
        let (reply, answer) = oneshot::channel();
        let sent = self.tx.send(PendingSubmission { submission, reply });
        let deadline = self.deadline;

        Box::pin(async move {
            if sent.is_err() {
                return Err(EngineError::Disconnected);
            }
            let answer = match deadline {
                Some(limit) => match tokio::time::timeout(limit, answer).await {
                    Ok(answer) => answer,
                    Err(_) => return Err(EngineError::TimedOut(limit)),
                },
                None => answer.await,
            };
            answer.unwrap_or(Err(EngineError::Disconnected))
        })
    }
}
