use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use participe_logging::{participe_info, participe_warn};
use thiserror::Error;

use crate::submit::{ReqwestSubmitter, SubmitSettings, Submitter};
use crate::{AttemptId, EngineEvent, FailureKind, PayloadPart, SubmitError, SubmitReceipt};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error("failed to spawn engine thread: {0}")]
    Thread(#[source] io::Error),
    #[error("engine thread is gone")]
    Disconnected,
}

enum EngineCommand {
    Submit {
        attempt_id: AttemptId,
        action: String,
        parts: Vec<PayloadPart>,
    },
}

pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: SubmitSettings) -> Result<Self, EngineError> {
        Self::with_submitter(Arc::new(ReqwestSubmitter::new(settings)))
    }

    pub fn with_submitter(submitter: Arc<dyn Submitter>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new().map_err(EngineError::Runtime)?;

        thread::Builder::new()
            .name("participe-engine".into())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let submitter = submitter.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        handle_command(submitter.as_ref(), command, event_tx).await;
                    });
                }
            })
            .map_err(EngineError::Thread)?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn submit(
        &self,
        attempt_id: AttemptId,
        action: impl Into<String>,
        parts: Vec<PayloadPart>,
    ) -> Result<(), EngineError> {
        self.cmd_tx
            .send(EngineCommand::Submit {
                attempt_id,
                action: action.into(),
                parts,
            })
            .map_err(|_| EngineError::Disconnected)
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event. `None` once the engine thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

/// Reports the attempt exactly once: explicitly via `complete`, or as
/// `Aborted` when the request task unwinds or is dropped first.
struct CompletionGuard {
    attempt_id: AttemptId,
    event_tx: Option<mpsc::Sender<EngineEvent>>,
}

impl CompletionGuard {
    fn new(attempt_id: AttemptId, event_tx: mpsc::Sender<EngineEvent>) -> Self {
        Self {
            attempt_id,
            event_tx: Some(event_tx),
        }
    }

    fn complete(mut self, result: Result<SubmitReceipt, SubmitError>) {
        if let Some(tx) = self.event_tx.take() {
            let _ = tx.send(EngineEvent::SubmissionCompleted {
                attempt_id: self.attempt_id,
                result,
            });
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.event_tx.take() {
            participe_warn!("attempt_id={} ended without a result", self.attempt_id);
            let _ = tx.send(EngineEvent::SubmissionCompleted {
                attempt_id: self.attempt_id,
                result: Err(SubmitError::new(
                    FailureKind::Aborted,
                    "request task ended before completing",
                )),
            });
        }
    }
}

async fn handle_command(
    submitter: &dyn Submitter,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Submit {
            attempt_id,
            action,
            parts,
        } => {
            let guard = CompletionGuard::new(attempt_id, event_tx);
            participe_info!(
                "POST attempt_id={} parts={} action={}",
                attempt_id,
                parts.len(),
                action
            );
            let result = submitter.submit(attempt_id, &action, parts).await;
            guard.complete(result);
        }
    }
}
