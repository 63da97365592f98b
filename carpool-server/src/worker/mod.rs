//! Background carpool worker.
//!
//! A [`CarpoolWorker`] runs one search at a time on tokio's blocking pool and
//! hands its messages back over a channel. Starting a new search, or
//! terminating, abandons the running one: the search is asked to stop and its
//! channel is dropped, so nothing it sends afterwards reaches the host.

mod protocol;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::domain::{ArrangementNames, DomainError, Roster};
use crate::planner::{PlannerConfig, ProgressSink, ProgressUpdate, SearchOutcome, plan_carpools};

pub use protocol::{HostMessage, MakeCarpoolsPayload, WorkerMessage};

/// Error handling a host message.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The roster was rejected; no search was started
    #[error("invalid roster: {0}")]
    Domain(#[from] DomainError),

    /// The message could not be parsed
    #[error("invalid message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Forwards a search's output to the worker channel.
struct ChannelSink {
    tx: mpsc::UnboundedSender<WorkerMessage>,
    cancelled: Arc<AtomicBool>,
}

impl ProgressSink for ChannelSink {
    fn progress(&mut self, update: ProgressUpdate) {
        // Receiver gone means the search was abandoned; is_cancelled catches it
        let _ = self.tx.send(WorkerMessage::HandleProgressUpdate(update));
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed) || self.tx.is_closed()
    }
}

/// The running search.
struct WorkerSession {
    id: u64,
    cancelled: Arc<AtomicBool>,
    rx: mpsc::UnboundedReceiver<WorkerMessage>,
}

/// Runs carpool searches on behalf of one host.
pub struct CarpoolWorker {
    config: Arc<PlannerConfig>,
    session: Option<WorkerSession>,
    next_id: u64,
}

impl CarpoolWorker {
    pub fn new(config: Arc<PlannerConfig>) -> Self {
        Self {
            config,
            session: None,
            next_id: 0,
        }
    }

    /// Returns true while a search may still produce messages.
    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Parse and handle a JSON message from the host.
    pub fn post(&mut self, message: &str) -> Result<(), WorkerError> {
        let message: HostMessage = serde_json::from_str(message)?;
        self.handle(message)
    }

    pub fn handle(&mut self, message: HostMessage) -> Result<(), WorkerError> {
        match message {
            HostMessage::MakeCarpools(payload) => self.start(payload),
            HostMessage::Terminate => {
                self.terminate();
                Ok(())
            }
        }
    }

    /// Start a search, abandoning any running one.
    ///
    /// The roster is validated first; if it is rejected, nothing is started and
    /// a running search is left alone. Must be called within a tokio runtime.
    pub fn start(&mut self, payload: MakeCarpoolsPayload) -> Result<(), WorkerError> {
        let roster = Roster::new(payload.dancers)?;
        let names = ArrangementNames::new(payload.existing_arrangement_names);

        self.terminate();

        let id = self.next_id;
        self.next_id += 1;

        let (tx, rx) = mpsc::unbounded_channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let sink = ChannelSink {
            tx: tx.clone(),
            cancelled: Arc::clone(&cancelled),
        };
        let config = Arc::clone(&self.config);

        info!(search = id, people = roster.len(), "Starting carpool worker");
        tokio::task::spawn_blocking(move || {
            match plan_carpools(&roster, &config, names, sink) {
                Ok(SearchOutcome::Finished(result)) => {
                    if tx
                        .send(WorkerMessage::HandleMadeCarpools(result.arrangements))
                        .is_err()
                    {
                        debug!(search = id, "Result discarded, host stopped listening");
                    }
                }
                Ok(SearchOutcome::Cancelled) => {
                    debug!(search = id, "Carpool worker stopped");
                }
                Err(e) => {
                    error!(search = id, error = %e, "Carpool search failed");
                }
            }
        });

        self.session = Some(WorkerSession { id, cancelled, rx });
        Ok(())
    }

    /// Abandon the running search, if any.
    ///
    /// No message from it will be returned by [`recv`](Self::recv) afterwards.
    pub fn terminate(&mut self) {
        if let Some(session) = self.session.take() {
            session.cancelled.store(true, Ordering::Relaxed);
            debug!(search = session.id, "Terminating carpool worker");
        }
    }

    /// Wait for the next message from the running search.
    ///
    /// Returns `None` once the search has finished and all of its messages
    /// have been received, or if no search is running.
    pub async fn recv(&mut self) -> Option<WorkerMessage> {
        let session = self.session.as_mut()?;
        let message = session.rx.recv().await;
        if message.is_none() {
            self.session = None;
        }
        message
    }
}

impl Drop for CarpoolWorker {
    fn drop(&mut self) {
        self.terminate();
    }
}
