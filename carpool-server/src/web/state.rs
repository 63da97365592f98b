//! Application state for the web layer.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::planner::PlannerConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Configuration for every search started by this server
    pub config: Arc<PlannerConfig>,

    /// Worker sockets currently open
    workers: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config: Arc::new(config),
            workers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns the number of worker sockets whose worker has not yet been
    /// terminated.
    pub fn active_workers(&self) -> usize {
        self.workers.load(Ordering::SeqCst)
    }

    /// Count a worker as active until the returned guard is dropped.
    pub(crate) fn worker_opened(&self) -> WorkerGuard {
        self.workers.fetch_add(1, Ordering::SeqCst);
        WorkerGuard(Arc::clone(&self.workers))
    }
}

/// Keeps a worker counted in [`AppState::active_workers`].
pub(crate) struct WorkerGuard(Arc<AtomicUsize>);

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
