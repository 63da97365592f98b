//! Progress reporting out of a running search.
//!
//! The search loop calls into a [`ProgressSink`] after relaxing edges. What
//! the sink does with an update (send it to a host, record it, drop it) never
//! feeds back into the search, except that a sink may ask the search to stop.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::domain::Arrangement;

/// Snapshot of how far a search has got.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    /// Entries currently waiting in the frontier.
    pub num_arrangements_discovered: usize,

    /// Nodes finalized so far.
    pub num_arrangements_explored: usize,

    /// The most recently relaxed node, for live display.
    pub latest_arrangement_explored: Arrangement,
}

/// Receiver for progress updates.
pub trait ProgressSink {
    /// Called with a new update. Must not block.
    fn progress(&mut self, update: ProgressUpdate);

    /// Returns true once nobody wants the result any more.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Sink that ignores every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn progress(&mut self, _update: ProgressUpdate) {}
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn progress(&mut self, update: ProgressUpdate) {
        (**self).progress(update);
    }

    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Rate limiter for progress updates.
#[derive(Debug)]
pub(crate) struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns true if an update may be sent now, and records it as sent.
    pub(crate) fn ready(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}
