//! Messages exchanged between a host and a carpool worker.
//!
//! Both directions are JSON objects of the form `{"command": ..., "payload": ...}`.

use serde::{Deserialize, Serialize};

use crate::domain::{Arrangement, Person};
use crate::planner::ProgressUpdate;

/// Request to plan carpools for a list of people.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeCarpoolsPayload {
    pub dancers: Vec<Person>,

    /// Names of arrangements the host already has, which must not be reused.
    #[serde(default)]
    pub existing_arrangement_names: Vec<String>,
}

/// Message from the host to the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "camelCase")]
pub enum HostMessage {
    /// Start a new search, abandoning any running one.
    MakeCarpools(MakeCarpoolsPayload),

    /// Abandon the running search.
    Terminate,
}

/// Message from the worker to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "payload", rename_all = "camelCase")]
pub enum WorkerMessage {
    HandleProgressUpdate(ProgressUpdate),

    /// Final result of a search. Always the last message of a search.
    HandleMadeCarpools(Vec<Arrangement>),
}
