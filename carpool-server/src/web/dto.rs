//! Data transfer objects for web requests and responses.

use serde::Serialize;

use crate::domain::Arrangement;
use crate::planner::SearchStats;

/// Response for a one-shot carpool search.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarpoolsResponse {
    /// Best arrangements, best first
    pub arrangements: Vec<Arrangement>,

    pub stats: SearchStats,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
