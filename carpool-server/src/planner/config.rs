//! Search configuration for the carpool planner.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Error loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid JSON for this schema
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A value is out of range
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Weights, in hours-equivalent, for each thing the planner tries to avoid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CostEquivalents {
    /// Charged for a car with nobody but the driver in it.
    pub lonely_driver: f64,

    /// Charged for asking someone who is happy to drive to do so.
    pub make_willing_driver_drive: f64,

    /// Charged for asking someone who only drives if needed to do so.
    pub make_if_needed_driver_drive: f64,

    /// Charged per pair sharing a car with conflicting accommodation.
    pub prefer_different_accommodation: f64,

    /// Charged per mixed-gender pair where either prefers same-gender housing.
    pub different_gender_prefer_same_gender: f64,

    /// Charged per mixed-gender pair where neither minds.
    pub different_gender_no_preference: f64,
}

impl Default for CostEquivalents {
    fn default() -> Self {
        Self {
            lonely_driver: 2.0,
            make_willing_driver_drive: 1.0,
            make_if_needed_driver_drive: 3.0,
            prefer_different_accommodation: 2.0,
            different_gender_prefer_same_gender: 4.0,
            different_gender_no_preference: 0.5,
        }
    }
}

impl CostEquivalents {
    fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("costEquivalents.lonelyDriver", self.lonely_driver),
            (
                "costEquivalents.makeWillingDriverDrive",
                self.make_willing_driver_drive,
            ),
            (
                "costEquivalents.makeIfNeededDriverDrive",
                self.make_if_needed_driver_drive,
            ),
            (
                "costEquivalents.preferDifferentAccommodation",
                self.prefer_different_accommodation,
            ),
            (
                "costEquivalents.differentGenderPreferSameGender",
                self.different_gender_prefer_same_gender,
            ),
            (
                "costEquivalents.differentGenderNoPreference",
                self.different_gender_no_preference,
            ),
        ];

        for (field, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be a finite, non-negative number",
                });
            }
        }
        Ok(())
    }
}

/// Configuration parameters for carpool search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlannerConfig {
    /// How many more unassigned people than the best node so far a node may
    /// have before it is forgotten.
    pub num_people_to_unassign_in_search_of_better_result: usize,

    /// Maximum number of entries kept in the frontier.
    /// When reached, the more expensive half is dropped.
    pub max_queue_size: usize,

    /// Number of arrangements to return.
    pub num_arrangements: usize,

    /// Minimum time between progress updates (milliseconds).
    pub progress_interval_ms: u64,

    pub cost_equivalents: CostEquivalents,
}

impl PlannerConfig {
    /// Parse and validate a configuration from JSON.
    ///
    /// Missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check every value is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_queue_size == 0 {
            return Err(ConfigError::Invalid {
                field: "maxQueueSize",
                reason: "must be greater than zero",
            });
        }
        if self.num_arrangements == 0 {
            return Err(ConfigError::Invalid {
                field: "numArrangements",
                reason: "must be greater than zero",
            });
        }
        self.cost_equivalents.validate()
    }

    /// Returns the progress interval as a Duration.
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            num_people_to_unassign_in_search_of_better_result: 1,
            max_queue_size: 100_000,
            num_arrangements: 3,
            progress_interval_ms: 500,
            cost_equivalents: CostEquivalents::default(),
        }
    }
}
