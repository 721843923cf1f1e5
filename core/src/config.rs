//! Job descriptor and validation

use serde::{Deserialize, Serialize};

use crate::transport::HttpMethod;

/// Upper bound on the concurrency ceiling a descriptor may request
pub const MAX_CONCURRENCY: usize = 1024;

/// Request scenario for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Every task issues a GET
    Get,
    /// Every task issues a POST
    Post,
    /// Even task indices issue POST, odd indices issue GET
    Mixed,
}

impl Scenario {
    /// HTTP method for the task at `index`
    pub fn method_for(self, index: usize) -> HttpMethod {
        match self {
            Scenario::Get => HttpMethod::Get,
            Scenario::Post => HttpMethod::Post,
            Scenario::Mixed => {
                if index % 2 == 0 {
                    HttpMethod::Post
                } else {
                    HttpMethod::Get
                }
            }
        }
    }
}

impl std::str::FromStr for Scenario {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "get" => Ok(Scenario::Get),
            "post" => Ok(Scenario::Post),
            "mixed" => Ok(Scenario::Mixed),
            other => Err(ConfigError::InvalidScenario(other.to_string())),
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Scenario::Get => "get",
            Scenario::Post => "post",
            Scenario::Mixed => "mixed",
        })
    }
}

/// Parameters describing one load-test batch
///
/// A descriptor is created per invocation, validated once, and discarded
/// after dispatch. Validation covers the invariants the core owns
/// (concurrency bounds); the calling layer is responsible for rejecting
/// descriptors with a missing endpoint or target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDescriptor {
    /// Label for the backend technology under test (reporting only)
    #[serde(default)]
    pub tech: String,

    /// Request scenario
    pub scenario: Scenario,

    /// Total number of requests to issue
    pub count: usize,

    /// Identifier embedded in generated URLs
    pub target: String,

    /// Maximum number of requests in flight at once
    pub concurrency: usize,

    /// Base URL of the system under test
    pub endpoint: String,

    /// Bearer credential sent with every request
    #[serde(default)]
    pub token: String,
}

impl JobDescriptor {
    /// Validate the descriptor
    ///
    /// # Errors
    /// Returns an error if the concurrency ceiling is outside
    /// `1..=MAX_CONCURRENCY`. A zero `count` is valid and produces an
    /// empty batch.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.concurrency < 1 {
            return Err(ConfigError::InvalidConcurrency(
                "concurrency must be at least 1".into(),
            ));
        }

        if self.concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::InvalidConcurrency(format!(
                "concurrency must not exceed {MAX_CONCURRENCY}"
            )));
        }

        Ok(())
    }
}

/// Descriptor validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid concurrency value
    #[error("invalid concurrency: {0}")]
    InvalidConcurrency(String),

    /// Unrecognized scenario name
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
}
