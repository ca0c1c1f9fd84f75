//! Error taxonomy for the simulator
//!
//! Soft trial rejections (a survey below the minimum size) are retried inside
//! the trial runner and only show up here once the retry cap is exhausted.
//! Degenerate percolation is never an error.

use thiserror::Error;

/// Errors surfaced by the simulation and scoring pipeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A parameter is out of range (probability, alpha, seed count, catalog, ...)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No trial reached the minimum survey size within the retry cap
    #[error("no trial reached {min_survey_size} participants after {attempts} attempts")]
    TrialRejected {
        attempts: usize,
        min_survey_size: usize,
    },

    /// An estimator returned a platform that is not in the catalog
    #[error("estimator `{estimator}` returned unknown platform `{platform}`")]
    UnknownPlatform { estimator: String, platform: String },

    /// An estimator returned a negative or non-finite proportion
    #[error("estimator `{estimator}` returned invalid proportion {value} for `{platform}`")]
    InvalidProportion {
        estimator: String,
        platform: String,
        value: f64,
    },
}

impl SimError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SimError::InvalidConfig(msg.into())
    }

    /// True for the estimator contract violations detected at scoring time
    pub fn is_estimator_contract(&self) -> bool {
        matches!(
            self,
            SimError::UnknownPlatform { .. } | SimError::InvalidProportion { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SimError::config("alpha must be > 0");
        assert_eq!(err.to_string(), "invalid configuration: alpha must be > 0");

        let err = SimError::TrialRejected {
            attempts: 3,
            min_survey_size: 200,
        };
        assert_eq!(
            err.to_string(),
            "no trial reached 200 participants after 3 attempts"
        );
    }

    #[test]
    fn test_contract_classification() {
        let unknown = SimError::UnknownPlatform {
            estimator: "corrected".into(),
            platform: "MySpace".into(),
        };
        assert!(unknown.is_estimator_contract());
        assert!(!SimError::config("x").is_estimator_contract());
    }
}
