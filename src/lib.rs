//! # rds_sim - Respondent-Driven Sampling Simulator
//!
//! Simulates chain-referral surveys over a synthetic social network and
//! benchmarks a bias-correcting estimator of platform preferences against the
//! naive survey proportions.
//!
//! ## Core Components
//!
//! - **PreferenceAssigner**: degree-biased ground-truth preferences (Gumbel-max sampling)
//! - **percolate**: randomized Prim-style recruitment forest grown from the seeds
//! - **build_survey**: participants = every node sharing a component with a seed
//! - **TrialRunner**: one accepted trial, retried until the survey is large enough
//! - **EstimationScorer**: true vs naive vs corrected tables and MSE rows
//! - **ExperimentDriver**: N trials over one network, scored together
//!
//! ## Usage
//!
//! ```no_run
//! use rds_sim::{ExperimentConfig, ExperimentDriver, InverseDegreeEstimator, NaiveEstimator};
//!
//! let config = ExperimentConfig {
//!     seed: Some([7u8; 32]),
//!     ..Default::default()
//! };
//! let driver = ExperimentDriver::new(config).unwrap();
//! let result = driver.run(&NaiveEstimator, &InverseDegreeEstimator).unwrap();
//! result.print_summary();
//! ```
//!
//! Any `Fn(&Survey) -> EstimateOutput` can stand in for either estimator.

pub mod rds_errors;
pub mod rds_interface;

pub mod rds_graph;
pub mod rds_percolation;
pub mod rds_preferences;
pub mod rds_survey;
pub mod rds_trial;

pub mod rds_estimators;
pub mod rds_experiment;
pub mod rds_scoring;

// Re-export commonly used types
pub use rds_errors::{Result, SimError};
pub use rds_estimators::{InverseDegreeEstimator, NaiveEstimator};
pub use rds_experiment::{ExperimentConfig, ExperimentDriver, ExperimentResult, NetworkParams};
pub use rds_graph::SocialGraph;
pub use rds_interface::{
    EstimateOutput, Estimator, Network, NodeId, NodePreferences, PlatformCatalog, Survey,
    SurveyRecord,
};
pub use rds_percolation::{percolate, PercolationResult, RetainedEdge};
pub use rds_preferences::PreferenceAssigner;
pub use rds_scoring::{ErrorRow, ErrorTable, EstimationScorer, ResultRow, ResultTable};
pub use rds_survey::build_survey;
pub use rds_trial::{TrialConfig, TrialRecord, TrialRunner};
