//! Multi-trial experiment driver
//!
//! Generates one preferential-attachment network (or takes the caller's),
//! runs `n_simulations` independent trials on it from a single seeded random
//! stream, and scores the naive and corrected estimators over all of them.

use crate::rds_errors::{Result, SimError};
use crate::rds_graph::SocialGraph;
use crate::rds_interface::{Estimator, Network, PlatformCatalog};
use crate::rds_scoring::{ErrorTable, EstimationScorer, ResultTable, CORRECTED_LABEL, NAIVE_LABEL};
use crate::rds_trial::{TrialConfig, TrialRecord, TrialRunner};
use log::info;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

// ============================================================================
// Configuration
// ============================================================================

/// Parameters of the generated network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkParams {
    /// Total number of nodes
    pub n_nodes: usize,

    /// Edges each new node attaches to existing nodes
    pub attachment: usize,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            n_nodes: 3000,
            attachment: 2,
        }
    }
}

/// Full experiment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub network: NetworkParams,

    pub trial: TrialConfig,

    /// Platform universe, also the row order of every result table
    pub platforms: Vec<String>,

    /// Number of accepted trials to run
    pub n_simulations: usize,

    /// Random seed (None = generate random)
    #[serde(skip)]
    pub seed: Option<[u8; 32]>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            network: NetworkParams::default(),
            trial: TrialConfig::default(),
            platforms: ["Facebook", "X", "Instagram", "TikTok", "LinkedIn", "YouTube"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            n_simulations: 10,
            seed: None,
        }
    }
}

impl ExperimentConfig {
    /// Get or generate seed
    pub fn resolve_seed(&self) -> [u8; 32] {
        self.seed.unwrap_or_else(|| {
            let mut temp_rng = StdRng::from_entropy();
            let mut seed = [0u8; 32];
            temp_rng.fill_bytes(&mut seed);
            seed
        })
    }

    pub fn catalog(&self) -> Result<PlatformCatalog> {
        PlatformCatalog::new(self.platforms.iter().cloned())
    }

    pub fn validate(&self) -> Result<()> {
        if self.network.n_nodes == 0 {
            return Err(SimError::config("network must contain at least one node"));
        }
        if self.network.attachment == 0 {
            return Err(SimError::config("attachment parameter must be >= 1"));
        }
        if self.n_simulations == 0 {
            return Err(SimError::config("number of simulations must be >= 1"));
        }
        self.catalog()?;
        self.trial.validate_for(self.network.n_nodes)
    }
}

// ============================================================================
// Result
// ============================================================================

/// Outcome of a full experiment
#[derive(Debug, Clone)]
pub struct ExperimentResult {
    /// Seed used for the experiment
    pub seed_used: [u8; 32],

    /// One comparison table per trial
    pub tables: Vec<ResultTable>,

    /// Two error rows per trial
    pub errors: ErrorTable,

    /// Accepted survey size per trial
    pub survey_sizes: Vec<usize>,

    /// Attempts spent per trial, rejected ones included
    pub attempts: Vec<usize>,
}

impl ExperimentResult {
    /// Print a summary of the experiment results
    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════════════╗");
        println!("║        RDS Estimator Benchmark Results                 ║");
        println!("╚════════════════════════════════════════════════════════╝\n");

        println!("Configuration:");
        println!("  Seed: {:?}", self.seed_used);
        println!("  Trials: {}\n", self.tables.len());

        if !self.survey_sizes.is_empty() {
            let min = self.survey_sizes.iter().min().copied().unwrap_or(0);
            let max = self.survey_sizes.iter().max().copied().unwrap_or(0);
            let avg =
                self.survey_sizes.iter().sum::<usize>() as f64 / self.survey_sizes.len() as f64;
            println!("Survey Statistics:");
            println!("  Survey size: min={}, max={}, avg={:.1}", min, max, avg);
            println!(
                "  Attempts: total={}, rejected={}",
                self.attempts.iter().sum::<usize>(),
                self.attempts.iter().map(|a| a - 1).sum::<usize>()
            );
            println!();
        }

        println!("Mean Squared Error:");
        for label in [NAIVE_LABEL, CORRECTED_LABEL] {
            if let Some(s) = self.errors.summary(label) {
                println!(
                    "  {:<10} mean={:.6}, min={:.6}, max={:.6}",
                    label, s.mean, s.min, s.max
                );
            }
        }
        println!(
            "  Corrected beats naive in {}/{} trials",
            self.errors.corrected_wins(),
            self.tables.len()
        );
        println!();
    }
}

// ============================================================================
// Driver
// ============================================================================

pub struct ExperimentDriver {
    config: ExperimentConfig,
    catalog: PlatformCatalog,
    runner: TrialRunner,
    rng: StdRng,
    seed: [u8; 32],
}

impl ExperimentDriver {
    pub fn new(config: ExperimentConfig) -> Result<Self> {
        config.validate()?;
        let catalog = config.catalog()?;
        let runner = TrialRunner::new(config.trial.clone())?;
        let seed = config.resolve_seed();
        let rng = StdRng::from_seed(seed);

        Ok(Self {
            config,
            catalog,
            runner,
            rng,
            seed,
        })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn seed(&self) -> [u8; 32] {
        self.seed
    }

    /// Generate the network and run the experiment on it
    pub fn run(
        mut self,
        naive: &dyn Estimator,
        corrected: &dyn Estimator,
    ) -> Result<ExperimentResult> {
        let params = &self.config.network;
        info!(
            "generating network: {} nodes, attachment {}",
            params.n_nodes, params.attachment
        );
        let network =
            SocialGraph::barabasi_albert(params.n_nodes, params.attachment, &mut self.rng)?;
        self.run_on_network(&network, naive, corrected)
    }

    /// Run the experiment on a caller-supplied network
    ///
    /// The network's node count replaces `config.network.n_nodes` for validation.
    pub fn run_on_network<N>(
        mut self,
        network: &N,
        naive: &dyn Estimator,
        corrected: &dyn Estimator,
    ) -> Result<ExperimentResult>
    where
        N: Network + ?Sized,
    {
        self.config.trial.validate_for(network.node_count())?;

        let total = self.config.n_simulations;
        let mut trials: Vec<TrialRecord> = Vec::with_capacity(total);
        for i in 0..total {
            let record = self.runner.run(network, &self.catalog, &mut self.rng)?;
            info!(
                "trial {}/{}: {} participants after {} attempt(s)",
                i + 1,
                total,
                record.survey.len(),
                record.attempts
            );
            trials.push(record);
        }

        let scorer = EstimationScorer::new(naive, corrected, &self.catalog);
        let (tables, errors) = scorer.score(&trials)?;

        Ok(ExperimentResult {
            seed_used: self.seed,
            tables,
            errors,
            survey_sizes: trials.iter().map(|t| t.survey.len()).collect(),
            attempts: trials.iter().map(|t| t.attempts).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rds_estimators::{InverseDegreeEstimator, NaiveEstimator};

    fn small_config() -> ExperimentConfig {
        ExperimentConfig {
            network: NetworkParams {
                n_nodes: 400,
                attachment: 2,
            },
            trial: TrialConfig {
                initial_sample_size: 5,
                participation_prob: 0.5,
                min_survey_size: 40,
                ..Default::default()
            },
            n_simulations: 4,
            seed: Some([42u8; 32]),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ExperimentConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let mut config = small_config();
        config.platforms.clear();
        assert!(ExperimentDriver::new(config).is_err());

        let mut config = small_config();
        config.trial.initial_sample_size = 401;
        assert!(ExperimentDriver::new(config).is_err());

        let mut config = small_config();
        config.n_simulations = 0;
        assert!(ExperimentDriver::new(config).is_err());

        let mut config = small_config();
        config.network.attachment = 0;
        assert!(ExperimentDriver::new(config).is_err());
    }

    #[test]
    fn test_experiment_produces_tables_per_trial() {
        let driver = ExperimentDriver::new(small_config()).unwrap();
        let result = driver.run(&NaiveEstimator, &InverseDegreeEstimator).unwrap();

        assert_eq!(result.seed_used, [42u8; 32]);
        assert_eq!(result.tables.len(), 4);
        assert_eq!(result.errors.rows.len(), 8);
        assert!(result.survey_sizes.iter().all(|&s| s >= 40));

        for (i, table) in result.tables.iter().enumerate() {
            assert_eq!(table.trial, i);
            let names: Vec<&str> = table.rows.iter().map(|r| r.platform.as_str()).collect();
            assert_eq!(names, vec!["Facebook", "X", "Instagram", "TikTok", "LinkedIn", "YouTube"]);

            let true_sum: f64 = table.rows.iter().map(|r| r.true_proportion).sum();
            let naive_sum: f64 = table.rows.iter().map(|r| r.naive_proportion).sum();
            let corrected_sum: f64 = table.rows.iter().map(|r| r.estimated_proportion).sum();
            assert!((true_sum - 1.0).abs() < 1e-9);
            assert!((naive_sum - 1.0).abs() < 1e-9);
            assert!((corrected_sum - 1.0).abs() < 1e-9);
        }
        assert!(result.errors.rows.iter().all(|r| r.mse >= 0.0));
    }

    #[test]
    fn test_same_seed_same_result() {
        let a = ExperimentDriver::new(small_config())
            .unwrap()
            .run(&NaiveEstimator, &InverseDegreeEstimator)
            .unwrap();
        let b = ExperimentDriver::new(small_config())
            .unwrap()
            .run(&NaiveEstimator, &InverseDegreeEstimator)
            .unwrap();
        assert_eq!(a.tables, b.tables);
        assert_eq!(a.errors, b.errors);
    }

    #[test]
    fn test_run_on_supplied_network() {
        // two disjoint triangles; full retention from 2 seeds always surveys
        // at least one whole triangle
        let network =
            SocialGraph::from_edges(6, &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]).unwrap();
        let config = ExperimentConfig {
            trial: TrialConfig {
                initial_sample_size: 2,
                participation_prob: 1.0,
                min_survey_size: 3,
                ..Default::default()
            },
            platforms: vec!["A".into(), "B".into()],
            n_simulations: 3,
            seed: Some([1u8; 32]),
            ..Default::default()
        };
        let result = ExperimentDriver::new(config)
            .unwrap()
            .run_on_network(&network, &NaiveEstimator, &NaiveEstimator)
            .unwrap();

        assert_eq!(result.tables.len(), 3);
        assert!(result.attempts.iter().all(|&a| a == 1));
        for row in result.errors.rows.chunks(2) {
            assert_eq!(row[0].mse, row[1].mse);
        }
    }

    #[test]
    fn test_config_from_yaml_uses_defaults() {
        let yaml = "
n_simulations: 3
trial:
  participation_prob: 0.3
  max_attempts: null
";
        let config: ExperimentConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.n_simulations, 3);
        assert_eq!(config.trial.participation_prob, 0.3);
        assert_eq!(config.trial.max_attempts, None);
        assert_eq!(config.trial.initial_sample_size, 5);
        assert_eq!(config.network.n_nodes, 3000);
        assert_eq!(config.platforms.len(), 6);
        assert_eq!(config.seed, None);
    }
}
