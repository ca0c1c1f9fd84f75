//! One simulated RDS survey
//!
//! A trial assigns fresh preferences, picks seeds, percolates and collects
//! the survey. Trials whose survey falls short of the minimum size are thrown
//! away whole and redrawn, up to `max_attempts` times.

use crate::rds_errors::{Result, SimError};
use crate::rds_interface::{Network, NodeId, NodePreferences, PlatformCatalog, Survey};
use crate::rds_percolation::{percolate, PercolationResult};
use crate::rds_preferences::PreferenceAssigner;
use crate::rds_survey::build_survey;
use log::debug;
use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Per-trial simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    /// Number of seed participants drawn uniformly without replacement
    pub initial_sample_size: usize,

    /// Probability that a recruited friend participates (edge retention)
    pub participation_prob: f64,

    /// Strength of the hubs' lean towards attractive platforms (lower = stronger)
    pub alpha: f64,

    /// Skew of platform attractiveness (higher = fewer dominant platforms)
    pub bias_expo: f64,

    /// Smallest acceptable survey
    pub min_survey_size: usize,

    /// Retry cap; None retries until a survey is accepted
    pub max_attempts: Option<usize>,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            initial_sample_size: 5,
            participation_prob: 0.15,
            alpha: 1e-2,
            bias_expo: 2.0,
            min_survey_size: 201,
            max_attempts: Some(1000),
        }
    }
}

impl TrialConfig {
    /// Range checks that do not depend on the network
    pub fn validate(&self) -> Result<()> {
        if self.initial_sample_size == 0 {
            return Err(SimError::config("initial sample size must be >= 1"));
        }
        if !(0.0..=1.0).contains(&self.participation_prob) {
            return Err(SimError::config(format!(
                "participation probability must be in [0, 1], got {}",
                self.participation_prob
            )));
        }
        if self.max_attempts == Some(0) {
            return Err(SimError::config("max attempts must be >= 1"));
        }
        PreferenceAssigner::new(self.alpha, self.bias_expo).map(|_| ())
    }

    /// Checks against a concrete network size
    pub fn validate_for(&self, node_count: usize) -> Result<()> {
        self.validate()?;
        if self.initial_sample_size > node_count {
            return Err(SimError::config(format!(
                "initial sample size {} exceeds network of {} nodes",
                self.initial_sample_size, node_count
            )));
        }
        if self.min_survey_size > node_count {
            return Err(SimError::config(format!(
                "minimum survey size {} can never be met by a network of {} nodes",
                self.min_survey_size, node_count
            )));
        }
        Ok(())
    }
}

/// Everything one accepted trial produced
#[derive(Debug, Clone)]
pub struct TrialRecord {
    pub preferences: NodePreferences,
    pub survey: Survey,
    pub seeds: Vec<NodeId>,
    pub percolation: PercolationResult,
    /// Catalog order used for the attractiveness draw of this trial
    pub platform_order: PlatformCatalog,
    /// Attempts it took to get an accepted survey (1 = first try)
    pub attempts: usize,
}

pub struct TrialRunner {
    config: TrialConfig,
    assigner: PreferenceAssigner,
}

impl TrialRunner {
    pub fn new(config: TrialConfig) -> Result<Self> {
        config.validate()?;
        let assigner = PreferenceAssigner::new(config.alpha, config.bias_expo)?;
        Ok(Self { config, assigner })
    }

    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    /// Run attempts until one meets the minimum survey size
    pub fn run<N, R>(
        &self,
        network: &N,
        catalog: &PlatformCatalog,
        rng: &mut R,
    ) -> Result<TrialRecord>
    where
        N: Network + ?Sized,
        R: Rng + ?Sized,
    {
        self.config.validate_for(network.node_count())?;

        let mut attempts = 0;
        loop {
            if let Some(cap) = self.config.max_attempts {
                if attempts >= cap {
                    return Err(SimError::TrialRejected {
                        attempts,
                        min_survey_size: self.config.min_survey_size,
                    });
                }
            }
            attempts += 1;

            let mut record = self.attempt(network, catalog, rng)?;
            if record.survey.len() >= self.config.min_survey_size {
                record.attempts = attempts;
                return Ok(record);
            }
            debug!(
                "attempt {} rejected: survey of {} < {}",
                attempts,
                record.survey.len(),
                self.config.min_survey_size
            );
        }
    }

    /// A single attempt with no size check
    pub fn attempt<N, R>(
        &self,
        network: &N,
        catalog: &PlatformCatalog,
        rng: &mut R,
    ) -> Result<TrialRecord>
    where
        N: Network + ?Sized,
        R: Rng + ?Sized,
    {
        let n = network.node_count();
        if self.config.initial_sample_size > n {
            return Err(SimError::config(format!(
                "initial sample size {} exceeds network of {} nodes",
                self.config.initial_sample_size, n
            )));
        }

        let mut order = catalog.names().to_vec();
        order.shuffle(rng);
        let platform_order = PlatformCatalog::reordered(order);

        let preferences = self.assigner.assign(network, &platform_order, rng);
        let seeds = index::sample(rng, n, self.config.initial_sample_size).into_vec();
        let percolation = percolate(network, &seeds, self.config.participation_prob, rng)?;
        let survey = build_survey(network, &preferences, &percolation, &seeds)?;

        Ok(TrialRecord {
            preferences,
            survey,
            seeds,
            percolation,
            platform_order,
            attempts: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rds_graph::SocialGraph;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog() -> PlatformCatalog {
        PlatformCatalog::new(["A", "B", "C"]).unwrap()
    }

    fn network() -> SocialGraph {
        SocialGraph::barabasi_albert(400, 2, &mut StdRng::from_seed([6u8; 32])).unwrap()
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(TrialConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let bad = [
            TrialConfig {
                initial_sample_size: 0,
                ..Default::default()
            },
            TrialConfig {
                participation_prob: 1.2,
                ..Default::default()
            },
            TrialConfig {
                alpha: 0.0,
                ..Default::default()
            },
            TrialConfig {
                bias_expo: -2.0,
                ..Default::default()
            },
            TrialConfig {
                max_attempts: Some(0),
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(TrialRunner::new(config).is_err());
        }

        let too_many_seeds = TrialConfig {
            initial_sample_size: 11,
            ..Default::default()
        };
        assert!(too_many_seeds.validate_for(10).is_err());
    }

    #[test]
    fn test_accepted_trial_meets_threshold() {
        let config = TrialConfig {
            initial_sample_size: 5,
            participation_prob: 0.6,
            min_survey_size: 50,
            ..Default::default()
        };
        let runner = TrialRunner::new(config).unwrap();
        let g = network();
        let record = runner
            .run(&g, &catalog(), &mut StdRng::from_seed([1u8; 32]))
            .unwrap();

        assert!(record.survey.len() >= 50);
        assert!(record.attempts >= 1);
        assert_eq!(record.seeds.len(), 5);
        assert_eq!(record.preferences.len(), 400);
        for s in &record.seeds {
            assert!(record.survey.participants().any(|v| v == *s));
        }
        let mut order: Vec<String> = record.platform_order.names().to_vec();
        order.sort();
        assert_eq!(order, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_seeds_are_distinct() {
        let config = TrialConfig {
            initial_sample_size: 40,
            participation_prob: 0.0,
            min_survey_size: 1,
            ..Default::default()
        };
        let runner = TrialRunner::new(config).unwrap();
        let record = runner
            .attempt(&network(), &catalog(), &mut StdRng::from_seed([2u8; 32]))
            .unwrap();

        let mut seeds = record.seeds.clone();
        seeds.sort_unstable();
        seeds.dedup();
        assert_eq!(seeds.len(), 40);
        // nothing percolates, the survey is the seed set
        assert_eq!(record.survey.len(), 40);
    }

    #[test]
    fn test_retry_cap_surfaces_rejection() {
        // no edge survives, so 3 seeds can never make a survey of 10
        let config = TrialConfig {
            initial_sample_size: 3,
            participation_prob: 0.0,
            min_survey_size: 10,
            max_attempts: Some(4),
            ..Default::default()
        };
        let runner = TrialRunner::new(config).unwrap();
        let err = runner
            .run(&network(), &catalog(), &mut StdRng::from_seed([3u8; 32]))
            .unwrap_err();
        assert_eq!(
            err,
            SimError::TrialRejected {
                attempts: 4,
                min_survey_size: 10,
            }
        );
    }

    #[test]
    fn test_deterministic_under_fixed_seed() {
        let runner = TrialRunner::new(TrialConfig {
            participation_prob: 0.5,
            min_survey_size: 20,
            ..Default::default()
        })
        .unwrap();
        let g = network();

        let a = runner.run(&g, &catalog(), &mut StdRng::from_seed([4u8; 32])).unwrap();
        let b = runner.run(&g, &catalog(), &mut StdRng::from_seed([4u8; 32])).unwrap();
        assert_eq!(a.preferences, b.preferences);
        assert_eq!(a.percolation, b.percolation);
        assert_eq!(a.seeds, b.seeds);
        assert_eq!(a.attempts, b.attempts);
    }
}
