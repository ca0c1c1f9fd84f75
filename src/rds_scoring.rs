//! Estimator scoring against ground truth
//!
//! For each trial the true platform shares, the naive estimate and the
//! corrected estimate are laid out over the full catalog (missing platforms
//! as 0) and compared by unweighted mean squared error.

use crate::rds_errors::{Result, SimError};
use crate::rds_interface::{EstimateOutput, Estimator, NodePreferences, PlatformCatalog, Survey};
use crate::rds_trial::TrialRecord;
use hashbrown::HashMap;
use serde::Serialize;

pub const NAIVE_LABEL: &str = "naive";
pub const CORRECTED_LABEL: &str = "corrected";

// ============================================================================
// Tables
// ============================================================================

/// One platform row of a trial's comparison table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub platform: String,
    pub true_proportion: f64,
    pub naive_proportion: f64,
    pub estimated_proportion: f64,
}

/// True vs naive vs corrected shares for one trial, in catalog order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    pub trial: usize,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn row(&self, platform: &str) -> Option<&ResultRow> {
        self.rows.iter().find(|r| r.platform == platform)
    }

    pub fn print(&self) {
        println!("Trial {}", self.trial);
        println!(
            "  {:<14} {:>10} {:>10} {:>10}",
            "Platform", "True", "Naive", "Corrected"
        );
        for row in &self.rows {
            println!(
                "  {:<14} {:>10.4} {:>10.4} {:>10.4}",
                row.platform, row.true_proportion, row.naive_proportion, row.estimated_proportion
            );
        }
    }
}

/// Mean squared error of one estimator on one trial
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRow {
    pub trial: usize,
    pub estimator: String,
    pub mse: f64,
}

/// Aggregate of one estimator's errors over all trials
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MseSummary {
    pub trials: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Long-form error table: two rows per trial
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorTable {
    pub rows: Vec<ErrorRow>,
}

impl ErrorTable {
    pub fn for_estimator<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a ErrorRow> + 'a {
        self.rows.iter().filter(move |r| r.estimator == label)
    }

    pub fn summary(&self, label: &str) -> Option<MseSummary> {
        let values: Vec<f64> = self.for_estimator(label).map(|r| r.mse).collect();
        if values.is_empty() {
            return None;
        }
        Some(MseSummary {
            trials: values.len(),
            mean: values.iter().sum::<f64>() / values.len() as f64,
            min: values.iter().cloned().fold(f64::INFINITY, f64::min),
            max: values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        })
    }

    /// Trials where the corrected estimator's error is strictly below the naive one
    pub fn corrected_wins(&self) -> usize {
        let naive: HashMap<usize, f64> = self
            .for_estimator(NAIVE_LABEL)
            .map(|r| (r.trial, r.mse))
            .collect();
        self.for_estimator(CORRECTED_LABEL)
            .filter(|r| naive.get(&r.trial).map_or(false, |&n| r.mse < n))
            .count()
    }
}

// ============================================================================
// Scoring
// ============================================================================

/// Share of each catalog platform among all nodes
pub fn true_distribution(preferences: &NodePreferences, catalog: &PlatformCatalog) -> Vec<f64> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for platform in preferences.iter() {
        *counts.entry(platform).or_insert(0) += 1;
    }
    let total = preferences.len();
    catalog
        .iter()
        .map(|name| {
            if total == 0 {
                0.0
            } else {
                counts.get(name).copied().unwrap_or(0) as f64 / total as f64
            }
        })
        .collect()
}

/// Lay an estimate out over the catalog, absent platforms as 0
///
/// Unknown platforms and negative or non-finite values break the estimator
/// contract and are reported rather than dropped.
pub fn reindex(
    output: &EstimateOutput,
    catalog: &PlatformCatalog,
    estimator: &str,
) -> Result<Vec<f64>> {
    for (platform, &value) in output {
        if !catalog.contains(platform) {
            return Err(SimError::UnknownPlatform {
                estimator: estimator.to_string(),
                platform: platform.clone(),
            });
        }
        if !value.is_finite() || value < 0.0 {
            return Err(SimError::InvalidProportion {
                estimator: estimator.to_string(),
                platform: platform.clone(),
                value,
            });
        }
    }
    Ok(catalog
        .iter()
        .map(|name| output.get(name).copied().unwrap_or(0.0))
        .collect())
}

/// Unweighted mean of squared differences
pub fn mean_squared_error(estimate: &[f64], truth: &[f64]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    estimate
        .iter()
        .zip(truth)
        .map(|(e, t)| (e - t).powi(2))
        .sum::<f64>()
        / truth.len() as f64
}

/// Runs a naive and a corrected estimator over trials and scores both
pub struct EstimationScorer<'a> {
    naive: &'a dyn Estimator,
    corrected: &'a dyn Estimator,
    catalog: &'a PlatformCatalog,
}

impl<'a> EstimationScorer<'a> {
    pub fn new(
        naive: &'a dyn Estimator,
        corrected: &'a dyn Estimator,
        catalog: &'a PlatformCatalog,
    ) -> Self {
        Self {
            naive,
            corrected,
            catalog,
        }
    }

    pub fn score(&self, trials: &[TrialRecord]) -> Result<(Vec<ResultTable>, ErrorTable)> {
        let mut tables = Vec::with_capacity(trials.len());
        let mut errors = ErrorTable::default();
        for (trial, record) in trials.iter().enumerate() {
            let (table, rows) = self.score_trial(trial, &record.preferences, &record.survey)?;
            tables.push(table);
            errors.rows.extend(rows);
        }
        Ok((tables, errors))
    }

    pub fn score_trial(
        &self,
        trial: usize,
        preferences: &NodePreferences,
        survey: &Survey,
    ) -> Result<(ResultTable, [ErrorRow; 2])> {
        let truth = true_distribution(preferences, self.catalog);
        let naive = reindex(&self.naive.estimate(survey), self.catalog, NAIVE_LABEL)?;
        let corrected = reindex(&self.corrected.estimate(survey), self.catalog, CORRECTED_LABEL)?;

        let rows = self
            .catalog
            .iter()
            .enumerate()
            .map(|(k, name)| ResultRow {
                platform: name.to_string(),
                true_proportion: truth[k],
                naive_proportion: naive[k],
                estimated_proportion: corrected[k],
            })
            .collect();

        let errors = [
            ErrorRow {
                trial,
                estimator: NAIVE_LABEL.to_string(),
                mse: mean_squared_error(&naive, &truth),
            },
            ErrorRow {
                trial,
                estimator: CORRECTED_LABEL.to_string(),
                mse: mean_squared_error(&corrected, &truth),
            },
        ];

        Ok((ResultTable { trial, rows }, errors))
    }
}
