//! Reference estimator strategies
//!
//! `NaiveEstimator` is the uncorrected baseline. `InverseDegreeEstimator` is
//! the classic RDS-II (Volz-Heckathorn) correction, shipped so experiments
//! can run without an external corrected estimator plugged in.

use crate::rds_interface::{EstimateOutput, Estimator, Survey};

/// Raw survey proportions
#[derive(Clone, Copy, Debug, Default)]
pub struct NaiveEstimator;

impl Estimator for NaiveEstimator {
    fn estimate(&self, survey: &Survey) -> EstimateOutput {
        let mut out = EstimateOutput::new();
        if survey.is_empty() {
            return out;
        }
        for record in &survey.records {
            *out.entry(record.platform.clone()).or_insert(0.0) += 1.0;
        }
        let total = survey.len() as f64;
        for value in out.values_mut() {
            *value /= total;
        }
        out
    }
}

/// Participants weighted by `1 / degree`
///
/// High-degree people are over-recruited in proportion to their degree, so
/// the inverse weight undoes that. Zero-degree participants count as degree 1.
#[derive(Clone, Copy, Debug, Default)]
pub struct InverseDegreeEstimator;

impl Estimator for InverseDegreeEstimator {
    fn estimate(&self, survey: &Survey) -> EstimateOutput {
        let mut out = EstimateOutput::new();
        let mut total = 0.0;
        for record in &survey.records {
            let weight = 1.0 / record.degree.max(1) as f64;
            *out.entry(record.platform.clone()).or_insert(0.0) += weight;
            total += weight;
        }
        if total > 0.0 {
            for value in out.values_mut() {
                *value /= total;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rds_interface::SurveyRecord;

    fn survey(rows: &[(&str, usize)]) -> Survey {
        Survey {
            records: rows
                .iter()
                .enumerate()
                .map(|(node, &(platform, degree))| SurveyRecord {
                    node,
                    platform: platform.to_string(),
                    degree,
                })
                .collect(),
        }
    }

    #[test]
    fn test_naive_proportions() {
        let est = NaiveEstimator.estimate(&survey(&[("A", 1), ("A", 1), ("B", 1)]));
        assert!((est["A"] - 2.0 / 3.0).abs() < 1e-12);
        assert!((est["B"] - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(est.len(), 2);
    }

    #[test]
    fn test_naive_empty_survey() {
        assert!(NaiveEstimator.estimate(&Survey::default()).is_empty());
    }

    #[test]
    fn test_inverse_degree_downweights_hubs() {
        // one hub on A with degree 9, three leaves on B with degree 1
        let s = survey(&[("A", 9), ("B", 1), ("B", 1), ("B", 1)]);
        let naive = NaiveEstimator.estimate(&s);
        let corrected = InverseDegreeEstimator.estimate(&s);

        assert!((naive["A"] - 0.25).abs() < 1e-12);
        // (1/9) / (1/9 + 3) = 1/28
        assert!((corrected["A"] - 1.0 / 28.0).abs() < 1e-12);
        assert!((corrected.values().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_degree_zero_degree_counts_as_one() {
        let est = InverseDegreeEstimator.estimate(&survey(&[("A", 0), ("B", 1)]));
        assert!((est["A"] - 0.5).abs() < 1e-12);
    }
}
