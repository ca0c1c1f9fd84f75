//! Degree-biased platform preference assignment
//!
//! Every node gets exactly one platform. A node's affinity for platform `k` is
//! `exp(deg_norm * bias_k / alpha)`, where `deg_norm` is the node's degree
//! relative to the largest degree and `bias_k` is a random attractiveness
//! score skewed by `bias_expo`. High-degree nodes therefore lean towards the
//! attractive platforms, and the lean gets sharper as `alpha` shrinks.
//!
//! Sampling uses the Gumbel-max identity: one standard-Gumbel draw per
//! (node, platform) cell is added to the log-probabilities and each row takes
//! its argmax. The whole noise matrix is drawn before any argmax so that the
//! mapping from uniform draws to preferences is fixed.

use crate::rds_errors::{Result, SimError};
use crate::rds_interface::{Network, NodePreferences, PlatformCatalog};
use rand::distributions::Open01;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreferenceAssigner {
    alpha: f64,
    bias_expo: f64,
}

impl PreferenceAssigner {
    /// `alpha` must be > 0, `bias_expo` must be >= 0
    pub fn new(alpha: f64, bias_expo: f64) -> Result<Self> {
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(SimError::config(format!("alpha must be > 0, got {}", alpha)));
        }
        if !bias_expo.is_finite() || bias_expo < 0.0 {
            return Err(SimError::config(format!(
                "bias exponent must be >= 0, got {}",
                bias_expo
            )));
        }
        Ok(Self { alpha, bias_expo })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn bias_expo(&self) -> f64 {
        self.bias_expo
    }

    /// Draw one preference per node
    ///
    /// Platform `k` of `catalog` receives the `k`-th attractiveness draw, so
    /// callers that want the bias ranking decoupled from platform identity
    /// should shuffle the catalog first.
    pub fn assign<N, R>(
        &self,
        network: &N,
        catalog: &PlatformCatalog,
        rng: &mut R,
    ) -> NodePreferences
    where
        N: Network + ?Sized,
        R: Rng + ?Sized,
    {
        let deg_norm = normalized_degrees(network);
        let bias = self.platform_bias(catalog.len(), rng);
        let log_p = log_probabilities(&deg_norm, &bias, self.alpha);
        let noise = gumbel_noise(deg_norm.len(), bias.len(), rng);
        let choices = gumbel_argmax(&log_p, &noise, bias.len());

        let names = catalog.names();
        NodePreferences::new(choices.into_iter().map(|k| names[k].clone()).collect())
    }

    /// Attractiveness per platform: `u^bias_expo`, scaled so the best is 1
    pub fn platform_bias<R: Rng + ?Sized>(&self, platforms: usize, rng: &mut R) -> Vec<f64> {
        let mut bias: Vec<f64> = (0..platforms)
            .map(|_| rng.gen::<f64>().powf(self.bias_expo))
            .collect();
        let max = bias.iter().cloned().fold(0.0, f64::max);
        if max > 0.0 {
            for b in bias.iter_mut() {
                *b /= max;
            }
        }
        bias
    }
}

/// Degree of every node divided by the maximum degree (all zeros on an edgeless graph)
pub fn normalized_degrees<N: Network + ?Sized>(network: &N) -> Vec<f64> {
    let degrees: Vec<usize> = (0..network.node_count()).map(|v| network.degree(v)).collect();
    let max = degrees.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return vec![0.0; degrees.len()];
    }
    degrees.iter().map(|&d| d as f64 / max as f64).collect()
}

/// Row-normalized log affinity, flattened row-major (node × platform)
///
/// Each row is shifted by its largest `d * b` before dividing by `alpha`, so
/// the best platform sits at 0 and the rest go at worst to `-inf`. A tiny
/// `alpha` then degrades to a hard argmax instead of `inf - inf`.
pub fn log_probabilities(deg_norm: &[f64], bias: &[f64], alpha: f64) -> Vec<f64> {
    let k = bias.len();
    let mut log_p = Vec::with_capacity(deg_norm.len() * k);
    for &d in deg_norm {
        let row_start = log_p.len();
        let top = bias.iter().map(|&b| d * b).fold(f64::NEG_INFINITY, f64::max);
        log_p.extend(bias.iter().map(|&b| (d * b - top) / alpha));
        let row = &mut log_p[row_start..];
        let log_sum = row.iter().map(|&x| x.exp()).sum::<f64>().ln();
        for x in row.iter_mut() {
            *x -= log_sum;
        }
    }
    log_p
}

/// Standard Gumbel noise, `-ln(-ln U)` with `U` uniform on (0, 1)
pub fn gumbel_noise<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Vec<f64> {
    (0..rows * cols)
        .map(|_| {
            let u: f64 = rng.sample(Open01);
            -(-u.ln()).ln()
        })
        .collect()
}

/// Per-row argmax of `log_p + noise`; the first index wins ties
pub fn gumbel_argmax(log_p: &[f64], noise: &[f64], cols: usize) -> Vec<usize> {
    log_p
        .chunks(cols)
        .zip(noise.chunks(cols))
        .map(|(lp, g)| {
            let mut best = 0;
            let mut best_score = f64::NEG_INFINITY;
            for (k, (p, n)) in lp.iter().zip(g).enumerate() {
                let score = p + n;
                if score > best_score {
                    best = k;
                    best_score = score;
                }
            }
            best
        })
        .collect()
}
