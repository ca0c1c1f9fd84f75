// Shared types and capability traits for the RDS simulator

use crate::rds_errors::{Result, SimError};
use crate::rds_graph::weak_components;
use indexmap::IndexMap;

pub type NodeId = usize;
pub type ComponentId = usize;

/// Weight used for edges of unweighted networks
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// Estimated proportion per platform, in the order the estimator produced them
pub type EstimateOutput = IndexMap<String, f64>;

// ============================================================================
// Network capability
// ============================================================================

/// Read-only view of an undirected network
///
/// The simulator never mutates a network; the same instance is reused across
/// every trial of an experiment.
pub trait Network {
    fn node_count(&self) -> usize;

    fn neighbors(&self, node: NodeId) -> &[NodeId];

    fn degree(&self, node: NodeId) -> usize {
        self.neighbors(node).len()
    }

    /// Weight of edge (u, v), `DEFAULT_EDGE_WEIGHT` when the network carries none
    fn edge_weight(&self, u: NodeId, v: NodeId) -> f64;

    /// Whether edges carry their own weights
    fn is_weighted(&self) -> bool;

    /// Weak component id per node, considering only `edges`
    ///
    /// Ids are dense and numbered in order of the lowest node of each component.
    fn weak_components(&self, edges: &[(NodeId, NodeId)]) -> Vec<ComponentId> {
        weak_components(self.node_count(), edges)
    }
}

// ============================================================================
// Platforms and preferences
// ============================================================================

/// Ordered set of platform names
#[derive(Clone, Debug, PartialEq)]
pub struct PlatformCatalog {
    names: Vec<String>,
}

impl PlatformCatalog {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(SimError::config("platform catalog is empty"));
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(SimError::config(format!(
                    "platform `{}` listed twice in catalog",
                    name
                )));
            }
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Same platforms, different order (used for per-trial shuffling)
    pub(crate) fn reordered(names: Vec<String>) -> Self {
        Self { names }
    }
}

/// Ground-truth platform preference of every node in a network
#[derive(Clone, Debug, PartialEq)]
pub struct NodePreferences {
    platforms: Vec<String>,
}

impl NodePreferences {
    pub fn new(platforms: Vec<String>) -> Self {
        Self { platforms }
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    pub fn get(&self, node: NodeId) -> Option<&str> {
        self.platforms.get(node).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.platforms.iter().map(String::as_str)
    }
}

// ============================================================================
// Survey
// ============================================================================

/// One survey participant
#[derive(Clone, Debug, PartialEq)]
pub struct SurveyRecord {
    pub node: NodeId,
    pub platform: String,
    /// Degree in the original, non-percolated network
    pub degree: usize,
}

/// Survey sample, ordered by node id
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Survey {
    pub records: Vec<SurveyRecord>,
}

impl Survey {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn participants(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.records.iter().map(|r| r.node)
    }
}

// ============================================================================
// Estimator strategy
// ============================================================================

/// Estimates the population platform distribution from a survey
///
/// Outputs need not list every platform; the scorer fills absent ones with 0.
/// Normalization is the estimator's own business.
pub trait Estimator {
    fn estimate(&self, survey: &Survey) -> EstimateOutput;
}

impl<F> Estimator for F
where
    F: Fn(&Survey) -> EstimateOutput,
{
    fn estimate(&self, survey: &Survey) -> EstimateOutput {
        self(survey)
    }
}
