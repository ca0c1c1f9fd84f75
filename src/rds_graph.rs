//! Adjacency-list social network
//!
//! `SocialGraph` is the network the experiment driver generates when the
//! caller does not bring its own. It implements `Network` and supports
//! optional per-edge weights.

use crate::rds_errors::{Result, SimError};
use crate::rds_interface::{ComponentId, Network, NodeId, DEFAULT_EDGE_WEIGHT};
use hashbrown::{HashMap, HashSet};
use log::debug;
use rand::Rng;

/// Undirected simple graph (no self loops, no parallel edges)
#[derive(Clone, Debug)]
pub struct SocialGraph {
    adjacency: Vec<Vec<NodeId>>,
    edge_count: usize,
    // keyed by (min, max)
    weights: Option<HashMap<(NodeId, NodeId), f64>>,
}

fn edge_key(u: NodeId, v: NodeId) -> (NodeId, NodeId) {
    if u <= v {
        (u, v)
    } else {
        (v, u)
    }
}

impl SocialGraph {
    /// Graph with `n` isolated nodes
    pub fn with_nodes(n: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); n],
            edge_count: 0,
            weights: None,
        }
    }

    /// Build an unweighted graph; repeated edges are collapsed
    pub fn from_edges(n: usize, edges: &[(NodeId, NodeId)]) -> Result<Self> {
        let mut graph = Self::with_nodes(n);
        for &(u, v) in edges {
            graph.add_edge(u, v)?;
        }
        Ok(graph)
    }

    /// Build a weighted graph; weights must be finite and non-negative
    pub fn from_weighted_edges(n: usize, edges: &[(NodeId, NodeId, f64)]) -> Result<Self> {
        let mut graph = Self::with_nodes(n);
        let mut weights = HashMap::with_capacity(edges.len());
        for &(u, v, w) in edges {
            if !w.is_finite() || w < 0.0 {
                return Err(SimError::config(format!(
                    "edge ({}, {}) has invalid weight {}",
                    u, v, w
                )));
            }
            if graph.add_edge(u, v)? {
                weights.insert(edge_key(u, v), w);
            }
        }
        graph.weights = Some(weights);
        Ok(graph)
    }

    /// Add an undirected edge, returns false if it already existed
    pub fn add_edge(&mut self, u: NodeId, v: NodeId) -> Result<bool> {
        let n = self.adjacency.len();
        if u >= n || v >= n {
            return Err(SimError::config(format!(
                "edge ({}, {}) references a node outside 0..{}",
                u, v, n
            )));
        }
        if u == v {
            return Err(SimError::config(format!("self loop on node {}", u)));
        }
        if self.adjacency[u].contains(&v) {
            return Ok(false);
        }
        self.adjacency[u].push(v);
        self.adjacency[v].push(u);
        self.edge_count += 1;
        Ok(true)
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.adjacency
            .get(u)
            .map_or(false, |neighbors| neighbors.contains(&v))
    }

    pub fn max_degree(&self) -> usize {
        self.adjacency.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Barabási–Albert preferential attachment
    ///
    /// Starts from a single node. Node `i` then attaches to `min(m, i)`
    /// distinct earlier nodes, each picked with probability proportional to
    /// `degree + 1`.
    pub fn barabasi_albert<R: Rng>(n: usize, m: usize, rng: &mut R) -> Result<Self> {
        if n == 0 {
            return Err(SimError::config("network must contain at least one node"));
        }
        if m == 0 {
            return Err(SimError::config("attachment parameter m must be >= 1"));
        }

        let mut graph = Self::with_nodes(n);
        // one entry per unit of attachment weight: each node once, plus once per edge end
        let mut proposal: Vec<NodeId> = Vec::with_capacity(n + 2 * n * m);
        proposal.push(0);

        let mut targets: HashSet<NodeId> = HashSet::with_capacity(m);
        for node in 1..n {
            let wanted = m.min(node);
            targets.clear();
            while targets.len() < wanted {
                targets.insert(proposal[rng.gen_range(0..proposal.len())]);
            }
            let mut chosen: Vec<NodeId> = targets.iter().copied().collect();
            chosen.sort_unstable();
            for target in chosen {
                graph.add_edge(node, target)?;
                proposal.push(target);
                proposal.push(node);
            }
            proposal.push(node);
        }

        debug!(
            "generated preferential attachment graph: {} nodes, {} edges, max degree {}",
            n,
            graph.edge_count,
            graph.max_degree()
        );
        Ok(graph)
    }
}

impl Network for SocialGraph {
    fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    fn neighbors(&self, node: NodeId) -> &[NodeId] {
        &self.adjacency[node]
    }

    fn edge_weight(&self, u: NodeId, v: NodeId) -> f64 {
        self.weights
            .as_ref()
            .and_then(|w| w.get(&edge_key(u, v)).copied())
            .unwrap_or(DEFAULT_EDGE_WEIGHT)
    }

    fn is_weighted(&self) -> bool {
        self.weights.is_some()
    }
}

// ============================================================================
// Weak components
// ============================================================================

fn find_root(parent: &mut [usize], mut node: usize) -> usize {
    while parent[node] != node {
        parent[node] = parent[parent[node]];
        node = parent[node];
    }
    node
}

/// Weak component membership of `n` nodes connected only by `edges`
///
/// Component ids are dense, numbered by first appearance in node order, so
/// node 0 is always in component 0.
pub fn weak_components(n: usize, edges: &[(NodeId, NodeId)]) -> Vec<ComponentId> {
    let mut parent: Vec<usize> = (0..n).collect();
    let mut rank = vec![0u8; n];

    for &(u, v) in edges {
        let ru = find_root(&mut parent, u);
        let rv = find_root(&mut parent, v);
        if ru == rv {
            continue;
        }
        if rank[ru] < rank[rv] {
            parent[ru] = rv;
        } else if rank[ru] > rank[rv] {
            parent[rv] = ru;
        } else {
            parent[rv] = ru;
            rank[ru] += 1;
        }
    }

    let mut labels: HashMap<usize, ComponentId> = HashMap::new();
    let mut membership = Vec::with_capacity(n);
    for node in 0..n {
        let root = find_root(&mut parent, node);
        let next = labels.len();
        membership.push(*labels.entry(root).or_insert(next));
    }
    membership
}
