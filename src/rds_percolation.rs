//! Chain-referral percolation
//!
//! Grows a spanning forest out of the seed set the way Prim's algorithm grows
//! a minimum spanning tree, except that every edge offered to an unvisited
//! node survives only with the retention probability. Popped edges that fail
//! the coin flip are dropped for good; their target may still be reached
//! later through another edge.

use crate::rds_errors::{Result, SimError};
use crate::rds_interface::{ComponentId, Network, NodeId};
use log::debug;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Edge kept by the percolation process
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetainedEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
}

/// Retained forest over the full vertex set of the source network
#[derive(Clone, Debug, PartialEq)]
pub struct PercolationResult {
    node_count: usize,
    edges: Vec<RetainedEdge>,
    weighted: bool,
    membership: Vec<ComponentId>,
}

impl PercolationResult {
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Retained edges in the order they were accepted
    pub fn edges(&self) -> &[RetainedEdge] {
        &self.edges
    }

    /// Whether edge weights were copied from a weighted source network
    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    /// Weak component id per node over the retained edges
    pub fn membership(&self) -> &[ComponentId] {
        &self.membership
    }

    pub fn component_of(&self, node: NodeId) -> ComponentId {
        self.membership[node]
    }

    /// Number of distinct weak components (singletons included)
    pub fn component_count(&self) -> usize {
        self.membership.iter().max().map_or(0, |&c| c + 1)
    }
}

/// Heap entry; `BinaryHeap` is a max-heap so the ordering is reversed
#[derive(Debug)]
struct Candidate {
    weight: f64,
    seq: u64,
    source: NodeId,
    target: NodeId,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .total_cmp(&self.weight)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Frontier {
    heap: BinaryHeap<Candidate>,
    next_seq: u64,
}

impl Frontier {
    fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    fn push(&mut self, weight: f64, source: NodeId, target: NodeId) {
        self.heap.push(Candidate {
            weight,
            seq: self.next_seq,
            source,
            target,
        });
        self.next_seq += 1;
    }

    fn pop(&mut self) -> Option<Candidate> {
        self.heap.pop()
    }
}

/// Percolate `network` from `seeds`, keeping each offered edge with probability `retention`
///
/// Exactly one uniform draw is consumed per popped edge whose target is still
/// unvisited; the edge is kept when the draw is below `retention`.
pub fn percolate<N, R>(
    network: &N,
    seeds: &[NodeId],
    retention: f64,
    rng: &mut R,
) -> Result<PercolationResult>
where
    N: Network + ?Sized,
    R: Rng + ?Sized,
{
    let n = network.node_count();
    if !(0.0..=1.0).contains(&retention) {
        return Err(SimError::config(format!(
            "retention probability must be in [0, 1], got {}",
            retention
        )));
    }
    if seeds.is_empty() {
        return Err(SimError::config("percolation needs at least one seed"));
    }
    if let Some(&bad) = seeds.iter().find(|&&s| s >= n) {
        return Err(SimError::config(format!(
            "seed {} outside network of {} nodes",
            bad, n
        )));
    }

    let mut visited = vec![false; n];
    let mut visited_count = 0;
    for &s in seeds {
        if !visited[s] {
            visited[s] = true;
            visited_count += 1;
        }
    }

    let mut frontier = Frontier::new();
    for &s in seeds {
        for &neighbor in network.neighbors(s) {
            frontier.push(network.edge_weight(s, neighbor), s, neighbor);
        }
    }

    let mut edges = Vec::new();
    let mut offered = 0usize;
    while visited_count < n {
        let Some(candidate) = frontier.pop() else {
            break;
        };
        if visited[candidate.target] {
            continue;
        }
        offered += 1;
        if rng.gen::<f64>() >= retention {
            continue;
        }

        let v = candidate.target;
        edges.push(RetainedEdge {
            source: candidate.source,
            target: v,
            weight: candidate.weight,
        });
        visited[v] = true;
        visited_count += 1;

        for &neighbor in network.neighbors(v) {
            if !visited[neighbor] {
                frontier.push(network.edge_weight(v, neighbor), v, neighbor);
            }
        }
    }

    let pairs: Vec<(NodeId, NodeId)> = edges.iter().map(|e| (e.source, e.target)).collect();
    let membership = network.weak_components(&pairs);

    debug!(
        "percolation from {} seeds: offered {}, retained {}, reached {}/{}",
        seeds.len(),
        offered,
        edges.len(),
        visited_count,
        n
    );

    Ok(PercolationResult {
        node_count: n,
        edges,
        weighted: network.is_weighted(),
        membership,
    })
}
