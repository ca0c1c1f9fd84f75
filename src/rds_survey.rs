// Survey sample derived from percolation connectivity

use crate::rds_errors::{Result, SimError};
use crate::rds_interface::{Network, NodeId, NodePreferences, Survey, SurveyRecord};
use crate::rds_percolation::PercolationResult;
use hashbrown::HashSet;

/// Every node sharing a retained-edge component with a seed takes part
///
/// Degrees come from `network`, the original graph, not from the percolated
/// forest: recruitment bias follows a person's real connectivity.
pub fn build_survey<N>(
    network: &N,
    preferences: &NodePreferences,
    percolation: &PercolationResult,
    seeds: &[NodeId],
) -> Result<Survey>
where
    N: Network + ?Sized,
{
    let n = network.node_count();
    if percolation.node_count() != n {
        return Err(SimError::config(format!(
            "percolation covers {} nodes, network has {}",
            percolation.node_count(),
            n
        )));
    }
    if preferences.len() != n {
        return Err(SimError::config(format!(
            "{} preferences for a network of {} nodes",
            preferences.len(),
            n
        )));
    }
    if let Some(&bad) = seeds.iter().find(|&&s| s >= n) {
        return Err(SimError::config(format!(
            "seed {} outside network of {} nodes",
            bad, n
        )));
    }

    let membership = percolation.membership();
    let reached: HashSet<usize> = seeds.iter().map(|&s| membership[s]).collect();

    let records = membership
        .iter()
        .enumerate()
        .filter(|(_, component)| reached.contains(*component))
        .filter_map(|(node, _)| {
            preferences.get(node).map(|platform| SurveyRecord {
                node,
                platform: platform.to_string(),
                degree: network.degree(node),
            })
        })
        .collect();

    Ok(Survey { records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rds_graph::SocialGraph;
    use crate::rds_percolation::percolate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn prefs(names: &[&str]) -> NodePreferences {
        NodePreferences::new(names.iter().map(|s| s.to_string()).collect())
    }

    fn path(n: usize) -> SocialGraph {
        let edges: Vec<(NodeId, NodeId)> = (1..n).map(|v| (v - 1, v)).collect();
        SocialGraph::from_edges(n, &edges).unwrap()
    }

    #[test]
    fn test_path_full_retention_reaches_everyone() {
        let g = path(5);
        let p = prefs(&["A", "B", "A", "B", "A"]);
        let perc = percolate(&g, &[0], 1.0, &mut StdRng::from_seed([0u8; 32])).unwrap();

        let survey = build_survey(&g, &p, &perc, &[0]).unwrap();
        let nodes: Vec<NodeId> = survey.participants().collect();
        assert_eq!(nodes, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_zero_retention_returns_seeds_only() {
        let g = path(6);
        let p = prefs(&["A", "B", "C", "A", "B", "C"]);
        let perc = percolate(&g, &[2], 0.0, &mut StdRng::from_seed([0u8; 32])).unwrap();

        let survey = build_survey(&g, &p, &perc, &[2]).unwrap();
        assert_eq!(survey.len(), 1);
        assert_eq!(
            survey.records[0],
            SurveyRecord {
                node: 2,
                platform: "C".to_string(),
                degree: 2,
            }
        );
    }

    #[test]
    fn test_degree_comes_from_original_graph() {
        // star around 0, only the seed is sampled
        let g = SocialGraph::from_edges(4, &[(0, 1), (0, 2), (0, 3)]).unwrap();
        let p = prefs(&["A", "A", "B", "B"]);
        let perc = percolate(&g, &[0, 3], 0.0, &mut StdRng::from_seed([0u8; 32])).unwrap();

        let survey = build_survey(&g, &p, &perc, &[3, 0]).unwrap();
        let degrees: Vec<(NodeId, usize)> =
            survey.records.iter().map(|r| (r.node, r.degree)).collect();
        assert_eq!(degrees, vec![(0, 3), (3, 1)]);
    }

    #[test]
    fn test_participants_are_union_of_seed_components() {
        let mut rng = StdRng::from_seed([13u8; 32]);
        let g = SocialGraph::barabasi_albert(600, 2, &mut rng).unwrap();
        let p = NodePreferences::new(vec!["A".to_string(); 600]);
        let seeds = [10, 200, 450];
        let perc = percolate(&g, &seeds, 0.4, &mut rng).unwrap();

        let survey = build_survey(&g, &p, &perc, &seeds).unwrap();
        let seed_components: Vec<usize> = seeds.iter().map(|&s| perc.component_of(s)).collect();

        for s in seeds {
            assert!(survey.participants().any(|v| v == s));
        }
        for v in 0..600 {
            let inside = survey.participants().any(|x| x == v);
            assert_eq!(inside, seed_components.contains(&perc.component_of(v)));
        }
    }

    #[test]
    fn test_rejects_seed_outside_network() {
        let g = path(3);
        let p = prefs(&["A", "B", "A"]);
        let perc = percolate(&g, &[0], 1.0, &mut StdRng::from_seed([0u8; 32])).unwrap();

        assert!(build_survey(&g, &p, &perc, &[3]).is_err());
        assert!(build_survey(&g, &p, &perc, &[0, 7]).is_err());
    }

    #[test]
    fn test_rejects_mismatched_preferences() {
        let g = path(4);
        let perc = percolate(&g, &[0], 1.0, &mut StdRng::from_seed([0u8; 32])).unwrap();

        // a short list would otherwise drop nodes 2 and 3 from the survey
        let short = prefs(&["A", "B"]);
        assert!(build_survey(&g, &short, &perc, &[0]).is_err());

        let long = prefs(&["A", "B", "A", "B", "A"]);
        assert!(build_survey(&g, &long, &perc, &[0]).is_err());
    }

    #[test]
    fn test_rejects_percolation_of_another_network() {
        let small = path(3);
        let large = path(5);
        let perc = percolate(&small, &[0], 1.0, &mut StdRng::from_seed([0u8; 32])).unwrap();
        let p = prefs(&["A", "B", "A", "B", "A"]);

        assert!(build_survey(&large, &p, &perc, &[0]).is_err());
    }
}
