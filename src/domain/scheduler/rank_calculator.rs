use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::graph::graph::{Graph, NodeKey};
use crate::error::CyclicWorkflowError;

/// Upward and downward rank of every node.
#[derive(Debug, Clone)]
pub struct Ranks<K: NodeKey> {
    pub upward: HashMap<K, f64>,
    pub downward: HashMap<K, f64>,
}

impl<K: NodeKey> Ranks<K> {
    /**
     * Computes both ranks of all nodes of an acyclic graph.
     *
     * upward(n)   = cost(n) + max over children c of (comm(n, c) + upward(c)), cost(n) for sinks
     * downward(n) = max over parents p of (downward(p) + cost(p) + comm(p, n)), 0 for sources
     *
     * @param compute_cost The average compute cost of a node
     * @param communication_cost The average communication cost of an edge (parent, child)
     */
    pub fn compute<N, E>(
        graph: &Graph<K, N, E>,
        compute_cost: impl Fn(&K) -> f64,
        communication_cost: impl Fn(&K, &K) -> f64,
    ) -> Result<Self, CyclicWorkflowError> {
        let order = graph.topological_order()?;

        let mut upward: HashMap<K, f64> = HashMap::with_capacity(order.len());
        for node in order.iter().rev() {
            let successor_term = graph
                .children(node)
                .iter()
                .map(|child| communication_cost(node, child) + upward.get(child).copied().unwrap_or(0.0))
                .fold(0.0, f64::max);
            upward.insert(node.clone(), compute_cost(node) + successor_term);
        }

        let mut downward: HashMap<K, f64> = HashMap::with_capacity(order.len());
        for node in order.iter() {
            let rank = graph
                .parents(node)
                .iter()
                .map(|parent| downward.get(parent).copied().unwrap_or(0.0) + compute_cost(parent) + communication_cost(parent, node))
                .fold(0.0, f64::max);
            downward.insert(node.clone(), rank);
        }

        Ok(Ranks { upward, downward })
    }

    pub fn upward_rank(&self, node: &K) -> f64 {
        self.upward.get(node).copied().unwrap_or(0.0)
    }

    pub fn downward_rank(&self, node: &K) -> f64 {
        self.downward.get(node).copied().unwrap_or(0.0)
    }

    /// All nodes sorted by descending upward rank, ties broken by ascending id.
    pub fn by_descending_upward_rank(&self) -> Vec<K> {
        let mut nodes: Vec<K> = self.upward.keys().cloned().collect();
        nodes.sort_by(|a, b| {
            let rank_a = self.upward_rank(a);
            let rank_b = self.upward_rank(b);
            rank_b.partial_cmp(&rank_a).unwrap_or(Ordering::Equal).then_with(|| a.cmp(b))
        });
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_with_branch() -> Graph<String, ()> {
        // a -> b -> d, a -> c
        let mut graph = Graph::new();
        for id in ["a", "b", "c", "d"] {
            graph.add_node(id.to_string(), ()).unwrap();
        }
        graph.add_edge(&"a".to_string(), &"b".to_string(), ()).unwrap();
        graph.add_edge(&"a".to_string(), &"c".to_string(), ()).unwrap();
        graph.add_edge(&"b".to_string(), &"d".to_string(), ()).unwrap();
        graph
    }

    #[test]
    fn test_sink_rank_is_its_compute_cost() {
        let graph = chain_with_branch();
        let ranks = Ranks::compute(&graph, |_| 4.0, |_, _| 1.0).unwrap();

        assert_eq!(ranks.upward_rank(&"d".to_string()), 4.0);
        assert_eq!(ranks.upward_rank(&"c".to_string()), 4.0);
        assert_eq!(ranks.upward_rank(&"b".to_string()), 9.0);
        assert_eq!(ranks.upward_rank(&"a".to_string()), 14.0);
    }

    #[test]
    fn test_downward_rank_of_sources_is_zero() {
        let graph = chain_with_branch();
        let ranks = Ranks::compute(&graph, |_| 4.0, |_, _| 1.0).unwrap();

        assert_eq!(ranks.downward_rank(&"a".to_string()), 0.0);
        assert_eq!(ranks.downward_rank(&"b".to_string()), 5.0);
        assert_eq!(ranks.downward_rank(&"d".to_string()), 10.0);
    }

    #[test]
    fn test_upward_rank_strictly_decreases_along_edges_with_positive_cost() {
        let graph = chain_with_branch();
        let ranks = Ranks::compute(&graph, |_| 2.0, |_, _| 0.5).unwrap();

        for (parent, child) in graph.edges() {
            assert!(ranks.upward_rank(&parent) > ranks.upward_rank(&child), "{} -> {}", parent, child);
        }
    }

    #[test]
    fn test_downward_rank_never_decreases_along_edges() {
        // Two joins and a skip edge, with uneven costs and some free edges.
        let mut graph = Graph::new();
        for id in ["s", "t", "u", "v", "w", "x", "y"] {
            graph.add_node(id.to_string(), ()).unwrap();
        }
        for (parent, child) in [("s", "u"), ("t", "u"), ("s", "v"), ("u", "w"), ("v", "w"), ("t", "x"), ("w", "y"), ("x", "y"), ("s", "y")] {
            graph.add_edge(&parent.to_string(), &child.to_string(), ()).unwrap();
        }
        let compute = |id: &String| if id == "t" || id == "w" { 0.0 } else { id.len() as f64 + 2.5 };
        let communication = |parent: &String, _: &String| if parent == "s" { 0.0 } else { 1.5 };

        let ranks = Ranks::compute(&graph, compute, communication).unwrap();

        for (parent, child) in graph.edges() {
            assert!(ranks.downward_rank(&parent) <= ranks.downward_rank(&child), "{} -> {}", parent, child);
        }
        assert_eq!(ranks.downward_rank(&"s".to_string()), 0.0);
        assert_eq!(ranks.downward_rank(&"t".to_string()), 0.0);
    }

    #[test]
    fn test_order_breaks_ties_by_id() {
        let graph = chain_with_branch();
        let ranks = Ranks::compute(&graph, |_| 1.0, |_, _| 0.0).unwrap();

        // a=3, b=2, c=1, d=1
        assert_eq!(ranks.by_descending_upward_rank(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_cyclic_graph_is_rejected() {
        let mut graph = chain_with_branch();
        graph.add_edge(&"d".to_string(), &"a".to_string(), ()).unwrap();

        assert!(Ranks::compute(&graph, |_| 1.0, |_, _| 1.0).is_err());
    }
}
