use std::collections::HashMap;

use crate::domain::graph::graph::{Graph, NodeKey};
use crate::error::CyclicWorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/**
 * Detects cycles with a three-colour depth first traversal.
 *
 * The traversal starts at every root of the graph (in insertion order). The
 * first edge reaching a gray node closes a cycle and is remembered as the
 * cyclic edge. Nodes that are still white after all roots were traversed can
 * only be part of (or below) a cycle without an entry point; the graph is
 * cyclic in that case but there is no edge to report.
 *
 * The checker is stateful: `cyclic_edge` reflects the last call to `has_cycle`.
 */
pub struct CycleChecker<'a, K, N, E> {
    graph: &'a Graph<K, N, E>,
    cyclic_edge: Option<(K, K)>,
}

impl<'a, K: NodeKey, N, E> CycleChecker<'a, K, N, E> {
    pub fn new(graph: &'a Graph<K, N, E>) -> Self {
        CycleChecker { graph, cyclic_edge: None }
    }

    pub fn has_cycle(&mut self) -> bool {
        self.cyclic_edge = None;

        let graph: &'a Graph<K, N, E> = self.graph;
        let mut colors: HashMap<&'a K, Color> = graph.node_ids().map(|id| (id, Color::White)).collect();

        for root in graph.nodes().filter(|node| node.parents().is_empty()).map(|node| &node.id) {
            if colors.get(root).copied() != Some(Color::White) {
                continue;
            }
            if let Some(edge) = Self::visit(graph, root, &mut colors) {
                log::debug!("Cycle detected, closed by edge {} -> {}", edge.0, edge.1);
                self.cyclic_edge = Some(edge);
                return true;
            }
        }

        let unreachable = colors.values().filter(|color| **color == Color::White).count();
        if unreachable > 0 {
            log::debug!("Cycle detected: {} node(s) are not reachable from any root", unreachable);
            return true;
        }
        false
    }

    /// The edge that closed the cycle found by the last `has_cycle` call, if one could be singled out.
    pub fn cyclic_edge(&self) -> Option<&(K, K)> {
        self.cyclic_edge.as_ref()
    }

    pub fn to_error(&self) -> CyclicWorkflowError {
        CyclicWorkflowError { edge: self.cyclic_edge.as_ref().map(|(parent, child)| (parent.to_string(), child.to_string())) }
    }

    fn visit(graph: &'a Graph<K, N, E>, start: &'a K, colors: &mut HashMap<&'a K, Color>) -> Option<(K, K)> {
        let mut stack: Vec<(&'a K, usize)> = vec![(start, 0)];
        colors.insert(start, Color::Gray);

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let children = graph.children(node);

            if frame.1 < children.len() {
                let child = &children[frame.1];
                frame.1 += 1;

                match colors.get(child).copied().unwrap_or(Color::White) {
                    Color::Gray => return Some((node.clone(), child.clone())),
                    Color::White => {
                        colors.insert(child, Color::Gray);
                        stack.push((child, 0));
                    }
                    Color::Black => {}
                }
            } else {
                colors.insert(node, Color::Black);
                stack.pop();
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(ids: &[&str]) -> Graph<String, ()> {
        let mut graph = Graph::new();
        for id in ids {
            graph.add_node(id.to_string(), ()).unwrap();
        }
        for pair in ids.windows(2) {
            graph.add_edge(&pair[0].to_string(), &pair[1].to_string(), ()).unwrap();
        }
        graph
    }

    #[test]
    fn test_acyclic_chain_has_no_cycle() {
        let graph = chain(&["a", "b", "c", "d"]);
        let mut checker = CycleChecker::new(&graph);

        assert!(!checker.has_cycle());
        assert!(checker.cyclic_edge().is_none());
    }

    #[test]
    fn test_diamond_is_acyclic() {
        let mut graph: Graph<String, ()> = Graph::new();
        for id in ["a", "b", "c", "d"] {
            graph.add_node(id.to_string(), ()).unwrap();
        }
        for (p, c) in [("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")] {
            graph.add_edge(&p.to_string(), &c.to_string(), ()).unwrap();
        }

        assert!(!CycleChecker::new(&graph).has_cycle());
    }

    #[test]
    fn test_back_edge_is_reported() {
        let mut graph = chain(&["a", "b", "c"]);
        graph.add_edge(&"c".to_string(), &"b".to_string(), ()).unwrap();

        let mut checker = CycleChecker::new(&graph);
        assert!(checker.has_cycle());
        assert_eq!(checker.cyclic_edge(), Some(&("c".to_string(), "b".to_string())));
        assert_eq!(checker.to_error().edge, Some(("c".to_string(), "b".to_string())));
    }

    #[test]
    fn test_giant_cycle_has_no_reportable_edge() {
        let mut graph = chain(&["a", "b", "c", "d"]);
        graph.add_edge(&"d".to_string(), &"a".to_string(), ()).unwrap();

        let mut checker = CycleChecker::new(&graph);
        assert!(checker.has_cycle(), "A graph without roots must be reported as cyclic");
        assert!(checker.cyclic_edge().is_none());
    }

    #[test]
    fn test_cycle_unreachable_from_roots_is_detected() {
        // "x" is an isolated root, the cycle y <-> z has no entry point.
        let mut graph = chain(&["x"]);
        graph.add_node("y".to_string(), ()).unwrap();
        graph.add_node("z".to_string(), ()).unwrap();
        graph.add_edge(&"y".to_string(), &"z".to_string(), ()).unwrap();
        graph.add_edge(&"z".to_string(), &"y".to_string(), ()).unwrap();

        let mut checker = CycleChecker::new(&graph);
        assert!(checker.has_cycle());
        assert!(checker.cyclic_edge().is_none());
    }

    #[test]
    fn test_state_is_reset_between_calls() {
        let mut graph = chain(&["a", "b", "c"]);
        graph.add_edge(&"c".to_string(), &"b".to_string(), ()).unwrap();
        {
            let mut checker = CycleChecker::new(&graph);
            assert!(checker.has_cycle());
        }
        graph.remove_edge(&"c".to_string(), &"b".to_string());

        let mut checker = CycleChecker::new(&graph);
        assert!(!checker.has_cycle());
        assert!(checker.cyclic_edge().is_none());
    }
}
