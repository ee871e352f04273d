/// Unit tests for the graph model in `graph.rs`.
#[cfg(test)]
mod tests {
    use crate::domain::graph::graph::Graph;
    use crate::error::GraphError;

    fn key(id: &str) -> String {
        id.to_string()
    }

    fn diamond() -> Graph<String, u32, f64> {
        let mut graph = Graph::new();
        for (i, id) in ["a", "b", "c", "d"].iter().enumerate() {
            graph.add_node(key(id), i as u32).unwrap();
        }
        graph.add_edge(&key("a"), &key("b"), 1.0).unwrap();
        graph.add_edge(&key("a"), &key("c"), 2.0).unwrap();
        graph.add_edge(&key("b"), &key("d"), 3.0).unwrap();
        graph.add_edge(&key("c"), &key("d"), 4.0).unwrap();
        graph
    }

    #[test]
    fn test_add_duplicate_node_fails() {
        let mut graph: Graph<String, ()> = Graph::new();
        graph.add_node(key("a"), ()).unwrap();

        assert_eq!(graph.add_node(key("a"), ()), Err(GraphError::DuplicateNode("a".to_string())));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_add_edge_to_unknown_node_fails() {
        let mut graph: Graph<String, ()> = Graph::new();
        graph.add_node(key("a"), ()).unwrap();

        assert_eq!(graph.add_edge(&key("a"), &key("x"), ()), Err(GraphError::UnknownNode("x".to_string())));
        assert_eq!(graph.add_edge(&key("y"), &key("a"), ()), Err(GraphError::UnknownNode("y".to_string())));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_self_loop_is_rejected_before_anything_else() {
        let mut graph: Graph<String, ()> = Graph::new();
        graph.add_node(key("a"), ()).unwrap();

        assert!(matches!(graph.add_edge(&key("a"), &key("a"), ()), Err(GraphError::InvalidEdge { .. })));
        // Even for a node that does not exist the self-loop is the reported problem.
        assert!(matches!(graph.add_edge(&key("z"), &key("z"), ()), Err(GraphError::InvalidEdge { .. })));
    }

    #[test]
    fn test_duplicate_edge_keeps_first_label() {
        let mut graph = diamond();

        assert_eq!(graph.add_edge(&key("a"), &key("b"), 99.0), Ok(false));
        assert_eq!(graph.edge(&key("a"), &key("b")), Some(&1.0));
        assert_eq!(graph.children(&key("a")), &[key("b"), key("c")]);
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn test_adjacency_is_bidirectional() {
        let graph = diamond();

        assert_eq!(graph.children(&key("a")), &[key("b"), key("c")]);
        assert_eq!(graph.parents(&key("d")), &[key("b"), key("c")]);
        assert_eq!(graph.roots(), vec![key("a")]);
        assert_eq!(graph.leaves(), vec![key("d")]);
        assert!(graph.children(&key("missing")).is_empty());
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut graph = diamond();

        assert_eq!(graph.remove_node(&key("b")), Some(1));
        assert!(!graph.contains(&key("b")));
        assert_eq!(graph.children(&key("a")), &[key("c")]);
        assert_eq!(graph.parents(&key("d")), &[key("c")]);
        assert_eq!(graph.edge_count(), 2);
        assert!(!graph.has_edge(&key("a"), &key("b")));
        assert_eq!(graph.node_ids().cloned().collect::<Vec<_>>(), vec![key("a"), key("c"), key("d")]);
    }

    #[test]
    fn test_remove_edge() {
        let mut graph = diamond();

        assert_eq!(graph.remove_edge(&key("c"), &key("d")), Some(4.0));
        assert_eq!(graph.remove_edge(&key("c"), &key("d")), None);
        assert_eq!(graph.leaves(), vec![key("c"), key("d")]);
    }

    #[test]
    fn test_topological_order_is_deterministic() {
        let graph = diamond();

        assert_eq!(graph.topological_order().unwrap(), vec![key("a"), key("b"), key("c"), key("d")]);
        assert_eq!(graph.edges(), vec![(key("a"), key("b")), (key("a"), key("c")), (key("b"), key("d")), (key("c"), key("d"))]);
    }

    #[test]
    fn test_topological_order_of_cyclic_graph_fails() {
        let mut graph = diamond();
        graph.add_edge(&key("d"), &key("b"), 0.0).unwrap();

        let err = graph.topological_order().unwrap_err();
        assert_eq!(err.edge, Some((key("d"), key("b"))));
        assert!(graph.check_acyclic().is_err());
    }
}
