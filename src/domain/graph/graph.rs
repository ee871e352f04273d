use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;

use crate::domain::graph::cycle_checker::CycleChecker;
use crate::error::{CyclicWorkflowError, GraphError};

/// Anything usable as a node key: the typed ids of the workflow model, or plain strings in tests.
pub trait NodeKey: Clone + Eq + Hash + Ord + fmt::Display + fmt::Debug {}

impl<T: Clone + Eq + Hash + Ord + fmt::Display + fmt::Debug> NodeKey for T {}

/// A node of the graph: its key, its payload and both adjacency lists.
#[derive(Debug, Clone)]
pub struct GraphNode<K, N> {
    pub id: K,
    pub content: N,
    parents: Vec<K>,
    children: Vec<K>,
}

impl<K, N> GraphNode<K, N> {
    pub fn parents(&self) -> &[K] {
        &self.parents
    }
}

/// Directed graph of keyed nodes with labeled edges.
///
/// Nodes are iterated in insertion order and adjacency lists keep the order in which edges were
/// added, so every traversal over the graph is deterministic.
#[derive(Debug, Clone)]
pub struct Graph<K, N, E = ()> {
    nodes: HashMap<K, GraphNode<K, N>>,
    order: Vec<K>,
    edges: HashMap<(K, K), E>,
}

impl<K: NodeKey, N, E> Default for Graph<K, N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: NodeKey, N, E> Graph<K, N, E> {
    pub fn new() -> Self {
        Graph { nodes: HashMap::new(), order: Vec::new(), edges: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, id: &K) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn add_node(&mut self, id: K, content: N) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id.to_string()));
        }

        self.order.push(id.clone());
        self.nodes.insert(id.clone(), GraphNode { id, content, parents: Vec::new(), children: Vec::new() });
        Ok(())
    }

    /// Adds the edge `parent -> child`.
    ///
    /// Returns `Ok(false)` if the edge was already present (the existing label is kept).
    pub fn add_edge(&mut self, parent: &K, child: &K, label: E) -> Result<bool, GraphError> {
        if parent == child {
            return Err(GraphError::InvalidEdge {
                parent: parent.to_string(),
                child: child.to_string(),
                reason: "self-loop".to_string(),
            });
        }
        if !self.nodes.contains_key(parent) {
            return Err(GraphError::UnknownNode(parent.to_string()));
        }
        if !self.nodes.contains_key(child) {
            return Err(GraphError::UnknownNode(child.to_string()));
        }

        let key = (parent.clone(), child.clone());
        if self.edges.contains_key(&key) {
            return Ok(false);
        }
        self.edges.insert(key, label);

        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child.clone());
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parents.push(parent.clone());
        }
        Ok(true)
    }

    pub fn remove_edge(&mut self, parent: &K, child: &K) -> Option<E> {
        let label = self.edges.remove(&(parent.clone(), child.clone()))?;

        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|c| c != child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parents.retain(|p| p != parent);
        }
        Some(label)
    }

    /// Removes the node together with all its incident edges and returns its payload.
    pub fn remove_node(&mut self, id: &K) -> Option<N> {
        let node = self.nodes.remove(id)?;

        for parent in &node.parents {
            self.edges.remove(&(parent.clone(), id.clone()));
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.retain(|c| c != id);
            }
        }
        for child in &node.children {
            self.edges.remove(&(id.clone(), child.clone()));
            if let Some(child_node) = self.nodes.get_mut(child) {
                child_node.parents.retain(|p| p != id);
            }
        }
        self.order.retain(|k| k != id);

        Some(node.content)
    }

    pub fn content(&self, id: &K) -> Option<&N> {
        self.nodes.get(id).map(|node| &node.content)
    }

    pub fn content_mut(&mut self, id: &K) -> Option<&mut N> {
        self.nodes.get_mut(id).map(|node| &mut node.content)
    }

    /// Children of `id`; empty if the node does not exist.
    pub fn children(&self, id: &K) -> &[K] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Parents of `id`; empty if the node does not exist.
    pub fn parents(&self, id: &K) -> &[K] {
        self.nodes.get(id).map(|n| n.parents.as_slice()).unwrap_or(&[])
    }

    pub fn has_edge(&self, parent: &K, child: &K) -> bool {
        self.edges.contains_key(&(parent.clone(), child.clone()))
    }

    pub fn edge(&self, parent: &K, child: &K) -> Option<&E> {
        self.edges.get(&(parent.clone(), child.clone()))
    }

    /// Node keys in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode<K, N>> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// All edges as (parent, child) pairs, ordered by parent insertion and then edge insertion.
    pub fn edges(&self) -> Vec<(K, K)> {
        self.nodes().flat_map(|node| node.children.iter().map(move |child| (node.id.clone(), child.clone()))).collect()
    }

    /// Nodes without parents, in insertion order.
    pub fn roots(&self) -> Vec<K> {
        self.nodes().filter(|node| node.parents.is_empty()).map(|node| node.id.clone()).collect()
    }

    /// Nodes without children, in insertion order.
    pub fn leaves(&self) -> Vec<K> {
        self.nodes().filter(|node| node.children.is_empty()).map(|node| node.id.clone()).collect()
    }

    /// Kahn's algorithm, seeded with the roots in insertion order.
    pub fn topological_order(&self) -> Result<Vec<K>, CyclicWorkflowError> {
        let mut in_degree: HashMap<&K, usize> = self.nodes.iter().map(|(id, node)| (id, node.parents.len())).collect();
        let mut queue: VecDeque<&K> = self.order.iter().filter(|id| in_degree.get(id).copied() == Some(0)).collect();
        let mut sorted = Vec::with_capacity(self.nodes.len());

        while let Some(id) = queue.pop_front() {
            sorted.push(id.clone());
            for child in self.children(id) {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(child);
                    }
                }
            }
        }

        if sorted.len() != self.nodes.len() {
            let mut checker = CycleChecker::new(self);
            checker.has_cycle();
            return Err(checker.to_error());
        }
        Ok(sorted)
    }

    /// Runs the cycle checker and converts a positive answer into an error.
    pub fn check_acyclic(&self) -> Result<(), CyclicWorkflowError> {
        let mut checker = CycleChecker::new(self);
        if checker.has_cycle() {
            return Err(checker.to_error());
        }
        Ok(())
    }
}
