pub mod io;
pub mod ops;
pub mod query;
pub mod stat;
pub mod tokens;
pub mod traversal;

use super::error::TreeError;
use super::node::{Node, NodeId};
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone)]
pub struct Tree {
    /// Arena storage for all nodes
    pub(super) nodes: Vec<Node>,

    /// Optional root ID (a tree might be empty or in construction)
    pub(super) root: Option<NodeId>,
}

impl Tree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new node to the tree. Returns the new node's ID.
    pub fn add_node(&mut self) -> NodeId {
        let id = self.nodes.len();
        let node = Node::new(id);
        self.nodes.push(node);
        id
    }

    /// Get number of nodes
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| !n.deleted).count()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get root ID
    pub fn get_root(&self) -> Option<NodeId> {
        self.root
    }

    /// Get a reference to a node by ID.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id).filter(|n| !n.deleted)
    }

    /// Get a mutable reference to a node by ID.
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id).filter(|n| !n.deleted)
    }

    /// Set a node as the root of the tree.
    pub fn set_root(&mut self, id: NodeId) {
        if self.get_node(id).is_some() {
            self.root = Some(id);
        }
    }

    /// Neighbours of a node in the unrooted sense: children first, then the parent.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        match self.get_node(id) {
            Some(node) => {
                let mut list = node.children.clone();
                if let Some(p) = node.parent {
                    list.push(p);
                }
                list
            }
            None => Vec::new(),
        }
    }

    /// Length of the edge joining two adjacent nodes.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<f64> {
        let node_a = self.get_node(a)?;
        let node_b = self.get_node(b)?;
        if node_a.parent == Some(b) {
            Some(node_a.edge_length())
        } else if node_b.parent == Some(a) {
            Some(node_b.edge_length())
        } else {
            None
        }
    }

    // --- Delegation to ops ---

    pub fn add_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<(), String> {
        ops::add_child(self, parent_id, child_id)
    }

    pub fn remove_node(&mut self, id: NodeId, recursive: bool) {
        ops::remove_node(self, id, recursive)
    }

    pub fn collapse_node(&mut self, id: NodeId) -> Result<(), String> {
        ops::collapse_node(self, id)
    }

    pub fn compact(&mut self) {
        ops::compact(self)
    }

    pub fn remove_degree_two_nodes(&mut self) {
        ops::remove_degree_two_nodes(self)
    }

    pub fn remove_unifurcating_root(&mut self) {
        ops::remove_unifurcating_root(self)
    }

    pub fn deroot(&mut self) -> Result<(), String> {
        ops::deroot(self)
    }

    // --- Delegation to traversal ---

    pub fn preorder(&self, start_node: &NodeId) -> Result<Vec<NodeId>, String> {
        Ok(traversal::preorder(self, *start_node))
    }

    pub fn postorder(&self, start_node: &NodeId) -> Result<Vec<NodeId>, String> {
        Ok(traversal::postorder(self, *start_node))
    }

    // --- Delegation to query ---

    pub fn get_path_from_root(&self, id: &NodeId) -> Result<Vec<NodeId>, String> {
        query::get_path_from_root(self, id)
    }

    pub fn get_distance(&self, a: &NodeId, b: &NodeId) -> Result<(f64, usize), String> {
        query::get_distance(self, a, b)
    }

    pub fn get_path_edges(&self, a: &NodeId, b: &NodeId) -> Result<Vec<NodeId>, String> {
        query::get_path_edges(self, a, b)
    }

    pub fn find_nodes<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        query::find_nodes(self, predicate)
    }

    pub fn get_node_by_name(&self, name: &str) -> Option<NodeId> {
        query::get_node_by_name(self, name)
    }

    // --- Delegation to stat ---

    pub fn get_leaves(&self) -> Vec<NodeId> {
        if let Some(root) = self.root {
            stat::get_leaves(self, root)
        } else {
            Vec::new()
        }
    }

    pub fn get_leaf_names(&self) -> Vec<Option<String>> {
        if let Some(root) = self.root {
            stat::get_leaf_names(self, root)
        } else {
            Vec::new()
        }
    }

    pub fn is_rooted(&self) -> bool {
        stat::is_rooted(self)
    }

    pub fn get_leaf_map(&self) -> BTreeMap<String, NodeId> {
        stat::get_leaf_map(self)
    }

    pub fn check_leaf_labels(&self) -> Result<(), TreeError> {
        stat::check_leaf_labels(self)
    }

    // --- Delegation to tokens ---

    pub fn assign_tokens(&mut self) -> usize {
        tokens::assign_tokens(self)
    }

    // --- Delegation to io ---

    pub fn from_file(infile: &str) -> anyhow::Result<Vec<Tree>> {
        io::from_file(infile)
    }

    pub fn to_newick(&self) -> String {
        io::to_newick(self)
    }

    pub fn to_newick_with_tokens(&self) -> String {
        io::to_newick_with_tokens(self)
    }

    pub fn to_newick_token_labels(&self) -> String {
        io::to_newick_token_labels(self)
    }
}
