use super::Tree;
use crate::libs::phylo::node::{Node, NodeId};

/// Nodes from the root down to `id`, both included.
pub fn get_path_from_root(tree: &Tree, id: &NodeId) -> Result<Vec<NodeId>, String> {
    let mut path = Vec::new();
    let mut current = *id;

    if tree.get_node(current).is_none() {
        return Err(format!("Node {} not found", current));
    }

    loop {
        path.push(current);
        match tree.nodes[current].parent {
            Some(p) => current = p,
            None => break,
        }
    }

    path.reverse();
    if let Some(root) = tree.root {
        if path[0] != root {
            return Err("Node is detached from root".to_string());
        }
    }

    Ok(path)
}

/// Calculate distance between two nodes.
/// Returns (weighted_distance, topological_distance).
pub fn get_distance(tree: &Tree, a: &NodeId, b: &NodeId) -> Result<(f64, usize), String> {
    let edges = get_path_edges(tree, a, b)?;
    let weighted = edges
        .iter()
        .filter_map(|&e| tree.get_node(e))
        .map(Node::edge_length)
        .sum();

    Ok((weighted, edges.len()))
}

/// Edges on the unique simple path from `a` to `b`, ordered from `a`'s side.
///
/// An edge is named by its child node. The first half climbs from `a` to the
/// LCA, the second half descends from the LCA to `b`.
pub fn get_path_edges(tree: &Tree, a: &NodeId, b: &NodeId) -> Result<Vec<NodeId>, String> {
    let path_a = get_path_from_root(tree, a)?;
    let path_b = get_path_from_root(tree, b)?;

    let shared = path_a
        .iter()
        .zip(path_b.iter())
        .take_while(|(u, v)| u == v)
        .count();
    if shared == 0 {
        return Err("Nodes are not in the same tree (no common ancestor)".to_string());
    }

    let mut edges: Vec<NodeId> = path_a[shared..].iter().rev().copied().collect();
    edges.extend(path_b[shared..].iter().copied());

    Ok(edges)
}

/// Count number of descendants (all nodes in subtree excluding self).
pub fn count_descendants(tree: &Tree, id: NodeId) -> usize {
    super::traversal::preorder(tree, id).len().saturating_sub(1)
}

/// Find nodes matching a predicate.
pub fn find_nodes<F>(tree: &Tree, predicate: F) -> Vec<NodeId>
where
    F: Fn(&Node) -> bool,
{
    tree.nodes
        .iter()
        .filter(|n| !n.deleted && predicate(n))
        .map(|n| n.id)
        .collect()
}

/// Get node ID by name. Returns first match.
pub fn get_node_by_name(tree: &Tree, name: &str) -> Option<NodeId> {
    tree.nodes
        .iter()
        .find(|n| !n.deleted && n.name.as_deref() == Some(name))
        .map(|n| n.id)
}
