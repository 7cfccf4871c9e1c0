use super::tokens::SEPARATOR;
use super::Tree;
use crate::libs::phylo::error::TreeError;
use crate::libs::phylo::node::NodeId;
use std::collections::BTreeMap;

/// Get IDs of all leaves in subtree rooted at `id`, left to right.
pub fn get_leaves(tree: &Tree, id: NodeId) -> Vec<NodeId> {
    super::traversal::preorder(tree, id)
        .into_iter()
        .filter(|&n| tree.get_node(n).map(|node| node.is_leaf()).unwrap_or(false))
        .collect()
}

/// Get names of all leaves in subtree.
pub fn get_leaf_names(tree: &Tree, id: NodeId) -> Vec<Option<String>> {
    get_leaves(tree, id)
        .into_iter()
        .map(|leaf_id| tree.get_node(leaf_id).and_then(|n| n.name.clone()))
        .collect()
}

/// Check if the tree is rooted (root node has degree 2).
/// Unrooted trees typically have a trifurcating root (degree >= 3).
pub fn is_rooted(tree: &Tree) -> bool {
    if let Some(root_id) = tree.get_root() {
        if let Some(node) = tree.get_node(root_id) {
            return node.children.len() == 2;
        }
    }
    false
}

/// Map of leaf label to leaf NodeId.
pub fn get_leaf_map(tree: &Tree) -> BTreeMap<String, NodeId> {
    let mut map = BTreeMap::new();
    for id in tree.get_leaves() {
        if let Some(name) = tree.get_node(id).and_then(|n| n.name.clone()) {
            map.insert(name, id);
        }
    }
    map
}

/// Every leaf must carry a non-empty label, unique within the tree and free
/// of the token separator. Leaf labels key the reference sequences and the
/// token encoding.
pub fn check_leaf_labels(tree: &Tree) -> Result<(), TreeError> {
    let mut seen = BTreeMap::new();
    for id in tree.get_leaves() {
        let name = tree
            .get_node(id)
            .and_then(|n| n.name.as_deref())
            .unwrap_or("");
        if name.is_empty() {
            return Err(TreeError::LabelError(format!("Leaf node {} has an empty label", id)));
        }
        if name.contains(SEPARATOR) {
            return Err(TreeError::LabelError(format!(
                "Leaf label '{}' contains the reserved separator '{}'",
                name, SEPARATOR
            )));
        }
        if let Some(prev) = seen.insert(name.to_string(), id) {
            return Err(TreeError::LabelError(format!(
                "Leaf label '{}' is used by nodes {} and {}",
                name, prev, id
            )));
        }
    }
    Ok(())
}
