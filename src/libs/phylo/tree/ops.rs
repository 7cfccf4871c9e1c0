use super::Tree;
use crate::libs::phylo::node::NodeId;

/// Add a child to a parent node.
/// Updates both parent's `children` list and child's `parent` field.
pub fn add_child(tree: &mut Tree, parent_id: NodeId, child_id: NodeId) -> Result<(), String> {
    if parent_id == child_id {
        return Err("Cannot add node as child of itself".to_string());
    }
    if tree.get_node(parent_id).is_none() {
        return Err(format!("Parent node {} not found or deleted", parent_id));
    }
    if tree.get_node(child_id).is_none() {
        return Err(format!("Child node {} not found or deleted", child_id));
    }

    if let Some(old_parent) = tree.nodes[child_id].parent {
        return Err(format!(
            "Node {} already has parent {}",
            child_id, old_parent
        ));
    }

    tree.nodes[child_id].parent = Some(parent_id);
    tree.nodes[parent_id].children.push(child_id);

    Ok(())
}

/// Soft remove a node and its descendants (optional recursive).
/// If recursive is false, children are orphaned (parent set to None).
pub fn remove_node(tree: &mut Tree, id: NodeId, recursive: bool) {
    if id >= tree.nodes.len() || tree.nodes[id].deleted {
        return;
    }

    if let Some(parent_id) = tree.nodes[id].parent {
        if let Some(parent) = tree.get_node_mut(parent_id) {
            parent.children.retain(|&child| child != id);
        }
    }

    let children = tree.nodes[id].children.clone();
    for child_id in children {
        if recursive {
            remove_node(tree, child_id, true);
        } else if let Some(child) = tree.get_node_mut(child_id) {
            child.parent = None;
        }
    }

    if let Some(node) = tree.get_node_mut(id) {
        node.deleted = true;
        node.children.clear();
        node.parent = None;
    }

    if tree.root == Some(id) {
        tree.root = None;
    }
}

/// Collapse a node, removing it and connecting its children to its parent.
/// Edge lengths are summed (parent->node + node->child).
///
/// A merged internal edge spans two original edges, so its token is cleared.
/// Leaves keep their token: it names the taxon as well as the edge.
pub fn collapse_node(tree: &mut Tree, id: NodeId) -> Result<(), String> {
    let node = tree.get_node(id).ok_or(format!("Node {} not found", id))?;
    if tree.root == Some(id) {
        return Err("Cannot collapse root node".to_string());
    }
    let parent_id = node.parent.ok_or(format!("Node {} is detached", id))?;
    let parent_edge = node.length;
    let children = node.children.clone();

    for &child_id in &children {
        if let Some(child) = tree.get_node_mut(child_id) {
            child.length = match (parent_edge, child.length) {
                (Some(p), Some(c)) => Some(p + c),
                (Some(p), None) => Some(p),
                (None, c) => c,
            };
            child.parent = Some(parent_id);
            if !child.is_leaf() {
                child.token = None;
            }
        }
    }

    if let Some(parent) = tree.get_node_mut(parent_id) {
        if let Some(pos) = parent.children.iter().position(|&x| x == id) {
            parent.children.splice(pos..pos + 1, children);
        }
    }

    if let Some(node) = tree.get_node_mut(id) {
        node.deleted = true;
        node.children.clear();
        node.parent = None;
    }

    Ok(())
}

/// Compact the tree by removing soft-deleted nodes and remapping IDs.
/// This invalidates all existing NodeIds held outside!
pub fn compact(tree: &mut Tree) {
    let mut old_to_new = std::collections::HashMap::new();
    let mut new_nodes = Vec::with_capacity(tree.nodes.len());

    for old_node in &tree.nodes {
        if !old_node.deleted {
            let new_idx = new_nodes.len();
            old_to_new.insert(old_node.id, new_idx);
            let mut new_node = old_node.clone();
            new_node.id = new_idx;
            new_node.parent = None;
            new_node.children.clear();
            new_nodes.push(new_node);
        }
    }

    for node in tree.nodes.iter().filter(|n| !n.deleted) {
        let new_self_idx = old_to_new[&node.id];

        if let Some(old_parent) = node.parent {
            if let Some(&new_parent) = old_to_new.get(&old_parent) {
                new_nodes[new_self_idx].parent = Some(new_parent);
            }
        }

        for &old_child in &node.children {
            if let Some(&new_child) = old_to_new.get(&old_child) {
                new_nodes[new_self_idx].children.push(new_child);
            }
        }
    }

    if let Some(old_root) = tree.root {
        tree.root = old_to_new.get(&old_root).copied();
    }

    tree.nodes = new_nodes;
}

/// Remove nodes that have a parent and exactly one child (degree 2 nodes).
///
/// Collapsing one node never changes the degree of another, so a single pass
/// over the candidates is enough.
pub fn remove_degree_two_nodes(tree: &mut Tree) {
    let candidates = tree.find_nodes(|n| n.parent.is_some() && n.children.len() == 1);
    for id in candidates {
        let _ = collapse_node(tree, id);
    }
}

/// Replace a root with a single child by that child, until the root branches
/// or is a leaf.
pub fn remove_unifurcating_root(tree: &mut Tree) {
    while let Some(root) = tree.root {
        let children = match tree.get_node(root) {
            Some(node) if node.children.len() == 1 => node.children.clone(),
            _ => break,
        };
        let child = children[0];
        if let Some(node) = tree.get_node_mut(child) {
            node.parent = None;
            node.length = None;
            if !node.is_leaf() {
                node.token = None;
            }
        }
        if let Some(node) = tree.get_node_mut(root) {
            node.children.clear();
            node.deleted = true;
        }
        tree.root = Some(child);
    }
}

/// Deroot the tree by splicing out one of the root's children if the root is bifurcating.
///
/// The spliced child's edge is added to its sibling, so the two root edges
/// become one edge and every leaf-to-leaf distance is preserved. The root ends
/// up with three or more children. The "heavier" child (more descendants,
/// first on ties) is the one spliced out.
pub fn deroot(tree: &mut Tree) -> Result<(), String> {
    let root = tree.root.ok_or("Empty tree")?;
    let children = tree
        .get_node(root)
        .ok_or("Root node is deleted")?
        .children
        .clone();

    if children.len() != 2 {
        return Err("Root is not bifurcating (degree != 2)".to_string());
    }

    let c1 = children[0];
    let c2 = children[1];

    let weight1 = 1 + super::query::count_descendants(tree, c1);
    let weight2 = 1 + super::query::count_descendants(tree, c2);

    let (target, sibling) = if weight1 >= weight2 { (c1, c2) } else { (c2, c1) };
    let target_node = tree.get_node(target).ok_or("Root child is deleted")?;
    if target_node.is_leaf() {
        return Err("Cannot deroot a tree with only two leaves".to_string());
    }
    let target_edge = target_node.length;
    let grandchildren = target_node.children.clone();

    if let Some(node) = tree.get_node_mut(sibling) {
        node.length = match (node.length, target_edge) {
            (Some(s), Some(t)) => Some(s + t),
            (None, t) => t,
            (s, None) => s,
        };
        if !node.is_leaf() {
            node.token = None;
        }
    }

    for &child in &grandchildren {
        if let Some(node) = tree.get_node_mut(child) {
            node.parent = Some(root);
        }
    }

    if let Some(node) = tree.get_node_mut(root) {
        if let Some(pos) = node.children.iter().position(|&x| x == target) {
            node.children.splice(pos..pos + 1, grandchildren);
        }
    }

    if let Some(node) = tree.get_node_mut(target) {
        node.deleted = true;
        node.children.clear();
        node.parent = None;
    }

    Ok(())
}
