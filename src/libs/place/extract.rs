//! Bounded subtrees around an anchor taxon.

use super::backbone::Backbone;
use super::error::PlaceError;
use super::frontier::Frontier;
use crate::libs::phylo::{NodeId, Tree, TreeError};
use std::collections::HashSet;
use std::str::FromStr;

/// How the leaves of a subtree are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtreeKind {
    /// Closest leaves by number of edges from the anchor
    Nodes,
    /// Closest leaves by path length from the anchor
    Edges,
    /// Closest leaves by sequence distance to the query
    Hamming,
}

impl FromStr for SubtreeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "n" | "nodes" => Ok(SubtreeKind::Nodes),
            "d" | "edges" => Ok(SubtreeKind::Edges),
            "h" | "hamming" => Ok(SubtreeKind::Hamming),
            _ => Err(format!("Unknown subtree type '{}', expected d, n or h", s)),
        }
    }
}

/// A subtree induced on some backbone leaves.
///
/// Leaves keep their backbone token. Internal edges keep theirs only when
/// they are a single backbone edge.
#[derive(Debug, Clone)]
pub struct Subtree {
    pub tree: Tree,
    /// Plain leaf labels, left to right
    pub labels: Vec<String>,
}

impl Subtree {
    /// The Newick handed to the engine, leaves written as `label%%token`.
    pub fn to_newick(&self) -> String {
        self.tree.to_newick_token_labels()
    }

    /// `(plain label, encoded label)` of each leaf, left to right.
    pub fn leaf_names(&self) -> Vec<(String, String)> {
        self.tree
            .get_leaves()
            .into_iter()
            .filter_map(|id| self.tree.get_node(id))
            .filter_map(|node| {
                let name = node.name.clone()?;
                let encoded = match node.token {
                    Some(t) => crate::libs::phylo::tree::tokens::encode_label(&name, t),
                    None => name.clone(),
                };
                Some((name, encoded))
            })
            .collect()
    }
}

/// Leaves nearest to `anchor` by hop count, anchor included.
pub fn grow_by_nodes(tree: &Tree, anchor: NodeId, n: usize) -> Vec<NodeId> {
    grow(tree, anchor, n, false)
}

/// Leaves nearest to `anchor` by path length, anchor included.
pub fn grow_by_edges(tree: &Tree, anchor: NodeId, n: usize) -> Vec<NodeId> {
    grow(tree, anchor, n, true)
}

// Best-first walk over parent and child links. Children are pushed before
// the parent, equal priorities pop in push order.
fn grow(tree: &Tree, anchor: NodeId, n: usize, weighted: bool) -> Vec<NodeId> {
    let mut leaves = vec![];
    let mut visited = HashSet::new();
    let mut frontier = Frontier::new();
    frontier.push(0.0, anchor);

    while let Some((dist, id)) = frontier.pop() {
        if leaves.len() >= n.max(1) {
            break;
        }
        if !visited.insert(id) {
            continue;
        }
        let node = match tree.get_node(id) {
            Some(node) => node,
            None => continue,
        };
        if node.is_leaf() && node.name.as_deref().is_some_and(|s| !s.is_empty()) {
            leaves.push(id);
        }

        for next in tree.neighbors(id) {
            if visited.contains(&next) {
                continue;
            }
            let step = if weighted {
                tree.edge_between(id, next).unwrap_or(0.0)
            } else {
                1.0
            };
            frontier.push(dist + step, next);
        }
    }

    leaves
}

/// Copy of `tree` restricted to the `selected` leaves.
///
/// Unselected leaves and the internal nodes left without children are
/// pruned, degree-two nodes are collapsed (lengths summed), a unifurcating
/// root is dropped and a bifurcating root is removed.
pub fn induce(tree: &Tree, selected: &[NodeId]) -> Result<Tree, PlaceError> {
    let root = tree
        .get_root()
        .ok_or_else(|| TreeError::LogicError("Empty backbone tree".to_string()))?;
    let wanted: HashSet<NodeId> = selected.iter().copied().collect();

    let mut kept = HashSet::new();
    for id in tree.postorder(&root)? {
        let node = match tree.get_node(id) {
            Some(node) => node,
            None => continue,
        };
        let keep = if node.is_leaf() {
            wanted.contains(&id)
        } else {
            node.children.iter().any(|c| kept.contains(c))
        };
        if keep {
            kept.insert(id);
        }
    }
    if !kept.contains(&root) {
        return Err(PlaceError::Tree(TreeError::LogicError(
            "No selected leaf in the backbone tree".to_string(),
        )));
    }

    let mut sub = tree.clone();
    for id in tree.preorder(&root)? {
        if !kept.contains(&id) {
            sub.remove_node(id, true);
        }
    }

    sub.remove_degree_two_nodes();
    sub.remove_unifurcating_root();
    if sub.is_rooted() && sub.get_leaves().len() > 2 {
        sub.deroot()?;
    }
    sub.compact();

    Ok(sub)
}

/// Extract the subtree for one query.
///
/// `closest` holds reference labels ordered by sequence distance to the
/// query. `Nodes` and `Edges` grow around `closest[0]`; `Hamming` takes the
/// first `size` labels as they are.
pub fn extract(
    backbone: &Backbone,
    kind: SubtreeKind,
    size: usize,
    closest: &[String],
) -> Result<Subtree, PlaceError> {
    let resolve = |label: &String| {
        backbone
            .leaf(label)
            .ok_or_else(|| PlaceError::UnknownLeaf(label.to_string()))
    };

    let anchor = closest.first().ok_or(PlaceError::NoReferences)?;
    let leaves = match kind {
        SubtreeKind::Nodes => grow_by_nodes(backbone.tree(), resolve(anchor)?, size),
        SubtreeKind::Edges => grow_by_edges(backbone.tree(), resolve(anchor)?, size),
        SubtreeKind::Hamming => closest
            .iter()
            .take(size.max(1))
            .map(resolve)
            .collect::<Result<Vec<_>, _>>()?,
    };

    let tree = induce(backbone.tree(), &leaves)?;
    let labels = tree
        .get_leaf_names()
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();
    tracing::debug!(
        "subtree around {}: {} leaves",
        anchor,
        labels.len()
    );

    Ok(Subtree { tree, labels })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backbone(newick: &str) -> Backbone {
        Backbone::new(Tree::from_newick(newick).unwrap()).unwrap()
    }

    fn names(tree: &Tree, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .map(|&id| tree.get_node(id).unwrap().name.clone().unwrap())
            .collect()
    }

    #[test]
    fn test_grow_by_nodes() {
        let bb = backbone("(A:1.0,B:0.5,(C:0.5,D:1.0)I:0.5);");
        let tree = bb.tree();
        let a = bb.leaf("A").unwrap();

        assert_eq!(names(tree, &grow_by_nodes(tree, a, 1)), vec!["A"]);
        // B and I are both one hop from the root; B was discovered first
        assert_eq!(names(tree, &grow_by_nodes(tree, a, 3)), vec!["A", "B", "C"]);
        assert_eq!(grow_by_nodes(tree, a, 100).len(), 4);
    }

    #[test]
    fn test_grow_by_edges() {
        let bb = backbone("((A:1,B:5):1,(C:1,D:1):2,E:0.5);");
        let tree = bb.tree();
        let a = bb.leaf("A").unwrap();

        // A-E 2.5, A-C 5, A-D 5, A-B 6
        assert_eq!(names(tree, &grow_by_edges(tree, a, 2)), vec!["A", "E"]);
        assert_eq!(
            names(tree, &grow_by_edges(tree, a, 4)),
            vec!["A", "E", "C", "D"]
        );

        // Hop count sees B first
        assert_eq!(names(tree, &grow_by_nodes(tree, a, 2)), vec!["A", "B"]);
    }

    #[test]
    fn test_induce_scenario() {
        let bb = backbone("(A:1.0,B:0.5,(C:0.5,D:1.0)I:0.5);");
        let sub = extract(&bb, SubtreeKind::Nodes, 3, &["A".to_string()]).unwrap();

        assert_eq!(sub.tree.to_newick(), "(A:1,B:0.5,C:1);");
        assert_eq!(sub.labels, vec!["A", "B", "C"]);

        // Leaves keep their backbone tokens
        for (plain, encoded) in sub.leaf_names() {
            let token = bb.tree().get_node(bb.leaf(&plain).unwrap()).unwrap().token.unwrap();
            assert_eq!(encoded, format!("{}%%{}", plain, token));
        }
        assert_eq!(sub.to_newick(), "(A%%0:1,B%%1:0.5,C%%2:1);");
    }

    #[test]
    fn test_induce_preserves_distances() {
        let bb = backbone("(((A:1,B:2):0.5,C:1):0.25,(D:2,(E:1,F:0.5):0.1):0.75,G:3);");
        let keep = ["A", "C", "E", "G"];
        let ids: Vec<NodeId> = keep.iter().map(|l| bb.leaf(l).unwrap()).collect();
        let sub = induce(bb.tree(), &ids).unwrap();

        assert_eq!(sub.get_leaves().len(), 4);
        assert!(!sub.is_rooted());
        for x in keep {
            for y in keep {
                let (bx, by) = (bb.leaf(x).unwrap(), bb.leaf(y).unwrap());
                let (sx, sy) = (
                    sub.get_node_by_name(x).unwrap(),
                    sub.get_node_by_name(y).unwrap(),
                );
                let d1 = bb.tree().get_distance(&bx, &by).unwrap().0;
                let d2 = sub.get_distance(&sx, &sy).unwrap().0;
                assert!((d1 - d2).abs() < 1e-12, "{} {}", x, y);
            }
        }

        // No degree-two nodes left
        for id in sub.find_nodes(|_| true) {
            let node = sub.get_node(id).unwrap();
            assert!(node.is_leaf() || node.children.len() >= 2);
        }
    }

    #[test]
    fn test_induce_internal_tokens() {
        let bb = backbone("((A:1,B:1)X:1,(C:1,D:1)Y:1,(E:1,F:1)Z:1);");
        let ids: Vec<NodeId> = ["A", "B", "C", "E"]
            .iter()
            .map(|l| bb.leaf(l).unwrap())
            .collect();
        let sub = induce(bb.tree(), &ids).unwrap();

        // X still spans one backbone edge
        let x = sub.get_node_by_name("X").unwrap();
        let bx = bb.tree().get_node_by_name("X").unwrap();
        assert_eq!(
            sub.get_node(x).unwrap().token,
            bb.tree().get_node(bx).unwrap().token
        );

        // Y and Z were merged into the edges of C and E
        assert!(sub.get_node_by_name("Y").is_none());
        let c = sub.get_node_by_name("C").unwrap();
        assert_eq!(sub.get_node(c).unwrap().length, Some(2.0));
    }

    #[test]
    fn test_extract_hamming_and_errors() {
        let bb = backbone("(A:1.0,B:0.5,(C:0.5,D:1.0)I:0.5);");
        let closest: Vec<String> = ["D", "A", "B"].iter().map(|s| s.to_string()).collect();

        let sub = extract(&bb, SubtreeKind::Hamming, 2, &closest).unwrap();
        assert_eq!(sub.tree.to_newick(), "(A:1,D:1.5);");

        let unknown = vec!["Z".to_string()];
        assert!(matches!(
            extract(&bb, SubtreeKind::Edges, 3, &unknown),
            Err(PlaceError::UnknownLeaf(_))
        ));
        assert!(matches!(
            extract(&bb, SubtreeKind::Edges, 3, &[]),
            Err(PlaceError::NoReferences)
        ));
        assert!(induce(bb.tree(), &[]).is_err());
    }

    #[test]
    fn test_subtree_kind_from_str() {
        assert_eq!("d".parse::<SubtreeKind>().unwrap(), SubtreeKind::Edges);
        assert_eq!("n".parse::<SubtreeKind>().unwrap(), SubtreeKind::Nodes);
        assert_eq!("h".parse::<SubtreeKind>().unwrap(), SubtreeKind::Hamming);
        assert!("x".parse::<SubtreeKind>().is_err());
    }
}
