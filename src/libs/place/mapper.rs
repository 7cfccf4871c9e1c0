//! Translate a placement on a subtree back onto the backbone.
//!
//! The engine numbers the edges of the subtree on its own. A placement on
//! local edge `e` at `distal` sits between two taxa that exist in both trees:
//! the nearest leaf on the parent side of `e` and the nearest leaf on the
//! child side. Walking the backbone path between those two taxa by the same
//! distance gives the backbone edge and offset.

use super::backbone::Backbone;
use super::error::PlaceError;
use super::frontier::Frontier;
use super::jplace::PlacementRecord;
use crate::libs::phylo::tree::tokens::split_label;
use crate::libs::phylo::{NodeId, Tree};
use std::collections::{BTreeMap, HashMap, HashSet};

/// The engine's copy of the subtree, with its own `{n}` edge numbers.
#[derive(Debug, Clone)]
pub struct EngineTree {
    tree: Tree,
    edges: BTreeMap<usize, NodeId>,
}

impl EngineTree {
    /// Parse the `tree` field of an engine jplace document.
    pub fn parse(newick: &str) -> Result<Self, PlaceError> {
        let tree = Tree::from_newick(newick)?;
        let edges = tree
            .find_nodes(|n| n.token.is_some())
            .into_iter()
            .filter_map(|id| tree.get_node(id).and_then(|n| n.token).map(|t| (t, id)))
            .collect();
        Ok(Self { tree, edges })
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn edge(&self, edge_num: usize) -> Option<NodeId> {
        self.edges.get(&edge_num).copied()
    }
}

/// Nearest leaf reachable from `start` without stepping onto `blocked`.
///
/// Returns the leaf and the path length to it. `start` itself is returned
/// when it is a leaf.
pub fn nearest_leaf(tree: &Tree, start: NodeId, blocked: NodeId) -> Option<(NodeId, f64)> {
    let mut visited = HashSet::new();
    visited.insert(blocked);
    let mut frontier = Frontier::new();
    frontier.push(0.0, start);

    while let Some((dist, id)) = frontier.pop() {
        if !visited.insert(id) {
            continue;
        }
        let node = tree.get_node(id)?;
        if node.is_leaf() {
            return Some((id, dist));
        }
        for next in tree.neighbors(id) {
            if !visited.contains(&next) {
                frontier.push(dist + tree.edge_between(id, next).unwrap_or(0.0), next);
            }
        }
    }

    None
}

/// Maps placements from one engine tree onto the backbone.
pub struct Mapper<'a> {
    backbone: &'a Backbone,
    local: &'a EngineTree,
    // Leaves resolved so far, keyed by engine node
    resolved: HashMap<NodeId, NodeId>,
}

impl<'a> Mapper<'a> {
    pub fn new(backbone: &'a Backbone, local: &'a EngineTree) -> Self {
        Self {
            backbone,
            local,
            resolved: HashMap::new(),
        }
    }

    /// Backbone leaf carrying the label of the engine leaf `id`.
    fn resolve(&mut self, id: NodeId) -> Result<NodeId, PlaceError> {
        if let Some(&leaf) = self.resolved.get(&id) {
            return Ok(leaf);
        }

        let local = self.local;
        let backbone = self.backbone;
        let label = local
            .tree()
            .get_node(id)
            .and_then(|n| n.name.as_deref())
            .unwrap_or("");
        let (taxon, token) = split_label(label)?;
        let leaf = backbone
            .leaf(taxon)
            .ok_or_else(|| PlaceError::UnknownLeaf(taxon.to_string()))?;

        if let Some(found) = token {
            let expected = backbone.tree().get_node(leaf).and_then(|n| n.token);
            if expected != Some(found) {
                return Err(PlaceError::TokenMismatch {
                    label: taxon.to_string(),
                    found,
                    expected,
                });
            }
        }

        self.resolved.insert(id, leaf);
        Ok(leaf)
    }

    /// The same placement expressed on the backbone. Only `edge_num` and
    /// `distal_length` change.
    pub fn map(&mut self, record: &PlacementRecord) -> Result<PlacementRecord, PlaceError> {
        let local = self.local;
        let tree = local.tree();
        let right = local.edge(record.edge_num).ok_or_else(|| {
            PlaceError::Malformed(format!("edge {} not in the placement tree", record.edge_num))
        })?;
        let left = tree.get_node(right).and_then(|n| n.parent).ok_or_else(|| {
            PlaceError::Malformed(format!("edge {} has no parent node", record.edge_num))
        })?;

        let (left_leaf, left_dist) = nearest_leaf(tree, left, right).ok_or_else(|| {
            PlaceError::Malformed(format!("no leaf above edge {}", record.edge_num))
        })?;
        let (right_leaf, _) = nearest_leaf(tree, right, left).ok_or_else(|| {
            PlaceError::Malformed(format!("no leaf below edge {}", record.edge_num))
        })?;

        let from = self.resolve(left_leaf)?;
        let to = self.resolve(right_leaf)?;
        if from == to {
            return Err(PlaceError::Malformed(format!(
                "edge {} joins a taxon to itself",
                record.edge_num
            )));
        }

        let bb = self.backbone.tree();
        let path = bb.get_path_edges(&from, &to)?;
        let (target, distal) = walk(bb, &path, left_dist + record.distal_length)?;
        let edge_num = bb.get_node(target).and_then(|n| n.token).ok_or_else(|| {
            PlaceError::Other(format!("backbone node {} carries no edge token", target))
        })?;

        Ok(PlacementRecord {
            edge_num,
            distal_length: distal,
            ..*record
        })
    }
}

// Walk `path` until `running` is used up. Returns the edge and the distal
// offset on it, clamped to the edge length.
fn walk(tree: &Tree, path: &[NodeId], mut running: f64) -> Result<(NodeId, f64), PlaceError> {
    let length = |id: NodeId| tree.get_node(id).map(|n| n.edge_length()).unwrap_or(0.0);

    let last = *path
        .last()
        .ok_or_else(|| PlaceError::Other("empty backbone path".to_string()))?;

    for &edge in path {
        let len = length(edge);
        running -= len;
        if running < 0.0 {
            return Ok((edge, (len + running).clamp(0.0, len)));
        }
    }

    // Rounding or a pendant-heavy engine tree can overshoot the path
    let len = length(last);
    Ok((last, (len + running).clamp(0.0, len)))
}

/// Map every row of `records` with a fresh [`Mapper`].
pub fn map_placements(
    backbone: &Backbone,
    local: &EngineTree,
    records: &[PlacementRecord],
) -> Result<Vec<PlacementRecord>, PlaceError> {
    let mut mapper = Mapper::new(backbone, local);
    records.iter().map(|r| mapper.map(r)).collect()
}
