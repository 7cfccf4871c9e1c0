use super::error::PlaceError;
use crate::libs::phylo::{NodeId, Tree, TreeError};
use std::collections::BTreeMap;

/// The reference tree every query is finally placed on.
///
/// Built once: leaf labels are checked, a bifurcating root is removed and
/// every edge gets its token. Read-only afterwards.
#[derive(Debug, Clone)]
pub struct Backbone {
    tree: Tree,
    leaf_map: BTreeMap<String, NodeId>,
}

impl Backbone {
    pub fn new(mut tree: Tree) -> Result<Self, PlaceError> {
        tree.check_leaf_labels()?;
        if tree.get_leaves().len() < 3 {
            return Err(PlaceError::Tree(TreeError::LogicError(
                "The backbone tree needs at least three leaves".to_string(),
            )));
        }

        if tree.is_rooted() {
            tree.deroot().map_err(TreeError::from)?;
            tree.compact();
        }
        let count = tree.assign_tokens();
        tracing::debug!("backbone: {} leaves, {} edge tokens", tree.get_leaves().len(), count);

        let leaf_map = tree.get_leaf_map();
        Ok(Self { tree, leaf_map })
    }

    /// Read the first tree of a Newick file.
    pub fn from_file(infile: &str) -> anyhow::Result<Self> {
        let mut trees = Tree::from_file(infile)?;
        if trees.is_empty() {
            anyhow::bail!("No tree found in {}", infile);
        }
        if trees.len() > 1 {
            tracing::warn!("{} holds {} trees, using the first", infile, trees.len());
        }
        Ok(Self::new(trees.swap_remove(0))?)
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn leaf_map(&self) -> &BTreeMap<String, NodeId> {
        &self.leaf_map
    }

    pub fn leaf(&self, label: &str) -> Option<NodeId> {
        self.leaf_map.get(label).copied()
    }

    /// The tree as written in the `tree` field of jplace output.
    pub fn jplace_tree(&self) -> String {
        self.tree.to_newick_with_tokens()
    }
}
