//! Edge tokens.
//!
//! Every node of a backbone tree gets a unique integer naming the edge to its
//! parent. Tokens travel through extracted subtrees in two forms:
//!
//! * inside leaf labels, as `label%%token`, which survives any tool that
//!   renumbers edges (the placement engine does);
//! * as jplace edge numbers, `label:length{token}`, in the placement output.

use super::Tree;
use crate::libs::phylo::error::TreeError;

/// Reserved separator between a taxon label and its token.
pub const SEPARATOR: &str = "%%";

/// Number all nodes in post-order, starting at 0. Returns the number of
/// tokens handed out.
pub fn assign_tokens(tree: &mut Tree) -> usize {
    let root = match tree.get_root() {
        Some(r) => r,
        None => return 0,
    };

    let order = super::traversal::postorder(tree, root);
    for (token, &id) in order.iter().enumerate() {
        if let Some(node) = tree.get_node_mut(id) {
            node.token = Some(token);
        }
    }
    order.len()
}

/// `label%%token`
pub fn encode_label(label: &str, token: usize) -> String {
    format!("{}{}{}", label, SEPARATOR, token)
}

/// Split `label%%token` at the first separator.
/// A label without separator comes back unchanged with no token.
///
/// ```
/// use subplace::libs::phylo::tree::tokens::split_label;
/// assert_eq!(split_label("Human%%12").unwrap(), ("Human", Some(12)));
/// assert_eq!(split_label("Human").unwrap(), ("Human", None));
/// assert!(split_label("Human%%x").is_err());
/// ```
pub fn split_label(label: &str) -> Result<(&str, Option<usize>), TreeError> {
    match label.split_once(SEPARATOR) {
        Some((taxon, token)) => {
            let token = token.parse::<usize>().map_err(|_| {
                TreeError::LabelError(format!("Invalid edge token in label '{}'", label))
            })?;
            Ok((taxon, Some(token)))
        }
        None => Ok((label, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_assign_tokens_unique() {
        let mut tree = Tree::from_newick("((A,B),(C,(D,E)),F);").unwrap();
        let count = tree.assign_tokens();
        assert_eq!(count, tree.len());

        let tokens: BTreeSet<usize> = tree
            .find_nodes(|_| true)
            .into_iter()
            .filter_map(|id| tree.get_node(id).and_then(|n| n.token))
            .collect();
        assert_eq!(tokens.len(), tree.len());
        assert_eq!(*tokens.iter().max().unwrap(), count - 1);

        // Post-order: first leaf is 0, root is last
        let root = tree.get_root().unwrap();
        assert_eq!(tree.get_node(root).unwrap().token, Some(count - 1));
        let a = tree.get_node_by_name("A").unwrap();
        assert_eq!(tree.get_node(a).unwrap().token, Some(0));
    }

    #[test]
    fn test_assign_tokens_deterministic() {
        let newick = "((A:1,B:2):0.5,(C:1,D:1):0.5,E:3);";
        let mut t1 = Tree::from_newick(newick).unwrap();
        let mut t2 = Tree::from_newick(newick).unwrap();
        t1.assign_tokens();
        t2.assign_tokens();
        assert_eq!(t1.to_newick_with_tokens(), t2.to_newick_with_tokens());
    }

    #[test]
    fn test_label_round_trip() {
        let encoded = encode_label("Homo_sapiens", 42);
        assert_eq!(encoded, "Homo_sapiens%%42");
        assert_eq!(split_label(&encoded).unwrap(), ("Homo_sapiens", Some(42)));

        // Only the first separator splits
        assert!(split_label("a%%1%%2").is_err());
    }
}
