use super::tokens::encode_label;
use super::Tree;
use crate::libs::phylo::node::NodeId;

/// How edge tokens are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenStyle {
    /// Plain Newick, tokens omitted
    None,
    /// jplace edge numbers after the length: `A:0.1{3}`
    EdgeNum,
    /// Tokens suffixed to leaf labels: `A%%3:0.1`
    LeafLabel,
}

/// Read Newick trees from a file.
///
/// # Arguments
/// * `infile` - Path to the input file (or "stdin" for stdin).
pub fn from_file(infile: &str) -> anyhow::Result<Vec<Tree>> {
    let newick = crate::read_to_string(infile)?;
    Ok(Tree::from_newick_multi(newick.as_str())?)
}

/// Serialize tree to Newick string.
pub fn to_newick(tree: &Tree) -> String {
    write_tree(tree, TokenStyle::None)
}

/// Serialize tree in the jplace flavour, every edge followed by `{token}`.
pub fn to_newick_with_tokens(tree: &Tree) -> String {
    write_tree(tree, TokenStyle::EdgeNum)
}

/// Serialize tree with leaf labels written as `label%%token`.
pub fn to_newick_token_labels(tree: &Tree) -> String {
    write_tree(tree, TokenStyle::LeafLabel)
}

fn write_tree(tree: &Tree, style: TokenStyle) -> String {
    match tree.get_root() {
        Some(root) => {
            let mut s = String::new();
            to_newick_recursive(tree, root, style, &mut s);
            s.push(';');
            s
        }
        None => ";".to_string(),
    }
}

fn to_newick_recursive(tree: &Tree, node_id: NodeId, style: TokenStyle, out: &mut String) {
    let node = match tree.get_node(node_id) {
        Some(n) => n,
        None => return,
    };

    if !node.children.is_empty() {
        out.push('(');
        for (i, &child) in node.children.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            to_newick_recursive(tree, child, style, out);
        }
        out.push(')');
    }

    if let Some(name) = &node.name {
        match (style, node.token) {
            (TokenStyle::LeafLabel, Some(token)) if node.is_leaf() => {
                out.push_str(&quote_label(&encode_label(name, token)))
            }
            _ => out.push_str(&quote_label(name)),
        }
    }

    if let Some(len) = node.length {
        out.push_str(&format!(":{}", len));
    }

    if style == TokenStyle::EdgeNum {
        if let Some(token) = node.token {
            out.push_str(&format!("{{{}}}", token));
        }
    }
}

fn quote_label(label: &str) -> String {
    let needs_quote = label.chars().any(|c| "(),:;[]{} \t\n".contains(c));
    if needs_quote {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> Tree {
        let mut tree = Tree::new();
        //      Root
        //     /    \
        //    I1     C:0.3
        //   /  \
        //  A    B
        let root = tree.add_node();
        let i1 = tree.add_node();
        let c = tree.add_node();
        let a = tree.add_node();
        let b = tree.add_node();

        tree.set_root(root);
        tree.add_child(root, i1).unwrap();
        tree.add_child(root, c).unwrap();
        tree.add_child(i1, a).unwrap();
        tree.add_child(i1, b).unwrap();

        tree.get_node_mut(i1).unwrap().length = Some(0.5);
        tree.get_node_mut(c).unwrap().set_name("C");
        tree.get_node_mut(c).unwrap().length = Some(0.3);
        tree.get_node_mut(a).unwrap().set_name("A");
        tree.get_node_mut(a).unwrap().length = Some(0.1);
        tree.get_node_mut(b).unwrap().set_name("B");
        tree.get_node_mut(b).unwrap().length = Some(0.2);
        tree
    }

    #[test]
    fn test_to_newick() {
        let tree = small_tree();
        assert_eq!(to_newick(&tree), "((A:0.1,B:0.2):0.5,C:0.3);");
    }

    #[test]
    fn test_to_newick_with_tokens() {
        let mut tree = small_tree();
        tree.assign_tokens();
        assert_eq!(
            to_newick_with_tokens(&tree),
            "((A:0.1{0},B:0.2{1}):0.5{2},C:0.3{3}){4};"
        );
        assert_eq!(
            to_newick_token_labels(&tree),
            "((A%%0:0.1,B%%1:0.2):0.5,C%%3:0.3);"
        );
    }

    #[test]
    fn test_tokens_round_trip_through_parser() {
        let mut tree = small_tree();
        tree.assign_tokens();
        let text = to_newick_with_tokens(&tree);
        let parsed = Tree::from_newick(&text).unwrap();
        assert_eq!(to_newick_with_tokens(&parsed), text);
    }

    #[test]
    fn test_to_newick_special_chars() {
        let mut tree = Tree::new();
        let n0 = tree.add_node();
        tree.set_root(n0);
        tree.get_node_mut(n0).unwrap().set_name("Homo sapiens");
        assert_eq!(to_newick(&tree), "'Homo sapiens';");

        tree.get_node_mut(n0).unwrap().set_name("O'Brien (x)");
        assert_eq!(to_newick(&tree), "'O''Brien (x)';");
    }

    #[test]
    fn test_empty_tree() {
        assert_eq!(to_newick(&Tree::new()), ";");
    }
}
