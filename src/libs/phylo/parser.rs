//! Newick reader.
//!
//! Besides plain Newick it accepts the jplace flavour, where every edge is
//! followed by its number in braces: `(A:0.1{0},B:0.2{1}){2};`. Bracketed
//! comments are skipped.

use super::error::TreeError;
use super::node::NodeId;
use super::tree::Tree;
use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while},
    character::complete::{char, digit1, multispace0},
    combinator::{cut, map, map_res, opt, recognize},
    error::{context, ContextError, ErrorKind, FromExternalError, ParseError},
    multi::{many0, many1, separated_list1},
    sequence::{delimited, preceded, terminated},
    IResult, Offset, Parser,
};

/// Where parsing stopped, and the grammar rules it was inside.
#[derive(Debug)]
struct Trail<'a> {
    at: &'a str,
    kind: ErrorKind,
    rules: Vec<&'static str>,
}

impl<'a> ParseError<&'a str> for Trail<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        Trail {
            at: input,
            kind,
            rules: vec![],
        }
    }

    fn append(_: &'a str, _: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<'a> ContextError<&'a str> for Trail<'a> {
    fn add_context(_: &'a str, rule: &'static str, mut other: Self) -> Self {
        other.rules.push(rule);
        other
    }
}

impl<'a, E> FromExternalError<&'a str, E> for Trail<'a> {
    fn from_external_error(input: &'a str, kind: ErrorKind, _: E) -> Self {
        Self::from_error_kind(input, kind)
    }
}

type Res<'a, T> = IResult<&'a str, T, Trail<'a>>;

// Nested form of one clade, flattened into the arena once parsed
struct Clade {
    name: Option<String>,
    length: Option<f64>,
    edge_num: Option<usize>,
    children: Vec<Clade>,
}

impl Clade {
    fn into_arena(self, tree: &mut Tree) -> Result<NodeId, TreeError> {
        let id = tree.add_node();
        for child in self.children {
            let child_id = child.into_arena(tree)?;
            tree.add_child(id, child_id)?;
        }
        if let Some(node) = tree.get_node_mut(id) {
            node.name = self.name;
            node.length = self.length;
            node.token = self.edge_num;
        }
        Ok(id)
    }

    fn into_tree(self) -> Result<Tree, TreeError> {
        let mut tree = Tree::new();
        let root = self.into_arena(&mut tree)?;
        tree.set_root(root);
        Ok(tree)
    }
}

fn ws<'a, F, O>(inner: F) -> impl Parser<&'a str, Output = O, Error = Trail<'a>>
where
    F: Parser<&'a str, Output = O, Error = Trail<'a>>,
{
    delimited(multispace0, inner, multispace0)
}

// `[...]`, content ignored
fn comment(input: &str) -> Res<'_, ()> {
    map(
        ws(delimited(char('['), take_while(|c| c != ']'), char(']'))),
        |_| (),
    )
    .parse(input)
}

// Unquoted labels end at a reserved character. Quoted ones use '' or ""
// to escape the quote.
fn label(input: &str) -> Res<'_, String> {
    let quoted = |q: char| {
        delimited(
            char(q),
            map(is_not(if q == '\'' { "'" } else { "\"" }), move |s: &str| {
                s.replace(&format!("{q}{q}"), &q.to_string())
            }),
            char(q),
        )
    };
    let bare = map(take_while(|c: char| !"():;,[]{}".contains(c)), |s: &str| {
        s.trim().to_string()
    });

    context("label", alt((quoted('\''), quoted('"'), bare))).parse(input)
}

fn length(input: &str) -> Res<'_, f64> {
    let number = recognize((
        opt(char('-')),
        digit1,
        opt((char('.'), digit1)),
        opt((alt((char('e'), char('E'))), opt(alt((char('+'), char('-')))), digit1)),
    ));

    context(
        "length",
        preceded(ws(char(':')), cut(map_res(number, |s: &str| s.parse::<f64>()))),
    )
    .parse(input)
}

fn edge_num(input: &str) -> Res<'_, usize> {
    context(
        "edge number",
        preceded(
            ws(char('{')),
            cut(terminated(
                map_res(digit1, |s: &str| s.parse::<usize>()),
                ws(char('}')),
            )),
        ),
    )
    .parse(input)
}

// (children)label[comment]:length{edge}[comment]
fn clade(input: &str) -> Res<'_, Clade> {
    let (input, children) = context(
        "children",
        opt(delimited(
            ws(char('(')),
            separated_list1(ws(char(',')), clade),
            ws(char(')')),
        )),
    )
    .parse(input)?;

    let (input, name) = opt(label).parse(input)?;
    let (input, _) = many0(comment).parse(input)?;
    let (input, length) = opt(length).parse(input)?;
    let (input, edge_num) = opt(edge_num).parse(input)?;
    let (input, _) = many0(comment).parse(input)?;

    Ok((
        input,
        Clade {
            name: name.filter(|s| !s.is_empty()),
            length,
            edge_num,
            children: children.unwrap_or_default(),
        },
    ))
}

fn whole_tree(input: &str) -> Res<'_, Clade> {
    terminated(ws(clade), ws(char(';'))).parse(input)
}

fn to_tree_error(input: &str, err: nom::Err<Trail<'_>>) -> TreeError {
    let trail = match err {
        nom::Err::Error(t) | nom::Err::Failure(t) => t,
        nom::Err::Incomplete(_) => {
            return TreeError::ParseError {
                message: "Incomplete input".to_string(),
                line: 0,
                column: 0,
                snippet: String::new(),
            }
        }
    };

    let offset = input.offset(trail.at);
    let before = &input[..offset];
    let line = before.matches('\n').count() + 1;
    let column = offset - before.rfind('\n').map_or(0, |p| p + 1) + 1;

    let message = if trail.rules.is_empty() {
        format!("unexpected input ({:?})", trail.kind)
    } else {
        format!("invalid {} ({:?})", trail.rules.join(" in "), trail.kind)
    };

    TreeError::ParseError {
        message,
        line,
        column,
        snippet: trail.at.chars().take(50).collect(),
    }
}

/// Parse one tree terminated by `;`.
pub fn parse_newick(input: &str) -> Result<Tree, TreeError> {
    match whole_tree(input) {
        Ok((_, root)) => root.into_tree(),
        Err(e) => Err(to_tree_error(input, e)),
    }
}

/// Parse every tree of `input`. Bracketed blocks between trees are skipped.
pub fn parse_newick_multi(input: &str) -> Result<Vec<Tree>, TreeError> {
    let item = alt((map(whole_tree, Some), map(comment, |_| None)));

    match many1(item).parse(input) {
        Ok((_, items)) => items.into_iter().flatten().map(Clade::into_tree).collect(),
        Err(e) => Err(to_tree_error(input, e)),
    }
}

impl Tree {
    /// Parse a Newick string into a Tree.
    ///
    /// ```
    /// use subplace::libs::phylo::tree::Tree;
    ///
    /// let tree = Tree::from_newick("(A:0.1{0},B:0.2{1}){2};").unwrap();
    /// assert_eq!(tree.len(), 3);
    ///
    /// assert!(Tree::from_newick("(A,B:invalid)C;").is_err());
    /// ```
    pub fn from_newick(input: &str) -> Result<Self, TreeError> {
        parse_newick(input)
    }

    pub fn from_newick_multi(input: &str) -> Result<Vec<Self>, TreeError> {
        parse_newick_multi(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_of(tree: &Tree) -> &crate::libs::phylo::Node {
        tree.get_node(tree.get_root().unwrap()).unwrap()
    }

    #[test]
    fn test_parse_labels_and_lengths() {
        let tree = Tree::from_newick("(A:0.1, B:0.2e-1)Root:100;").unwrap();
        assert_eq!(tree.len(), 3);

        let root = root_of(&tree);
        assert_eq!(root.name.as_deref(), Some("Root"));
        assert_eq!(root.length, Some(100.0));

        let b = tree.get_node(root.children[1]).unwrap();
        assert_eq!(b.name.as_deref(), Some("B"));
        assert_eq!(b.length, Some(0.02));
    }

    #[test]
    fn test_parse_jplace_tree() {
        let tree =
            Tree::from_newick("((A%%0:0.1{0},B%%1:0.2{1}):0.3{2},C%%3:0.4{3}){4};").unwrap();
        assert_eq!(tree.len(), 5);

        let root = root_of(&tree);
        assert_eq!(root.token, Some(4));
        assert_eq!(root.length, None);

        let inner = tree.get_node(root.children[0]).unwrap();
        assert_eq!(inner.name, None);
        assert_eq!(inner.token, Some(2));
        assert_eq!(inner.length, Some(0.3));

        let a = tree.get_node(inner.children[0]).unwrap();
        assert_eq!(a.name.as_deref(), Some("A%%0"));
        assert_eq!(a.token, Some(0));

        // Edge number without a length
        let tree = Tree::from_newick("(A{0},B{1}){2};").unwrap();
        let b = tree.get_node(root_of(&tree).children[1]).unwrap();
        assert_eq!(b.name.as_deref(), Some("B"));
        assert_eq!(b.token, Some(1));
    }

    #[test]
    fn test_parse_comments_and_whitespace() {
        let input = "
        (
            A : 0.1 [bootstrap=90],
            'Homo sapiens' : 0.2
        ) Root [&&NHX:S=primates] ;
        ";
        let tree = Tree::from_newick(input).unwrap();
        assert_eq!(tree.len(), 3);

        let root = root_of(&tree);
        assert_eq!(root.name.as_deref(), Some("Root"));

        let a = tree.get_node(root.children[0]).unwrap();
        assert_eq!(a.length, Some(0.1));
        let hs = tree.get_node(root.children[1]).unwrap();
        assert_eq!(hs.name.as_deref(), Some("Homo sapiens"));
    }

    #[test]
    fn test_parse_multi() {
        let trees = Tree::from_newick_multi("[header](A,B);\n(C,(D,E));").unwrap();
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[1].get_leaves().len(), 3);
    }

    #[test]
    fn test_parse_errors() {
        match Tree::from_newick("(A,B)C") {
            Err(TreeError::ParseError { line, column, .. }) => {
                assert_eq!(line, 1);
                assert_eq!(column, 7);
            }
            res => panic!("Expected ParseError, got {:?}", res),
        }

        match Tree::from_newick("(A,B:invalid)C;") {
            Err(TreeError::ParseError { message, .. }) => assert!(message.contains("length")),
            res => panic!("Expected ParseError, got {:?}", res),
        }

        match Tree::from_newick("(A:0.1,\nB:0.2{x});") {
            Err(TreeError::ParseError { message, line, .. }) => {
                assert!(message.contains("edge number"));
                assert_eq!(line, 2);
            }
            res => panic!("Expected ParseError, got {:?}", res),
        }
    }
}
