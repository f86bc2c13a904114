//! Structural comparison of syntax trees
//!
//! Two trees are equal when they have the same nodes in the same order, with the same
//! kinds, names and literal values, and the same comment texts attached at the same
//! places. Node identities and source positions are ignored, so a parsed tree compares
//! equal to a hand-built one and to a reparse of its own printed output.
//!
//! Differences come back as a list with a path to each, e.g.
//! `nodes[1].map.srcs.value[2]: "b.c" != "c.c"`.

use crate::bp::ast::{CommentTable, Definition, Expression, Map, Node, NodeId, NodeRef, SyntaxTree};
use std::collections::HashSet;
use std::fmt;

/// One structural mismatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    pub path: String,
    pub detail: String,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.detail)
    }
}

struct Comparer<'t> {
    left: &'t CommentTable,
    right: &'t CommentTable,
    differences: Vec<Difference>,
}

impl Comparer<'_> {
    fn differ(&mut self, path: &str, detail: String) {
        self.differences.push(Difference {
            path: path.to_string(),
            detail,
        });
    }

    fn comments(&mut self, path: &str, left: NodeId, right: NodeId) {
        let texts = |table: &CommentTable, id: NodeId| -> (Vec<String>, Vec<String>) {
            let render = |c: &crate::bp::ast::Comment| {
                if c.is_blank_line() {
                    "<blank>".to_string()
                } else {
                    c.text.clone()
                }
            };
            (
                table.pre(id).iter().map(render).collect(),
                table.post(id).iter().map(render).collect(),
            )
        };
        let (left_pre, left_post) = texts(self.left, left);
        let (right_pre, right_post) = texts(self.right, right);
        if left_pre != right_pre {
            self.differ(path, format!("pre-comments {left_pre:?} != {right_pre:?}"));
        }
        if left_post != right_post {
            self.differ(path, format!("post-comments {left_post:?} != {right_post:?}"));
        }
    }

    fn definition(&mut self, path: &str, left: &Definition, right: &Definition) {
        self.comments(path, left.id(), right.id());
        match (left, right) {
            (Definition::Assignment(a), Definition::Assignment(b)) => {
                if a.name != b.name || a.assigner != b.assigner {
                    self.differ(
                        path,
                        format!("{} {} != {} {}", a.name, a.assigner, b.name, b.assigner),
                    );
                }
                self.expression(&format!("{path}.{}", a.name), &a.orig_value, &b.orig_value);
            }
            (Definition::Module(a), Definition::Module(b)) => {
                if a.type_name != b.type_name {
                    self.differ(path, format!("module {} != {}", a.type_name, b.type_name));
                }
                self.map(&format!("{path}.map"), &a.map, &b.map);
            }
            _ => self.differ(
                path,
                format!(
                    "{} != {}",
                    NodeRef::from(left).kind(),
                    NodeRef::from(right).kind()
                ),
            ),
        }
    }

    fn map(&mut self, path: &str, left: &Map, right: &Map) {
        self.comments(path, left.id, right.id);
        if left.properties.len() != right.properties.len() {
            let names = |m: &Map| m.properties.iter().map(|p| p.name.clone()).collect::<Vec<_>>();
            self.differ(
                path,
                format!("properties {:?} != {:?}", names(left), names(right)),
            );
            return;
        }
        for (a, b) in left.properties.iter().zip(&right.properties) {
            let property_path = format!("{path}.{}", a.name);
            if a.name != b.name {
                self.differ(&property_path, format!("name {} != {}", a.name, b.name));
            }
            self.comments(&property_path, a.id, b.id);
            self.expression(&format!("{property_path}.value"), &a.value, &b.value);
        }
    }

    fn expression(&mut self, path: &str, left: &Expression, right: &Expression) {
        if !matches!(left, Expression::Map(_)) {
            self.comments(path, left.id(), right.id());
        }
        match (left, right) {
            (Expression::Bool(a), Expression::Bool(b)) if a.value != b.value => {
                self.differ(path, format!("{} != {}", a.value, b.value));
            }
            (Expression::String(a), Expression::String(b)) if a.value != b.value => {
                self.differ(path, format!("{:?} != {:?}", a.value, b.value));
            }
            (Expression::Int64(a), Expression::Int64(b)) if a.value != b.value => {
                self.differ(path, format!("{} != {}", a.value, b.value));
            }
            (Expression::Variable(a), Expression::Variable(b)) if a.name != b.name => {
                self.differ(path, format!("variable {} != {}", a.name, b.name));
            }
            (Expression::List(a), Expression::List(b)) => {
                if a.values.len() != b.values.len() {
                    self.differ(
                        path,
                        format!("{} elements != {}", a.values.len(), b.values.len()),
                    );
                    return;
                }
                for (i, (x, y)) in a.values.iter().zip(&b.values).enumerate() {
                    self.expression(&format!("{path}[{i}]"), x, y);
                }
            }
            (Expression::Map(a), Expression::Map(b)) => self.map(path, a, b),
            (Expression::Operator(a), Expression::Operator(b)) => {
                if a.operator != b.operator {
                    self.differ(path, format!("operator {} != {}", a.operator, b.operator));
                }
                self.expression(&format!("{path}.0"), &a.args[0], &b.args[0]);
                self.expression(&format!("{path}.1"), &a.args[1], &b.args[1]);
            }
            (a, b) if std::mem::discriminant(a) != std::mem::discriminant(b) => {
                self.differ(
                    path,
                    format!(
                        "{} != {}",
                        NodeRef::Expression(a).kind(),
                        NodeRef::Expression(b).kind()
                    ),
                );
            }
            _ => {}
        }
    }
}

/// Every structural difference between two trees
pub fn compare_trees(left: &SyntaxTree, right: &SyntaxTree) -> Vec<Difference> {
    let mut comparer = Comparer {
        left: &left.comments,
        right: &right.comments,
        differences: Vec::new(),
    };
    if left.nodes.len() != right.nodes.len() {
        comparer.differ(
            "nodes",
            format!("{} nodes != {}", left.nodes.len(), right.nodes.len()),
        );
    }
    for (i, (a, b)) in left.nodes.iter().zip(&right.nodes).enumerate() {
        let path = format!("nodes[{i}]");
        match (a, b) {
            (Node::Definition(a), Node::Definition(b)) => comparer.definition(&path, a, b),
            (Node::Comment(a), Node::Comment(b)) => {
                if a.kind != b.kind || a.text != b.text {
                    comparer.differ(&path, format!("comment {:?} != {:?}", a.text, b.text));
                }
            }
            (a, b) => comparer.differ(
                &path,
                format!("{} != {}", a.as_ref().kind(), b.as_ref().kind()),
            ),
        }
    }
    comparer.differences
}

/// Assert that two trees are structurally equal
///
/// # Panics
///
/// Panics listing every difference.
pub fn assert_trees_eq(left: &SyntaxTree, right: &SyntaxTree) {
    let differences = compare_trees(left, right);
    if !differences.is_empty() {
        let report: Vec<String> = differences.iter().map(ToString::to_string).collect();
        panic!(
            "\n\nTrees differ ({} differences):\n{}\n",
            differences.len(),
            report.join("\n")
        );
    }
}

/// Identities reachable more than once from the tree's nodes
///
/// A non-empty result means two parent slots share one node, so the comment table
/// cannot tell which of them a comment belongs to.
pub fn duplicate_ids(tree: &SyntaxTree) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for node in &tree.nodes {
        node.as_ref().walk(&mut |n| {
            if !seen.insert(n.id()) {
                duplicates.push(n.id());
            }
        });
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bp::testing::factories::{list, module, parse_ok, property, string, tree};

    #[test]
    fn test_formatting_does_not_matter() {
        let a = parse_ok("foo { name: \"x\", srcs: [\"a\", \"b\"] }");
        let b = parse_ok("foo {\n    name: \"x\",\n    srcs: [\n        \"a\",\n        \"b\",\n    ],\n}\n");
        assert_trees_eq(&a, &b);
    }

    #[test]
    fn test_value_difference_has_path() {
        let a = parse_ok("foo { srcs: [\"a\", \"b\"] }");
        let b = parse_ok("foo { srcs: [\"a\", \"c\"] }");
        let differences = compare_trees(&a, &b);
        assert_eq!(differences.len(), 1);
        assert_eq!(
            differences[0].to_string(),
            "nodes[0].map.srcs.value[1]: \"b\" != \"c\""
        );
    }

    #[test]
    fn test_comment_difference() {
        let a = parse_ok("// one\nfoo {}\n");
        let b = parse_ok("// two\nfoo {}\n");
        let differences = compare_trees(&a, &b);
        assert_eq!(differences.len(), 1);
        assert!(differences[0].detail.starts_with("pre-comments"));
    }

    #[test]
    fn test_hand_built_tree_matches_parsed() {
        let built = tree(vec![module(
            "cc_library",
            vec![
                property("name", string("libfoo")),
                property("srcs", list(vec![string("a.c")])),
            ],
        )]);
        let parsed = parse_ok("cc_library {\n    name: \"libfoo\",\n    srcs: [\"a.c\"],\n}\n");
        assert_trees_eq(&built, &parsed);
    }

    #[test]
    fn test_duplicate_ids() {
        let parsed = parse_ok("foo { srcs: [\"a\"] }");
        assert!(duplicate_ids(&parsed).is_empty());

        let mut aliased = parsed.clone();
        if let Node::Definition(Definition::Module(m)) = &mut aliased.nodes[0] {
            let shared = m.map.properties[0].clone();
            m.map.properties.push(shared);
        }
        assert!(!duplicate_ids(&aliased).is_empty());
    }
}
