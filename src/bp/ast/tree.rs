//! The parsed file
//!
//! A [`SyntaxTree`] is the ordered list of top-level nodes (definitions and standalone
//! comments) plus the [`CommentTable`] holding every comment attached to a node. Node
//! order is document order; the printer follows it.
//!
//! The tree must satisfy two invariants before it is handed to a caller:
//!
//! - every comment-table entry belongs to a node reachable from [`SyntaxTree::nodes`];
//! - every node has a source position.
//!
//! [`SyntaxTree::finalize`] enforces the first one, strictly or leniently.

use super::comment::{Comment, CommentTable};
use super::definition::{Assignment, Definition, Module};
use super::error::InvariantError;
use super::expression::{Expression, Map};
use super::node::NodeRef;
use super::node_id::NodeId;
use super::position::Position;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// A top-level item
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "node")]
pub enum Node {
    Definition(Definition),
    /// A comment (or blank-line marker) that belongs to no definition
    Comment(Comment),
}

impl Node {
    pub fn id(&self) -> NodeId {
        match self {
            Node::Definition(def) => def.id(),
            Node::Comment(comment) => comment.id,
        }
    }

    pub fn pos(&self) -> Position {
        match self {
            Node::Definition(def) => def.pos(),
            Node::Comment(comment) => comment.pos,
        }
    }

    pub fn as_ref(&self) -> NodeRef<'_> {
        match self {
            Node::Definition(def) => NodeRef::from(def),
            Node::Comment(comment) => NodeRef::Comment(comment),
        }
    }
}

/// What to do with comment-table entries whose node is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DanglingPolicy {
    /// Fail loudly; used by the parser
    #[default]
    Strict,
    /// Drop them; used for best-effort reformatting after edits
    Lenient,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyntaxTree {
    /// Name of the file the tree was parsed from
    pub name: String,
    pub nodes: Vec<Node>,
    pub comments: CommentTable,
    /// Comments and blank-line markers read from source but deliberately not printed
    pub ignored: Vec<Comment>,
}

impl SyntaxTree {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn add_definition(&mut self, def: Definition) {
        self.nodes.push(Node::Definition(def));
    }

    pub fn defs(&self) -> impl Iterator<Item = &Definition> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Definition(def) => Some(def),
            Node::Comment(_) => None,
        })
    }

    pub fn defs_mut(&mut self) -> impl Iterator<Item = &mut Definition> {
        self.nodes.iter_mut().filter_map(|node| match node {
            Node::Definition(def) => Some(def),
            Node::Comment(_) => None,
        })
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.defs().filter_map(Definition::as_module)
    }

    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.defs().filter_map(Definition::as_assignment)
    }

    /// The first module whose `name` property is `name`
    pub fn module_named(&self, name: &str) -> Option<&Module> {
        self.modules().find(|m| m.name() == Some(name))
    }

    pub fn module_named_mut(&mut self, name: &str) -> Option<&mut Module> {
        self.defs_mut()
            .filter_map(Definition::as_module_mut)
            .find(|m| m.name() == Some(name))
    }

    /// Identities of every node reachable from the top-level node list
    pub fn reachable_ids(&self) -> HashSet<NodeId> {
        let mut ids = HashSet::new();
        for node in &self.nodes {
            node.as_ref().walk(&mut |n| {
                ids.insert(n.id());
            });
        }
        ids
    }

    /// Number of source comments (not blank-line markers) held anywhere in the tree
    pub fn comment_count(&self) -> usize {
        let standalone = self.nodes.iter().filter_map(|node| match node {
            Node::Comment(c) => Some(c),
            Node::Definition(_) => None,
        });
        standalone
            .chain(self.comments.comments())
            .chain(self.ignored.iter())
            .filter(|c| !c.is_blank_line())
            .count()
    }

    pub fn confirm_no_dangling_comments(&self) -> Result<(), InvariantError> {
        let reachable = self.reachable_ids();
        for id in self.comments.ids() {
            if reachable.contains(&id) {
                continue;
            }
            let first = self.comments.get(id).and_then(|pair| pair.iter().next());
            return Err(InvariantError::DanglingComment {
                node: id,
                text: first.map(|c| c.text.clone()).unwrap_or_default(),
                pos: first.map(|c| c.pos).unwrap_or_default(),
            });
        }
        Ok(())
    }

    /// Drop comment-table entries whose node is no longer reachable; returns how many
    pub fn delete_dangling_comments(&mut self) -> usize {
        let reachable = self.reachable_ids();
        let removed = self.comments.retain(|id| reachable.contains(&id));
        if removed > 0 {
            debug!(tree = %self.name, removed, "deleted dangling comment entries");
        }
        removed
    }

    /// Enforce the comment invariant
    ///
    /// # Panics
    ///
    /// With [`DanglingPolicy::Strict`], panics if any comment is attached to an
    /// unreachable node.
    pub fn finalize(&mut self, policy: DanglingPolicy) {
        match policy {
            DanglingPolicy::Strict => {
                if let Err(err) = self.confirm_no_dangling_comments() {
                    panic!("internal error: {err}");
                }
            }
            DanglingPolicy::Lenient => {
                self.delete_dangling_comments();
            }
        }
    }

    pub fn confirm_all_nodes_have_positions(&self) -> Result<(), InvariantError> {
        let mut missing = None;
        for node in &self.nodes {
            node.as_ref().walk(&mut |n| {
                if missing.is_none() && !has_positions(n) {
                    missing = Some(InvariantError::MissingPosition {
                        kind: n.kind(),
                        node: n.id(),
                    });
                }
            });
        }
        missing.map_or(Ok(()), Err)
    }

    /// Give every unpositioned node the position of its nearest positioned ancestor
    pub fn cascade_positions(&mut self) {
        for def in self.defs_mut() {
            match def {
                Definition::Assignment(a) => {
                    if !a.equals_pos.is_valid() {
                        a.equals_pos = a.name_pos;
                    }
                    cascade_expression(&mut a.orig_value, a.name_pos);
                }
                Definition::Module(m) => cascade_map(&mut m.map, m.type_pos),
            }
        }
    }
}

fn has_positions(node: NodeRef<'_>) -> bool {
    match node {
        NodeRef::Assignment(a) => a.name_pos.is_valid() && a.equals_pos.is_valid(),
        NodeRef::Module(m) => m.type_pos.is_valid(),
        NodeRef::Map(m) => m.lbrace.is_valid() && m.rbrace.is_valid(),
        NodeRef::Property(p) => p.name_pos.is_valid() && p.colon_pos.is_valid(),
        NodeRef::Expression(e) => match e {
            Expression::List(l) => l.lbracket.is_valid() && l.rbracket.is_valid(),
            Expression::Map(m) => m.lbrace.is_valid() && m.rbrace.is_valid(),
            Expression::Operator(o) => o.operator_pos.is_valid(),
            other => other.pos().is_valid(),
        },
        NodeRef::Comment(c) => c.pos.is_valid(),
    }
}

fn fill(pos: &mut Position, parent: Position) {
    if !pos.is_valid() {
        *pos = parent;
    }
}

fn cascade_map(map: &mut Map, parent: Position) {
    fill(&mut map.lbrace, parent);
    fill(&mut map.rbrace, map.lbrace);
    let here = map.lbrace;
    for property in &mut map.properties {
        fill(&mut property.name_pos, here);
        fill(&mut property.colon_pos, property.name_pos);
        cascade_expression(&mut property.value, property.name_pos);
    }
}

fn cascade_expression(expr: &mut Expression, parent: Position) {
    if let Expression::Map(map) = expr {
        cascade_map(map, parent);
        return;
    }
    for pos in expr.own_positions_mut() {
        fill(pos, parent);
    }
    match expr {
        Expression::List(list) => {
            let here = list.lbracket;
            for value in &mut list.values {
                cascade_expression(value, here);
            }
        }
        Expression::Operator(op) => {
            let here = op.operator_pos;
            for arg in op.args.iter_mut() {
                cascade_expression(arg, here);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bp::ast::Property;

    fn pos(line: usize) -> Position {
        Position::new(line * 10, line, 1)
    }

    fn module_with_srcs(values: Vec<Expression>) -> Definition {
        Definition::Module(Module::new(
            "cc_library",
            pos(1),
            Map::new(
                vec![
                    Property::new("name", pos(2), Expression::string("libfoo", pos(2))),
                    Property::new("srcs", pos(3), Expression::list(values, pos(3), pos(5))),
                ],
                pos(1),
                pos(6),
            ),
        ))
    }

    #[test]
    fn test_module_named() {
        let mut tree = SyntaxTree::new("Android.bp");
        tree.add_definition(module_with_srcs(vec![]));
        assert!(tree.module_named("libfoo").is_some());
        assert!(tree.module_named("libbar").is_none());
        assert_eq!(tree.modules().count(), 1);
        assert_eq!(tree.assignments().count(), 0);
    }

    #[test]
    fn test_dangling_comment_detected() {
        let mut tree = SyntaxTree::new("Android.bp");
        tree.add_definition(module_with_srcs(vec![Expression::string("a.c", pos(4))]));

        fn srcs(tree: &mut SyntaxTree) -> &mut Expression {
            let Some(Node::Definition(Definition::Module(module))) = tree.nodes.first_mut() else {
                panic!("expected a module");
            };
            &mut module.map.properties[1].value
        }
        let element_id = srcs(&mut tree).as_list().unwrap().values[0].id();
        tree.comments
            .get_comments(element_id)
            .post
            .push(Comment::line("// keep", pos(4)));
        assert!(tree.confirm_no_dangling_comments().is_ok());

        // Drop the element without moving its comment.
        srcs(&mut tree).as_list_mut().unwrap().values.clear();
        let err = tree.confirm_no_dangling_comments().unwrap_err();
        assert!(matches!(err, InvariantError::DanglingComment { node, .. } if node == element_id));
    }

    #[test]
    #[should_panic(expected = "not reachable from the tree")]
    fn test_strict_finalize_panics_on_dangling() {
        let mut tree = SyntaxTree::new("Android.bp");
        tree.comments
            .get_comments(NodeId::fresh())
            .pre
            .push(Comment::line("// orphan", pos(1)));
        tree.finalize(DanglingPolicy::Strict);
    }

    #[test]
    fn test_lenient_finalize_deletes_dangling() {
        let mut tree = SyntaxTree::new("Android.bp");
        tree.comments
            .get_comments(NodeId::fresh())
            .pre
            .push(Comment::line("// orphan", pos(1)));
        tree.finalize(DanglingPolicy::Lenient);
        assert!(tree.comments.is_empty());
    }

    #[test]
    fn test_cascade_positions() {
        let mut tree = SyntaxTree::new("Android.bp");
        tree.add_definition(module_with_srcs(vec![Expression::string(
            "new.c",
            Position::default(),
        )]));
        let err = tree.confirm_all_nodes_have_positions().unwrap_err();
        assert!(matches!(err, InvariantError::MissingPosition { kind: "String", .. }));

        tree.cascade_positions();
        assert!(tree.confirm_all_nodes_have_positions().is_ok());
        let srcs = &tree.modules().next().unwrap().map.properties[1].value;
        assert_eq!(srcs.as_list().unwrap().values[0].pos(), pos(3));
    }
}
