//! Uniform, borrowed view over every node kind
//!
//! [`NodeRef`] lets tree-wide passes (reachability, comment pulling, position checks,
//! debug renderers) walk definitions, maps, properties and expressions with one
//! `children()` function instead of a match per consumer.
//!
//! The walk follows what gets printed: an assignment's `orig_value`, an operator's two
//! operands, a list's elements, a map's properties. Evaluated values hanging off
//! assignments, variables and operators are not children; they never carry comments.

use super::comment::Comment;
use super::definition::{Assignment, Definition, Module};
use super::expression::{Expression, Map, Property};
use super::node_id::NodeId;
use super::position::Position;

#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Assignment(&'a Assignment),
    Module(&'a Module),
    Map(&'a Map),
    Property(&'a Property),
    Expression(&'a Expression),
    Comment(&'a Comment),
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        match self {
            NodeRef::Assignment(a) => a.id,
            NodeRef::Module(m) => m.id,
            NodeRef::Map(m) => m.id,
            NodeRef::Property(p) => p.id,
            NodeRef::Expression(e) => e.id(),
            NodeRef::Comment(c) => c.id,
        }
    }

    pub fn pos(&self) -> Position {
        match self {
            NodeRef::Assignment(a) => a.name_pos,
            NodeRef::Module(m) => m.type_pos,
            NodeRef::Map(m) => m.lbrace,
            NodeRef::Property(p) => p.name_pos,
            NodeRef::Expression(e) => e.pos(),
            NodeRef::Comment(c) => c.pos,
        }
    }

    /// Short label of the node kind
    pub fn kind(&self) -> &'static str {
        match self {
            NodeRef::Assignment(_) => "Assignment",
            NodeRef::Module(_) => "Module",
            NodeRef::Map(_) => "Map",
            NodeRef::Property(_) => "Property",
            NodeRef::Expression(e) => match e {
                Expression::Bool(_) => "Bool",
                Expression::String(_) => "String",
                Expression::Int64(_) => "Int64",
                Expression::List(_) => "List",
                Expression::Map(_) => "Map",
                Expression::Variable(_) => "Variable",
                Expression::Operator(_) => "Operator",
                Expression::NotEvaluated(_) => "NotEvaluated",
            },
            NodeRef::Comment(_) => "Comment",
        }
    }

    /// Direct children in document order
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        match *self {
            NodeRef::Assignment(a) => vec![NodeRef::Expression(&a.orig_value)],
            NodeRef::Module(m) => vec![NodeRef::Map(&m.map)],
            NodeRef::Map(m) => m.properties.iter().map(NodeRef::Property).collect(),
            NodeRef::Property(p) => vec![NodeRef::Expression(&p.value)],
            NodeRef::Expression(e) => match e {
                Expression::List(l) => l.values.iter().map(NodeRef::Expression).collect(),
                Expression::Map(m) => m.properties.iter().map(NodeRef::Property).collect(),
                Expression::Operator(o) => o.args.iter().map(NodeRef::Expression).collect(),
                _ => Vec::new(),
            },
            NodeRef::Comment(_) => Vec::new(),
        }
    }

    /// Visit this node and every descendant, parents before children
    pub fn walk(&self, visit: &mut impl FnMut(NodeRef<'a>)) {
        visit(*self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

impl<'a> From<&'a Definition> for NodeRef<'a> {
    fn from(def: &'a Definition) -> Self {
        match def {
            Definition::Assignment(a) => NodeRef::Assignment(a),
            Definition::Module(m) => NodeRef::Module(m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bp::ast::Assigner;

    fn pos(line: usize) -> Position {
        Position::new(line * 10, line, 1)
    }

    #[test]
    fn test_walk_follows_printed_tree() {
        let module = Module::new(
            "foo",
            pos(1),
            Map::new(
                vec![Property::new(
                    "srcs",
                    pos(2),
                    Expression::list(
                        vec![Expression::string("a", pos(3)), Expression::string("b", pos(4))],
                        pos(2),
                        pos(5),
                    ),
                )],
                pos(1),
                pos(6),
            ),
        );

        let mut kinds = Vec::new();
        NodeRef::Module(&module).walk(&mut |node| kinds.push(node.kind()));
        assert_eq!(kinds, ["Module", "Map", "Property", "List", "String", "String"]);
    }

    #[test]
    fn test_assignment_children_skip_evaluated_value() {
        let assignment = Assignment::new(
            "x",
            pos(1),
            Assigner::Set,
            pos(1),
            Expression::string("a", pos(1)),
        );
        let children = NodeRef::Assignment(&assignment).children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id(), assignment.orig_value.id());
    }
}
