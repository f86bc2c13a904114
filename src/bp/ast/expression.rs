//! Expression nodes
//!
//! An [`Expression`] is a closed sum of literal and composite values. Every consumer
//! (printer, evaluator, sorter) matches on it exhaustively.
//!
//! Ownership
//!
//!     A node is owned by exactly one parent slot. Installing a subtree in a second place
//!     goes through [`Expression::copy`], which deep-copies and hands out fresh
//!     [`NodeId`]s. `Clone` keeps identities and is meant for snapshots that never
//!     re-enter a tree (scope bindings, test fixtures).
//!
//! Evaluation
//!
//!     `Variable` and `Operator` carry the value they reduce to. When a tree is parsed
//!     without evaluation that value is the [`NotEvaluated`] sentinel. [`Expression::eval`]
//!     follows those links down to a literal and is idempotent.

use super::node_id::NodeId;
use super::position::Position;
use serde::Serialize;
use std::fmt;

/// The value type of an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Type {
    Bool,
    String,
    Int64,
    List,
    Map,
    NotEvaluated,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::Bool => "bool",
            Type::String => "string",
            Type::Int64 => "int64",
            Type::List => "list",
            Type::Map => "map",
            Type::NotEvaluated => "notevaluated",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum Expression {
    Bool(Bool),
    String(Str),
    Int64(Int64),
    List(List),
    Map(Map),
    Variable(Variable),
    Operator(Operator),
    NotEvaluated(NotEvaluated),
}

#[derive(Debug, Clone, Serialize)]
pub struct Bool {
    pub id: NodeId,
    pub pos: Position,
    pub value: bool,
}

/// A string literal; `value` is the unquoted text
#[derive(Debug, Clone, Serialize)]
pub struct Str {
    pub id: NodeId,
    pub pos: Position,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Int64 {
    pub id: NodeId,
    pub pos: Position,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct List {
    pub id: NodeId,
    pub lbracket: Position,
    pub rbracket: Position,
    pub values: Vec<Expression>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Map {
    pub id: NodeId,
    pub lbrace: Position,
    pub rbrace: Position,
    pub properties: Vec<Property>,
}

/// A `name: value` pair inside a module or a nested map
#[derive(Debug, Clone, Serialize)]
pub struct Property {
    pub id: NodeId,
    pub name: String,
    pub name_pos: Position,
    pub colon_pos: Position,
    pub value: Expression,
}

/// A reference to a variable; `value` is what it resolved to
#[derive(Debug, Clone, Serialize)]
pub struct Variable {
    pub id: NodeId,
    pub name: String,
    pub pos: Position,
    pub value: Box<Expression>,
}

/// `args[0] operator args[1]`; `value` caches the evaluated result
#[derive(Debug, Clone, Serialize)]
pub struct Operator {
    pub id: NodeId,
    pub args: Box<[Expression; 2]>,
    pub operator: char,
    pub operator_pos: Position,
    pub value: Box<Expression>,
}

/// Sentinel for values that were not evaluated
#[derive(Debug, Clone, Serialize)]
pub struct NotEvaluated {
    pub id: NodeId,
    pub pos: Position,
}

fn end_pos(pos: Position, len: usize) -> Position {
    Position::new(pos.offset + len, pos.line, pos.column + len)
}

impl Expression {
    pub fn bool(value: bool, pos: Position) -> Self {
        Expression::Bool(Bool {
            id: NodeId::fresh(),
            pos,
            value,
        })
    }

    pub fn string(value: impl Into<String>, pos: Position) -> Self {
        Expression::String(Str {
            id: NodeId::fresh(),
            pos,
            value: value.into(),
        })
    }

    pub fn int64(value: i64, pos: Position) -> Self {
        Expression::Int64(Int64 {
            id: NodeId::fresh(),
            pos,
            value,
        })
    }

    pub fn list(values: Vec<Expression>, lbracket: Position, rbracket: Position) -> Self {
        Expression::List(List {
            id: NodeId::fresh(),
            lbracket,
            rbracket,
            values,
        })
    }

    pub fn not_evaluated(pos: Position) -> Self {
        Expression::NotEvaluated(NotEvaluated {
            id: NodeId::fresh(),
            pos,
        })
    }

    pub fn id(&self) -> NodeId {
        match self {
            Expression::Bool(x) => x.id,
            Expression::String(x) => x.id,
            Expression::Int64(x) => x.id,
            Expression::List(x) => x.id,
            Expression::Map(x) => x.id,
            Expression::Variable(x) => x.id,
            Expression::Operator(x) => x.id,
            Expression::NotEvaluated(x) => x.id,
        }
    }

    /// Where the expression starts in the source
    pub fn pos(&self) -> Position {
        match self {
            Expression::Bool(x) => x.pos,
            Expression::String(x) => x.pos,
            Expression::Int64(x) => x.pos,
            Expression::List(x) => x.lbracket,
            Expression::Map(x) => x.lbrace,
            Expression::Variable(x) => x.pos,
            Expression::Operator(x) => x.args[0].pos(),
            Expression::NotEvaluated(x) => x.pos,
        }
    }

    /// Where the expression ends in the source
    pub fn end(&self) -> Position {
        match self {
            Expression::Bool(x) => end_pos(x.pos, if x.value { 4 } else { 5 }),
            Expression::String(x) => end_pos(x.pos, x.value.len() + 2),
            Expression::Int64(x) => end_pos(x.pos, x.value.to_string().len()),
            Expression::List(x) => end_pos(x.rbracket, 1),
            Expression::Map(x) => end_pos(x.rbrace, 1),
            Expression::Variable(x) => end_pos(x.pos, x.name.len()),
            Expression::Operator(x) => x.args[1].end(),
            Expression::NotEvaluated(x) => x.pos,
        }
    }

    pub fn ty(&self) -> Type {
        match self {
            Expression::Bool(_) => Type::Bool,
            Expression::String(_) => Type::String,
            Expression::Int64(_) => Type::Int64,
            Expression::List(_) => Type::List,
            Expression::Map(_) => Type::Map,
            Expression::Variable(x) => x.value.ty(),
            Expression::Operator(x) => x.value.ty(),
            Expression::NotEvaluated(_) => Type::NotEvaluated,
        }
    }

    /// The fully reduced literal this expression stands for
    ///
    /// Literals evaluate to themselves; variables and operators to their cached value.
    /// Calling `eval` on the result returns the same node.
    pub fn eval(&self) -> &Expression {
        match self {
            Expression::Variable(x) => x.value.eval(),
            Expression::Operator(x) => x.value.eval(),
            _ => self,
        }
    }

    /// Deep, independent copy with fresh node identities
    pub fn copy(&self) -> Expression {
        match self {
            Expression::Bool(x) => Expression::Bool(Bool {
                id: NodeId::fresh(),
                ..x.clone()
            }),
            Expression::String(x) => Expression::String(Str {
                id: NodeId::fresh(),
                ..x.clone()
            }),
            Expression::Int64(x) => Expression::Int64(Int64 {
                id: NodeId::fresh(),
                ..x.clone()
            }),
            Expression::List(x) => Expression::List(List {
                id: NodeId::fresh(),
                lbracket: x.lbracket,
                rbracket: x.rbracket,
                values: x.values.iter().map(Expression::copy).collect(),
            }),
            Expression::Map(x) => Expression::Map(x.copy()),
            Expression::Variable(x) => Expression::Variable(Variable {
                id: NodeId::fresh(),
                name: x.name.clone(),
                pos: x.pos,
                value: Box::new(x.value.copy()),
            }),
            Expression::Operator(x) => Expression::Operator(Operator {
                id: NodeId::fresh(),
                args: Box::new([x.args[0].copy(), x.args[1].copy()]),
                operator: x.operator,
                operator_pos: x.operator_pos,
                value: Box::new(x.value.copy()),
            }),
            Expression::NotEvaluated(x) => Expression::NotEvaluated(NotEvaluated {
                id: NodeId::fresh(),
                pos: x.pos,
            }),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expression::String(x) => Some(&x.value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Expression::List(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut List> {
        match self {
            Expression::List(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Expression::Map(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Expression::Map(x) => Some(x),
            _ => None,
        }
    }

    /// Mutable access to every position field owned by this node (not its children)
    pub(crate) fn own_positions_mut(&mut self) -> Vec<&mut Position> {
        match self {
            Expression::Bool(x) => vec![&mut x.pos],
            Expression::String(x) => vec![&mut x.pos],
            Expression::Int64(x) => vec![&mut x.pos],
            Expression::List(x) => vec![&mut x.lbracket, &mut x.rbracket],
            Expression::Map(x) => vec![&mut x.lbrace, &mut x.rbrace],
            Expression::Variable(x) => vec![&mut x.pos],
            Expression::Operator(x) => vec![&mut x.operator_pos],
            Expression::NotEvaluated(x) => vec![&mut x.pos],
        }
    }
}

impl Map {
    pub fn new(properties: Vec<Property>, lbrace: Position, rbrace: Position) -> Self {
        Self {
            id: NodeId::fresh(),
            lbrace,
            rbrace,
            properties,
        }
    }

    pub fn get_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn get_property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.name == name)
    }

    /// Remove the first property called `name`; returns whether one was removed
    ///
    /// Comments attached to the removed property stay in the comment table until the tree
    /// is finalized leniently (see [`SyntaxTree::delete_dangling_comments`](super::SyntaxTree::delete_dangling_comments)).
    pub fn remove_property(&mut self, name: &str) -> bool {
        match self.properties.iter().position(|p| p.name == name) {
            Some(index) => {
                self.properties.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn copy(&self) -> Map {
        Map {
            id: NodeId::fresh(),
            lbrace: self.lbrace,
            rbrace: self.rbrace,
            properties: self.properties.iter().map(Property::copy).collect(),
        }
    }
}

impl Property {
    pub fn new(name: impl Into<String>, name_pos: Position, value: Expression) -> Self {
        Self {
            id: NodeId::fresh(),
            name: name.into(),
            name_pos,
            colon_pos: name_pos,
            value,
        }
    }

    pub fn copy(&self) -> Property {
        Property {
            id: NodeId::fresh(),
            name: self.name.clone(),
            name_pos: self.name_pos,
            colon_pos: self.colon_pos,
            value: self.value.copy(),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Bool(x) => write!(f, "{}@{}", x.value, x.pos),
            Expression::String(x) => write!(f, "{:?}@{}", x.value, x.pos),
            Expression::Int64(x) => write!(f, "{}@{}", x.value, x.pos),
            Expression::List(x) => {
                write!(f, "@{}-{}[", x.lbracket, x.rbracket)?;
                for (i, value) in x.values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
            Expression::Map(x) => write!(f, "{x}"),
            Expression::Variable(x) => write!(f, "{} = {}", x.name, x.value),
            Expression::Operator(x) => write!(
                f,
                "({} {} {} = {})@{}",
                x.args[0], x.operator, x.args[1], x.value, x.operator_pos
            ),
            Expression::NotEvaluated(_) => f.write_str("Not Evaluated"),
        }
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}-{}{{", self.lbrace, self.rbrace)?;
        for (i, property) in self.properties.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{property}")?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}: {}", self.name, self.colon_pos, self.value)
    }
}
