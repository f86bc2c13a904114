//! Top-level definitions: assignments and modules

use super::expression::{Expression, Map};
use super::node_id::NodeId;
use super::position::Position;
use serde::Serialize;
use std::fmt;

/// The operator of an assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Assigner {
    /// `=`
    Set,
    /// `+=`
    Append,
}

impl Assigner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Assigner::Set => "=",
            Assigner::Append => "+=",
        }
    }
}

impl fmt::Display for Assigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `name = expr` or `name += expr`
///
/// `orig_value` is the expression as written and is what gets printed (and what
/// comments attach to). `value` is the evaluated result; for `=` it is updated in place
/// when later `+=` assignments extend the variable.
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub id: NodeId,
    pub name: String,
    pub name_pos: Position,
    pub value: Expression,
    pub orig_value: Expression,
    pub equals_pos: Position,
    pub assigner: Assigner,
    pub referenced: bool,
}

/// `type_name { properties }`
#[derive(Debug, Clone, Serialize)]
pub struct Module {
    pub id: NodeId,
    pub type_name: String,
    pub type_pos: Position,
    pub map: Map,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum Definition {
    Assignment(Assignment),
    Module(Module),
}

impl Assignment {
    pub fn new(
        name: impl Into<String>,
        name_pos: Position,
        assigner: Assigner,
        equals_pos: Position,
        value: Expression,
    ) -> Self {
        Self {
            id: NodeId::fresh(),
            name: name.into(),
            name_pos,
            orig_value: value.copy(),
            value,
            equals_pos,
            assigner,
            referenced: false,
        }
    }
}

impl Module {
    pub fn new(type_name: impl Into<String>, type_pos: Position, map: Map) -> Self {
        Self {
            id: NodeId::fresh(),
            type_name: type_name.into(),
            type_pos,
            map,
        }
    }

    /// The value of the module's `name` property, if it is a string literal
    pub fn name(&self) -> Option<&str> {
        self.map
            .get_property("name")
            .and_then(|p| p.value.eval().as_str())
    }
}

impl Definition {
    pub fn id(&self) -> NodeId {
        match self {
            Definition::Assignment(a) => a.id,
            Definition::Module(m) => m.id,
        }
    }

    pub fn pos(&self) -> Position {
        match self {
            Definition::Assignment(a) => a.name_pos,
            Definition::Module(m) => m.type_pos,
        }
    }

    pub fn end(&self) -> Position {
        match self {
            Definition::Assignment(a) => a.orig_value.end(),
            Definition::Module(m) => Position::new(
                m.map.rbrace.offset + 1,
                m.map.rbrace.line,
                m.map.rbrace.column + 1,
            ),
        }
    }

    pub fn as_module(&self) -> Option<&Module> {
        match self {
            Definition::Module(m) => Some(m),
            Definition::Assignment(_) => None,
        }
    }

    pub fn as_module_mut(&mut self) -> Option<&mut Module> {
        match self {
            Definition::Module(m) => Some(m),
            Definition::Assignment(_) => None,
        }
    }

    pub fn as_assignment(&self) -> Option<&Assignment> {
        match self {
            Definition::Assignment(a) => Some(a),
            Definition::Module(_) => None,
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} {} {} ({}) {}",
            self.name, self.equals_pos, self.assigner, self.value, self.orig_value, self.referenced
        )
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.type_name, self.map)
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Definition::Assignment(a) => write!(f, "{a}"),
            Definition::Module(m) => write!(f, "{m}"),
        }
    }
}
