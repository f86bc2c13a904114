//! Factories for building trees in tests
//!
//! Hand-built nodes carry no source position; compare them with
//! [`compare`](super::compare), or call
//! [`SyntaxTree::cascade_positions`](crate::bp::ast::SyntaxTree::cascade_positions)
//! before checks that need positions.

use crate::bp::ast::{
    Assigner, Assignment, Definition, Expression, Map, Module, Position, Property, SyntaxTree,
};
use crate::bp::config::ParseConfig;
use crate::bp::formats::printer::print_tree;
use crate::bp::parsing::parse_with_config;
use crate::bp::scope::Scope;

pub fn string(value: &str) -> Expression {
    Expression::string(value, Position::default())
}

pub fn int(value: i64) -> Expression {
    Expression::int64(value, Position::default())
}

pub fn boolean(value: bool) -> Expression {
    Expression::bool(value, Position::default())
}

pub fn list(values: Vec<Expression>) -> Expression {
    Expression::list(values, Position::default(), Position::default())
}

pub fn map(properties: Vec<Property>) -> Expression {
    Expression::Map(Map::new(properties, Position::default(), Position::default()))
}

pub fn property(name: &str, value: Expression) -> Property {
    Property::new(name, Position::default(), value)
}

pub fn module(type_name: &str, properties: Vec<Property>) -> Definition {
    Definition::Module(Module::new(
        type_name,
        Position::default(),
        Map::new(properties, Position::default(), Position::default()),
    ))
}

pub fn assignment(name: &str, value: Expression) -> Definition {
    Definition::Assignment(Assignment::new(
        name,
        Position::default(),
        Assigner::Set,
        Position::default(),
        value,
    ))
}

pub fn tree(defs: Vec<Definition>) -> SyntaxTree {
    let mut tree = SyntaxTree::new("test.bp");
    for def in defs {
        tree.add_definition(def);
    }
    tree
}

/// Parse with `config`, panicking with the error list if there is any
pub fn parse_with(source: &str, config: ParseConfig) -> (SyntaxTree, Scope) {
    let mut scope = Scope::new();
    let (tree, errors) = parse_with_config("test.bp", source, &mut scope, config);
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        panic!("unexpected parse errors:\n{}", messages.join("\n"));
    }
    (tree, scope)
}

/// Parse without evaluation, expecting no errors
pub fn parse_ok(source: &str) -> SyntaxTree {
    parse_with(source, ParseConfig::default()).0
}

/// Parse with evaluation, expecting no errors
pub fn parse_eval_ok(source: &str) -> (SyntaxTree, Scope) {
    parse_with(source, ParseConfig::evaluating())
}

/// Parse and print with defaults
pub fn reformat(source: &str) -> String {
    print_tree(&parse_ok(source))
}
