//! JSON dump of a syntax tree
//!
//! Serializes the whole [`SyntaxTree`], comment table included, with `serde_json`.
//! Meant for tooling and debugging; there is no JSON reader.

use super::{FormatError, Formatter};
use crate::bp::ast::SyntaxTree;

pub fn to_json_string(tree: &SyntaxTree) -> Result<String, FormatError> {
    serde_json::to_string_pretty(tree)
        .map_err(|err| FormatError::SerializationError(err.to_string()))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, tree: &SyntaxTree) -> Result<String, FormatError> {
        to_json_string(tree)
    }

    fn description(&self) -> &str {
        "Syntax tree as pretty-printed JSON"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bp::ast::{Assigner, Assignment, Definition, Expression, Position};
    use serde_json::Value;

    #[test]
    fn test_assignment_json() {
        let mut tree = SyntaxTree::new("Android.bp");
        tree.add_definition(Definition::Assignment(Assignment::new(
            "x",
            Position::new(0, 1, 1),
            Assigner::Set,
            Position::new(2, 1, 3),
            Expression::int64(7, Position::new(4, 1, 5)),
        )));

        let json: Value = serde_json::from_str(&to_json_string(&tree).unwrap()).unwrap();
        assert_eq!(json["name"], "Android.bp");
        let def = &json["nodes"][0];
        assert_eq!(def["node"], "Definition");
        assert_eq!(def["kind"], "Assignment");
        assert_eq!(def["name"], "x");
        assert_eq!(def["orig_value"]["kind"], "Int64");
        assert_eq!(def["orig_value"]["value"], 7);
    }
}
