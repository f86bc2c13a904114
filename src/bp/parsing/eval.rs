//! Operator evaluation
//!
//! `+` is defined on two operands of the same type:
//!
//! - strings concatenate;
//! - integers add;
//! - lists concatenate in order, without de-duplication;
//! - maps merge: the left map's properties keep their order, a property present in both
//!   maps combines both values with `+`, and properties only in the right map follow in
//!   their own order.
//!
//! Results are built from copies, so the operands stay owned by the operator node.

use super::error::ParseErrorKind;
use crate::bp::ast::{Expression, Int64, List, Map, NodeId, Operator, Position, Property, Str, Type};

/// Build an operator node whose value is not computed yet
pub(crate) fn operator(left: Expression, right: Expression, symbol: char, pos: Position) -> Operator {
    Operator {
        id: NodeId::fresh(),
        args: Box::new([left, right]),
        operator: symbol,
        operator_pos: pos,
        value: Box::new(Expression::not_evaluated(pos)),
    }
}

/// Type-check `op`, then compute and cache its value
///
/// Without `eval` nothing is checked and the value stays [`Expression::NotEvaluated`],
/// as it does when an operand is itself unevaluated.
pub(crate) fn evaluate_operator(op: &mut Operator, eval: bool) -> Result<(), ParseErrorKind> {
    if !eval {
        return Ok(());
    }
    let (left, right) = (&op.args[0], &op.args[1]);
    let (left_ty, right_ty) = (left.ty(), right.ty());
    if left_ty == Type::NotEvaluated || right_ty == Type::NotEvaluated {
        return Ok(());
    }
    if left_ty != right_ty {
        return Err(ParseErrorKind::MismatchedType {
            operator: op.operator,
            left: left_ty,
            right: right_ty,
        });
    }
    let value = add_values(left.eval(), right.eval(), op.operator, op.operator_pos)?;
    op.value = Box::new(value);
    Ok(())
}

fn add_values(
    left: &Expression,
    right: &Expression,
    symbol: char,
    pos: Position,
) -> Result<Expression, ParseErrorKind> {
    match (left, right) {
        (Expression::String(a), Expression::String(b)) => Ok(Expression::String(Str {
            id: NodeId::fresh(),
            pos: a.pos,
            value: format!("{}{}", a.value, b.value),
        })),
        (Expression::Int64(a), Expression::Int64(b)) => {
            let value = a.value.checked_add(b.value).ok_or(ParseErrorKind::IntOverflow)?;
            Ok(Expression::Int64(Int64 {
                id: NodeId::fresh(),
                pos: a.pos,
                value,
            }))
        }
        (Expression::List(a), Expression::List(b)) => Ok(Expression::List(List {
            id: NodeId::fresh(),
            lbracket: a.lbracket,
            rbracket: a.rbracket,
            values: a.values.iter().chain(&b.values).map(Expression::copy).collect(),
        })),
        (Expression::Map(a), Expression::Map(b)) => Ok(Expression::Map(add_maps(a, b, pos)?)),
        (a, b) if a.ty() != b.ty() => Err(ParseErrorKind::MismatchedType {
            operator: symbol,
            left: a.ty(),
            right: b.ty(),
        }),
        (a, _) => Err(ParseErrorKind::UnsupportedOperator {
            operator: symbol,
            ty: a.ty(),
        }),
    }
}

/// Merge two maps, combining properties present in both with `+`
pub(crate) fn add_maps(map1: &Map, map2: &Map, pos: Position) -> Result<Map, ParseErrorKind> {
    let mut properties = Vec::with_capacity(map1.properties.len() + map2.properties.len());

    for prop1 in &map1.properties {
        let Some(prop2) = map2.get_property(&prop1.name) else {
            properties.push(prop1.copy());
            continue;
        };
        let mut combined = operator(prop1.value.copy(), prop2.value.copy(), '+', pos);
        evaluate_operator(&mut combined, true)?;
        properties.push(Property {
            id: NodeId::fresh(),
            name: prop1.name.clone(),
            name_pos: prop1.name_pos,
            colon_pos: prop1.colon_pos,
            value: Expression::Operator(combined),
        });
    }

    properties.extend(
        map2.properties
            .iter()
            .filter(|prop2| map1.get_property(&prop2.name).is_none())
            .map(Property::copy),
    );

    Ok(Map::new(properties, map1.lbrace, map1.rbrace))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::new(0, 1, 1)
    }

    fn int_map(entries: &[(&str, i64)]) -> Expression {
        Expression::Map(Map::new(
            entries
                .iter()
                .map(|(name, value)| Property::new(*name, pos(), Expression::int64(*value, pos())))
                .collect(),
            pos(),
            pos(),
        ))
    }

    fn evaluate(left: Expression, right: Expression) -> Result<Expression, ParseErrorKind> {
        let mut op = operator(left, right, '+', pos());
        evaluate_operator(&mut op, true)?;
        Ok(op.value.eval().clone())
    }

    #[test]
    fn test_string_concatenation() {
        let value = evaluate(Expression::string("ab", pos()), Expression::string("cd", pos())).unwrap();
        assert_eq!(value.as_str(), Some("abcd"));
    }

    #[test]
    fn test_list_concatenation_keeps_duplicates() {
        let a = Expression::list(vec![Expression::string("x", pos())], pos(), pos());
        let b = Expression::list(vec![Expression::string("x", pos())], pos(), pos());
        let value = evaluate(a, b).unwrap();
        let values: Vec<_> = value.as_list().unwrap().values.iter().map(|v| v.as_str()).collect();
        assert_eq!(values, [Some("x"), Some("x")]);
    }

    #[test]
    fn test_map_merge_order_and_recursion() {
        let value = evaluate(int_map(&[("a", 1), ("b", 2)]), int_map(&[("b", 3), ("c", 4)])).unwrap();
        let map = value.as_map().unwrap();
        let names: Vec<_> = map.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        let b = map.get_property("b").unwrap().value.eval();
        assert!(matches!(b, Expression::Int64(i) if i.value == 5));
    }

    #[test]
    fn test_mismatched_types() {
        let err = evaluate(Expression::string("a", pos()), Expression::bool(true, pos())).unwrap_err();
        assert_eq!(err.to_string(), "mismatched type in operator +: string != bool");
    }

    #[test]
    fn test_bool_addition_unsupported() {
        let err = evaluate(Expression::bool(true, pos()), Expression::bool(false, pos())).unwrap_err();
        assert_eq!(err.to_string(), "operator + not supported on type bool");
    }

    #[test]
    fn test_nested_map_mismatch() {
        let left = Expression::Map(Map::new(
            vec![Property::new("a", pos(), Expression::string("x", pos()))],
            pos(),
            pos(),
        ));
        let err = evaluate(left, int_map(&[("a", 1)])).unwrap_err();
        assert!(matches!(err, ParseErrorKind::MismatchedType { left: Type::String, right: Type::Int64, .. }));
    }

    #[test]
    fn test_without_eval_nothing_is_checked() {
        let mut op = operator(Expression::string("a", pos()), Expression::int64(1, pos()), '+', pos());
        evaluate_operator(&mut op, false).unwrap();
        assert!(matches!(*op.value, Expression::NotEvaluated(_)));
    }

    #[test]
    fn test_overflow() {
        let err = evaluate(Expression::int64(i64::MAX, pos()), Expression::int64(1, pos())).unwrap_err();
        assert_eq!(err, ParseErrorKind::IntOverflow);
    }
}
