//! Sorting list values
//!
//! [`sort_lists`] reorders the elements of every list in a tree. Only lists whose
//! elements are all string literals, all booleans or all integers are touched; anything
//! holding variables, operators, maps or mixed types is left alone.
//!
//! Runs
//!
//!     Elements are sorted in runs of adjacent source lines. A blank line or a comment on
//!     its own line between two elements splits the list, and each part is sorted on its
//!     own, so hand-grouped sections keep their grouping.
//!
//! Order
//!
//!     Strings compare with [`numeric_string_cmp`]: digit runs compare by value, so
//!     `img2` sorts before `img10`. Booleans sort `false` first, integers numerically.
//!     The sort is stable.
//!
//! A moved element takes over the source position of the slot it lands in, and its
//! comments are shifted by the same amount, so a comment stays with its element.

use crate::bp::ast::{CommentTable, Definition, Expression, List, Node, Position, SyntaxTree};
use std::cmp::Ordering;
use std::ops::Range;
use tracing::debug;

/// Compare strings treating runs of ASCII digits as numbers
///
/// Ties (such as `"01"` and `"1"`) fall back to plain byte order.
pub fn numeric_string_cmp(a: &str, b: &str) -> Ordering {
    let (x, y) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);
    while i < x.len() && j < y.len() {
        if x[i].is_ascii_digit() && y[j].is_ascii_digit() {
            let (start_i, start_j) = (i, j);
            while i < x.len() && x[i].is_ascii_digit() {
                i += 1;
            }
            while j < y.len() && y[j].is_ascii_digit() {
                j += 1;
            }
            let (da, db) = (trim_zeros(&x[start_i..i]), trim_zeros(&y[start_j..j]));
            let ord = da.len().cmp(&db.len()).then_with(|| da.cmp(db));
            if ord != Ordering::Equal {
                return ord;
            }
        } else {
            if x[i] != y[j] {
                return x[i].cmp(&y[j]);
            }
            i += 1;
            j += 1;
        }
    }
    (x.len() - i).cmp(&(y.len() - j)).then_with(|| a.cmp(b))
}

fn trim_zeros(digits: &[u8]) -> &[u8] {
    let first = digits
        .iter()
        .position(|&d| d != b'0')
        .unwrap_or(digits.len());
    &digits[first..]
}

fn compare(a: &Expression, b: &Expression) -> Ordering {
    match (a, b) {
        (Expression::String(a), Expression::String(b)) => numeric_string_cmp(&a.value, &b.value),
        (Expression::Bool(a), Expression::Bool(b)) => a.value.cmp(&b.value),
        (Expression::Int64(a), Expression::Int64(b)) => a.value.cmp(&b.value),
        _ => Ordering::Equal,
    }
}

/// Whether every element is a literal of one sortable type
fn is_sortable(list: &List) -> bool {
    let all = |pred: fn(&Expression) -> bool| list.values.iter().all(pred);
    all(|v| matches!(v, Expression::String(_)))
        || all(|v| matches!(v, Expression::Bool(_)))
        || all(|v| matches!(v, Expression::Int64(_)))
}

/// Index ranges of elements on adjacent source lines
fn runs(list: &List) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..list.values.len() {
        if list.values[i].pos().line > list.values[i - 1].end().line + 1 {
            runs.push(start..i);
            start = i;
        }
    }
    if !list.values.is_empty() {
        runs.push(start..list.values.len());
    }
    runs
}

fn is_sorted(values: &[Expression]) -> bool {
    values
        .windows(2)
        .all(|pair| compare(&pair[0], &pair[1]) != Ordering::Greater)
}

/// Whether a list of strings is already in sorted order
///
/// Lists holding anything other than string literals report `false`.
pub fn list_is_sorted(list: &List) -> bool {
    list.values
        .iter()
        .all(|v| matches!(v, Expression::String(_)))
        && is_sorted(&list.values)
}

/// Sort one list in place; returns whether anything moved
pub fn sort_list(list: &mut List, comments: &mut CommentTable) -> bool {
    if !is_sortable(list) {
        return false;
    }
    let mut moved = false;
    for run in runs(list) {
        let values = &mut list.values[run.clone()];
        if values.len() < 2 || is_sorted(values) {
            continue;
        }
        let slots: Vec<Position> = values.iter().map(Expression::pos).collect();
        // own-line comments and blank lines above a run belong to the run, not its head
        let head = values[0].id();
        let heading = if comments.pre(head).is_empty() {
            Vec::new()
        } else {
            std::mem::take(&mut comments.get_comments(head).pre)
        };
        values.sort_by(compare);
        for (slot, value) in slots.into_iter().zip(values.iter_mut()) {
            let old = value.pos();
            if old == slot {
                continue;
            }
            comments.shift_comments(
                value.id(),
                slot.line as isize - old.line as isize,
                slot.offset as isize - old.offset as isize,
            );
            for pos in value.own_positions_mut() {
                *pos = slot;
            }
        }
        if !heading.is_empty() {
            comments.get_comments(values[0].id()).pre.splice(0..0, heading);
        }
        debug!(
            list = %list.id,
            first = run.start,
            len = run.len(),
            "sorted list run"
        );
        moved = true;
    }
    moved
}

fn sort_expression(expr: &mut Expression, comments: &mut CommentTable) -> usize {
    match expr {
        Expression::List(list) => {
            let nested: usize = list
                .values
                .iter_mut()
                .map(|value| sort_expression(value, comments))
                .sum();
            nested + usize::from(sort_list(list, comments))
        }
        Expression::Map(map) => map
            .properties
            .iter_mut()
            .map(|property| sort_expression(&mut property.value, comments))
            .sum(),
        Expression::Operator(op) => op
            .args
            .iter_mut()
            .map(|arg| sort_expression(arg, comments))
            .sum(),
        _ => 0,
    }
}

/// Sort every sortable list reachable from the tree's definitions
///
/// Returns the number of lists that changed.
pub fn sort_lists(tree: &mut SyntaxTree) -> usize {
    let SyntaxTree {
        nodes, comments, ..
    } = &mut *tree;
    let mut sorted = 0;
    for node in nodes.iter_mut() {
        let Node::Definition(def) = node else {
            continue;
        };
        match def {
            Definition::Module(module) => {
                sorted += module
                    .map
                    .properties
                    .iter_mut()
                    .map(|property| sort_expression(&mut property.value, comments))
                    .sum::<usize>();
            }
            Definition::Assignment(assignment) => {
                sorted += sort_expression(&mut assignment.orig_value, comments);
                sort_expression(&mut assignment.value, comments);
            }
        }
    }
    debug!(file = %tree.name, sorted, "sorted lists");
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bp::ast::Comment;

    fn strings_on_lines(values: &[(&str, usize)]) -> List {
        let elements = values
            .iter()
            .map(|(v, line)| Expression::string(*v, Position::new(line * 20 + 4, *line, 5)))
            .collect();
        match Expression::list(elements, Position::new(0, 0, 1), Position::new(1000, 50, 1)) {
            Expression::List(list) => list,
            _ => unreachable!(),
        }
    }

    fn values(list: &List) -> Vec<&str> {
        list.values.iter().filter_map(Expression::as_str).collect()
    }

    #[test]
    fn test_numeric_string_cmp() {
        assert_eq!(numeric_string_cmp("img2", "img10"), Ordering::Less);
        assert_eq!(numeric_string_cmp("img10", "img2"), Ordering::Greater);
        assert_eq!(numeric_string_cmp("a", "b"), Ordering::Less);
        assert_eq!(numeric_string_cmp("abc", "ab"), Ordering::Greater);
        assert_eq!(numeric_string_cmp("x", "x"), Ordering::Equal);
        assert_eq!(numeric_string_cmp("01", "1"), Ordering::Less);
        assert_eq!(numeric_string_cmp("v1.9", "v1.10"), Ordering::Less);
    }

    #[test]
    fn test_sorts_numerically() {
        let mut list = strings_on_lines(&[("img2", 1), ("img10", 2), ("img1", 3)]);
        assert!(sort_list(&mut list, &mut CommentTable::new()));
        assert_eq!(values(&list), vec!["img1", "img2", "img10"]);
        assert!(list_is_sorted(&list));
    }

    #[test]
    fn test_gap_splits_runs() {
        let mut list = strings_on_lines(&[("d", 1), ("c", 2), ("b", 4), ("a", 5)]);
        sort_list(&mut list, &mut CommentTable::new());
        assert_eq!(values(&list), vec!["c", "d", "a", "b"]);
        assert!(!list_is_sorted(&list));
    }

    #[test]
    fn test_comments_follow_elements() {
        let mut list = strings_on_lines(&[("b", 1), ("a", 2)]);
        let mut comments = CommentTable::new();
        let b = list.values[0].id();
        comments.get_comments(b).post.push(
            Comment::line("// about b", Position::new(30, 1, 10)).with_own_line(false),
        );

        sort_list(&mut list, &mut comments);
        assert_eq!(values(&list), vec!["a", "b"]);
        assert_eq!(list.values[1].id(), b);
        assert_eq!(list.values[1].pos().line, 2);
        let comment = &comments.post(b)[0];
        assert_eq!(comment.pos.line, 2);
        assert_eq!(comment.pos.offset, 50);
    }

    #[test]
    fn test_run_heading_stays_in_place() {
        let mut list = strings_on_lines(&[("b", 2), ("a", 3)]);
        let mut comments = CommentTable::new();
        let b = list.values[0].id();
        comments
            .get_comments(b)
            .pre
            .push(Comment::line("// group", Position::new(24, 1, 5)));

        sort_list(&mut list, &mut comments);
        let a = list.values[0].id();
        assert!(comments.pre(b).is_empty());
        assert_eq!(comments.pre(a)[0].text, "// group");
        assert_eq!(comments.pre(a)[0].pos.line, 1);
    }

    #[test]
    fn test_mixed_lists_are_untouched() {
        let mut list = strings_on_lines(&[("b", 1)]);
        list.values.push(Expression::int64(1, Position::new(44, 2, 5)));
        assert!(!sort_list(&mut list, &mut CommentTable::new()));
        assert!(!list_is_sorted(&list));
    }

    #[test]
    fn test_ints_and_bools() {
        let mut ints = strings_on_lines(&[]);
        ints.values = vec![
            Expression::int64(10, Position::new(24, 1, 5)),
            Expression::int64(-2, Position::new(44, 2, 5)),
        ];
        assert!(sort_list(&mut ints, &mut CommentTable::new()));
        assert!(matches!(&ints.values[0], Expression::Int64(i) if i.value == -2));
    }
}
