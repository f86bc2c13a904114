//! Testing utilities for syntax trees
//!
//! Printer and parser tests mostly compare text: write the expected source, parse,
//! print, and check the result with [`text_diff::assert_text_eq`], which reports a
//! unified diff instead of two long strings.
//!
//! When the shape of a tree matters more than its text, [`compare`] checks two trees
//! for structural equality. Node identities and positions are ignored; node kinds,
//! names, values and attached comment texts are not. It also finds aliased nodes (one
//! identity reachable twice), which would make the comment table ambiguous.
//!
//! [`factories`] builds nodes and trees with plausible positions for tests that
//! construct trees by hand, and wraps parsing for tests that expect clean input.
//!
//! ```rust-example
//! use blueprint::bp::testing::{compare::assert_trees_eq, factories::parse_ok};
//!
//! let a = parse_ok("foo { name: \"x\" }");
//! let b = parse_ok("foo {\n    name: \"x\",\n}\n");
//! assert_trees_eq(&a, &b);
//! ```

pub mod compare;
pub mod factories;
pub mod text_diff;

pub use compare::{assert_trees_eq, compare_trees, duplicate_ids, Difference};
pub use text_diff::{assert_text_eq, diff_text};
