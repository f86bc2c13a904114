//! # blueprint
//!
//! Parser, evaluator and round-trip formatter for Blueprint, the small declarative
//! build-definition language of `Android.bp` files: modules and variable assignments
//! composed of bools, strings, integers, lists and maps, with `+`/`+=` concatenation.
//!
//! The library lives under the [`bp`] module:
//!
//! - [`bp::lexing`] turns source text into positioned tokens (comments included).
//! - [`bp::parsing`] builds a [`bp::ast::SyntaxTree`], attaching every comment and blank
//!   line to a node, and optionally evaluates variables and operators.
//! - [`bp::formats`] prints a tree back to canonical source (and to debug formats).
//! - [`bp::sort`] and [`bp::mutation`] edit trees in place while keeping comments
//!   attached to the nodes they describe.
//!
//! ## Testing
//!
//! Test support (structural comparison, text diffs, node factories) lives in
//! [`bp::testing`].

pub mod bp;

pub use bp::{parse, parse_and_eval, print, print_tree};
