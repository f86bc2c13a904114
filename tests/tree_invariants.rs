//! Invariants every finished tree satisfies, and what happens when they break

use blueprint::bp::ast::{
    Comment, DanglingPolicy, Definition, InvariantError, Node, NodeId, Position, SyntaxTree,
};
use blueprint::bp::config::{Loader, ParseConfig};
use blueprint::bp::processor::{process_source, render, ProcessingError};
use blueprint::bp::testing::factories::{
    assignment, list, module, parse_ok, parse_with, property, string, tree,
};
use blueprint::bp::testing::{compare_trees, duplicate_ids};
use blueprint::print_tree;

const SAMPLE: &str = "// header\n\nsrcs = [\"a.c\"] // shared\n\nfoo {\n    // the name\n    name: \"foo\",\n    srcs: srcs + [\n        \"b.c\", /* extra */\n    ],\n}\n";

fn orphan_comment(tree: &mut SyntaxTree) {
    tree.comments
        .get_comments(NodeId::fresh())
        .pre
        .push(Comment::line("// orphan", Position::new(0, 1, 1)));
}

#[test]
fn parsed_trees_hold_every_comment() {
    let tree = parse_ok(SAMPLE);
    // blank-line markers are not counted
    assert_eq!(tree.comment_count(), 4);
    assert!(tree.confirm_no_dangling_comments().is_ok());
    assert!(tree.confirm_all_nodes_have_positions().is_ok());
    assert!(duplicate_ids(&tree).is_empty());
}

#[test]
fn reparse_of_printed_tree_is_equal() {
    let tree = parse_ok(SAMPLE);
    let printed = print_tree(&tree);
    assert_eq!(printed, SAMPLE);
    assert!(compare_trees(&tree, &parse_ok(&printed)).is_empty());
}

#[test]
#[should_panic(expected = "is not reachable from the tree")]
fn strict_policy_panics_on_dangling_comment() {
    let mut tree = parse_ok("foo {}\n");
    orphan_comment(&mut tree);
    tree.finalize(DanglingPolicy::Strict);
}

#[test]
fn lenient_policy_drops_dangling_comment() {
    let mut tree = parse_ok("foo {} // kept\n");
    orphan_comment(&mut tree);
    assert!(matches!(
        tree.confirm_no_dangling_comments(),
        Err(InvariantError::DanglingComment { .. })
    ));
    tree.finalize(DanglingPolicy::Lenient);
    assert!(tree.confirm_no_dangling_comments().is_ok());
    assert_eq!(tree.comment_count(), 1);
    assert_eq!(print_tree(&tree), "foo {} // kept\n");
}

#[test]
fn hand_built_trees_need_positions() {
    let mut built = tree(vec![
        assignment("common", list(vec![string("a.c")])),
        module("cc_library", vec![property("name", string("libfoo"))]),
    ]);
    assert!(matches!(
        built.confirm_all_nodes_have_positions(),
        Err(InvariantError::MissingPosition { .. })
    ));

    // anchor the first definition, then let the rest inherit
    if let Some(Node::Definition(Definition::Assignment(a))) = built.nodes.first_mut() {
        a.name_pos = Position::new(0, 1, 1);
    }
    if let Some(Node::Definition(Definition::Module(m))) = built.nodes.get_mut(1) {
        m.type_pos = Position::new(20, 2, 1);
    }
    built.cascade_positions();
    assert!(built.confirm_all_nodes_have_positions().is_ok());
    assert_eq!(
        print_tree(&built),
        "common = [\"a.c\"]\ncc_library {\n    name: \"libfoo\",\n}\n"
    );
}

#[test]
fn parse_errors_fail_processing() {
    let config = Loader::new().and_then(Loader::build).unwrap();
    let err = process_source("Android.bp", "foo {\n    name: \"a\"\n    srcs: [],\n}\n", "bp", &config)
        .unwrap_err();
    assert!(matches!(err, ProcessingError::Parse(ref errors) if errors.len() == 1));
    assert_eq!(
        err.to_string(),
        "Android.bp:3:5: expected \",\" or \"}\", found identifier srcs"
    );
}

#[test]
fn evaluation_can_be_configured() {
    let config = Loader::new()
        .and_then(|l| l.with_str("parse:\n  eval: true\n"))
        .and_then(Loader::build)
        .unwrap();
    let err = process_source("Android.bp", "a = b\n", "bp", &config).unwrap_err();
    assert_eq!(err.to_string(), "Android.bp:1:5: variable \"b\" is not set");

    let (tree, _) = parse_with("a = \"x\"\nb = a\n", ParseConfig::evaluating());
    assert_eq!(
        tree.assignments().nth(1).map(|b| b.value.eval().as_str()),
        Some(Some("x"))
    );
}

#[test]
fn debug_formats_render_the_same_tree() {
    let tree = parse_ok(SAMPLE);

    let json: serde_json::Value = serde_json::from_str(&render(&tree, "json").unwrap()).unwrap();
    assert_eq!(json["nodes"].as_array().map(Vec::len), Some(5));
    assert_eq!(json["nodes"][2]["name"], "srcs");
    assert_eq!(json["nodes"][3]["kind"], "BlankLine");

    let view = render(&tree, "treeviz").unwrap();
    assert!(view.starts_with("⧉ test.bp\n"));
    assert!(view.contains("srcs"));

    assert!(matches!(
        render(&tree, "yaml"),
        Err(ProcessingError::Format(_))
    ));
}
