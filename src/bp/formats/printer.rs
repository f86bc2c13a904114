//! Canonical Blueprint printer
//!
//! Turns a [`SyntaxTree`] back into source text. Printing a freshly parsed tree of
//! canonically formatted input reproduces the input byte for byte, and printing is a
//! fixed point: parse and print the output again and nothing changes.
//!
//! Whitespace
//!
//!     Tokens never write their own separators. Each one requests the whitespace it
//!     needs from the token before it and after it (see [`Whitespace`]); requests merge
//!     by taking the strongest, and the merged result is written only when the next
//!     token arrives. This one-token lag is what lets a comment "hug" a pending line
//!     break: a same-line comment is written before the break it would otherwise follow.
//!
//! Layout
//!
//!     - 4 spaces per nesting level;
//!     - maps and module bodies with properties are always split, one property per line
//!       with a trailing comma;
//!     - lists are printed inline when they have at most one element and did not span
//!       several source lines (or always split, with [`ListLayout::Expand`]);
//!     - an operator whose right operand started on a new source line keeps the break,
//!       indented one level;
//!     - a module is followed by a blank line and an assignment by a line break.
//!
//! Comments
//!
//!     Pre-comments print before their node and post-comments after it (for list
//!     elements and properties, after the comma). For maps and lists, pre-comments that
//!     were written after the opening bracket print inside it. A `//` comment that would
//!     land inside an inline list is held back and written at the end of the line.

use super::{FormatError, Formatter};
use crate::bp::ast::{
    Assignment, Comment, CommentTable, Definition, Expression, List, Map, Module, Node, NodeId,
    Operator, Position, SyntaxTree,
};
use crate::bp::config::{FormatConfig, ListLayout};
use crate::bp::lexing::strings::quote;

const INDENT: usize = 4;

/// Whitespace requested between two tokens, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Whitespace {
    DontCare,
    Space,
    Newline,
    BlankLine,
}

/// Print `tree` with the default configuration
pub fn print(tree: &SyntaxTree) -> Vec<u8> {
    print_tree(tree).into_bytes()
}

/// Print `tree` with the default configuration, as a string
pub fn print_tree(tree: &SyntaxTree) -> String {
    print_with_config(tree, &FormatConfig::default())
}

pub fn print_with_config(tree: &SyntaxTree, config: &FormatConfig) -> String {
    let mut printer = Printer::new(&tree.comments, *config);
    printer.tree(tree);
    printer.finish()
}

/// The canonical source format, registered as `bp`
#[derive(Debug, Clone, Default)]
pub struct BlueprintFormatter {
    pub config: FormatConfig,
}

impl Formatter for BlueprintFormatter {
    fn name(&self) -> &str {
        "bp"
    }

    fn serialize(&self, tree: &SyntaxTree) -> Result<String, FormatError> {
        Ok(print_with_config(tree, &self.config))
    }

    fn description(&self) -> &str {
        "Canonical Blueprint source"
    }
}

struct Printer<'t> {
    comments: &'t CommentTable,
    config: FormatConfig,
    out: String,
    indents: Vec<usize>,
    pending: Whitespace,
    /// `//` comments waiting for the end of the line
    skipped: Vec<&'t Comment>,
    /// Depth of constructs that must stay on one line
    no_break: usize,
    after_open: bool,
}

impl<'t> Printer<'t> {
    fn new(comments: &'t CommentTable, config: FormatConfig) -> Self {
        Self {
            comments,
            config,
            out: String::new(),
            indents: Vec::new(),
            pending: Whitespace::DontCare,
            skipped: Vec::new(),
            no_break: 0,
            after_open: false,
        }
    }

    fn finish(mut self) -> String {
        self.flush_skipped();
        let len = self.out.trim_end().len();
        self.out.truncate(len);
        self.out.push('\n');
        self.out
    }

    // ----- whitespace and tokens -----

    fn indent(&self) -> usize {
        self.indents.last().copied().unwrap_or(0)
    }

    fn push_indent(&mut self) {
        self.indents.push(self.indent() + INDENT);
    }

    fn pop_indent(&mut self) {
        self.indents.pop();
    }

    fn request(&mut self, ws: Whitespace) {
        self.pending = self.pending.max(ws);
    }

    fn flush(&mut self) {
        let ws = std::mem::replace(&mut self.pending, Whitespace::DontCare);
        match ws {
            Whitespace::DontCare => {}
            Whitespace::Space => self.space(),
            Whitespace::Newline | Whitespace::BlankLine => {
                // no leading blank lines
                if self.out.is_empty() {
                    return;
                }
                self.flush_skipped();
                self.out.push('\n');
                if ws == Whitespace::BlankLine && !self.after_open {
                    self.out.push('\n');
                }
                let indent = self.indent();
                self.out.extend(std::iter::repeat(' ').take(indent));
            }
        }
    }

    fn space(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with(' ') {
            self.out.push(' ');
        }
    }

    fn flush_skipped(&mut self) {
        for comment in std::mem::take(&mut self.skipped) {
            self.space();
            self.out.push_str(&comment.text);
        }
    }

    fn token(&mut self, text: &str) {
        self.flush();
        self.out.push_str(text);
        self.after_open = false;
    }

    /// A token that never takes a space before it
    fn punct(&mut self, text: &str) {
        if self.pending == Whitespace::Space {
            self.pending = Whitespace::DontCare;
        }
        self.token(text);
    }

    fn open(&mut self, text: &str) {
        self.token(text);
        self.push_indent();
        self.after_open = true;
    }

    fn close(&mut self, text: &str) {
        self.pop_indent();
        self.request(Whitespace::Newline);
        self.token(text);
    }

    // ----- comments -----

    fn comment(&mut self, comment: &'t Comment) {
        if comment.is_blank_line() {
            self.request(Whitespace::BlankLine);
            return;
        }
        if comment.own_line {
            self.request(Whitespace::Newline);
            self.flush();
            self.write_comment(comment);
            self.request(Whitespace::Newline);
            return;
        }
        if self.no_break > 0 && comment.ends_line() {
            self.skipped.push(comment);
            return;
        }
        // hug: stay on the current line, keep whatever break was pending
        let after = std::mem::replace(&mut self.pending, Whitespace::DontCare);
        if !self.out.ends_with('[') {
            self.space();
        }
        self.write_comment(comment);
        self.pending = after;
        self.request(if comment.ends_line() {
            Whitespace::Newline
        } else {
            Whitespace::Space
        });
    }

    fn write_comment(&mut self, comment: &Comment) {
        self.out.push_str(&comment.text);
        self.after_open = false;
    }

    fn pre(&mut self, id: NodeId) {
        let comments = self.comments;
        for comment in comments.pre(id) {
            self.comment(comment);
        }
    }

    fn post(&mut self, id: NodeId) {
        let comments = self.comments;
        for comment in comments.post(id) {
            self.comment(comment);
        }
    }

    /// Container pre-comments written after the opening bracket
    fn inside_comments(&self, id: NodeId, open: Position) -> Vec<&'t Comment> {
        self.comments
            .pre(id)
            .iter()
            .filter(|c| c.pos.offset >= open.offset)
            .collect()
    }

    /// Print container pre-comments written before the opening bracket
    fn outside_comments(&mut self, id: NodeId, open: Position) {
        let comments = self.comments;
        for comment in comments.pre(id).iter().filter(|c| c.pos.offset < open.offset) {
            self.comment(comment);
        }
    }

    // ----- tree -----

    fn tree(&mut self, tree: &'t SyntaxTree) {
        for node in &tree.nodes {
            match node {
                Node::Comment(comment) => self.comment(comment),
                Node::Definition(def) => self.definition(def),
            }
        }
    }

    fn definition(&mut self, def: &'t Definition) {
        self.pre(def.id());
        self.request(Whitespace::Newline);
        let after = match def {
            Definition::Assignment(assignment) => {
                self.assignment(assignment);
                Whitespace::Newline
            }
            Definition::Module(module) => {
                self.module(module);
                if self.config.blank_line_after_module {
                    Whitespace::BlankLine
                } else {
                    Whitespace::Newline
                }
            }
        };
        self.request(after);
        self.post(def.id());
    }

    fn assignment(&mut self, assignment: &'t Assignment) {
        self.token(&assignment.name);
        self.request(Whitespace::Space);
        self.token(assignment.assigner.as_str());
        self.request(Whitespace::Space);
        self.expression(&assignment.orig_value);
    }

    fn module(&mut self, module: &'t Module) {
        self.token(&module.type_name);
        self.request(Whitespace::Space);
        self.outside_comments(module.map.id, module.map.lbrace);
        let inside = self.inside_comments(module.map.id, module.map.lbrace);
        self.map(&module.map, inside);
    }

    fn map(&mut self, map: &'t Map, inside: Vec<&'t Comment>) {
        if map.properties.is_empty() && inside.is_empty() {
            self.token("{}");
            return;
        }
        self.open("{");
        for comment in inside {
            self.comment(comment);
        }
        for property in &map.properties {
            let comments = self.comments;
            let (after_name, before_name): (Vec<&Comment>, Vec<&Comment>) = comments
                .pre(property.id)
                .iter()
                .partition(|c| c.pos.offset > property.name_pos.offset);
            for comment in before_name {
                self.comment(comment);
            }
            self.request(Whitespace::Newline);
            self.token(&property.name);
            for comment in after_name {
                self.comment(comment);
            }
            self.punct(":");
            self.request(Whitespace::Space);
            self.expression(&property.value);
            self.punct(",");
            self.post(property.id);
        }
        self.close("}");
    }

    fn expression(&mut self, expr: &'t Expression) {
        let inside = self.expression_pre(expr);
        self.expression_body(expr, inside);
        self.post(expr.id());
    }

    /// Print what comes before `expr`; returns the comments that go inside its brackets
    fn expression_pre(&mut self, expr: &'t Expression) -> Vec<&'t Comment> {
        match expr {
            Expression::List(list) => {
                self.outside_comments(list.id, list.lbracket);
                self.inside_comments(list.id, list.lbracket)
            }
            Expression::Map(map) => {
                self.outside_comments(map.id, map.lbrace);
                self.inside_comments(map.id, map.lbrace)
            }
            _ => {
                self.pre(expr.id());
                Vec::new()
            }
        }
    }

    fn expression_body(&mut self, expr: &'t Expression, inside: Vec<&'t Comment>) {
        match expr {
            Expression::Bool(b) => self.token(if b.value { "true" } else { "false" }),
            Expression::String(s) => self.token(&quote(&s.value)),
            Expression::Int64(i) => self.token(&i.value.to_string()),
            Expression::List(list) => self.list(list, inside),
            Expression::Map(map) => self.map(map, inside),
            Expression::Variable(variable) => self.token(&variable.name),
            Expression::Operator(op) => self.operator(op, true),
            Expression::NotEvaluated(_) => {
                panic!("internal error: cannot print an unevaluated placeholder")
            }
        }
    }

    fn list(&mut self, list: &'t List, inside: Vec<&'t Comment>) {
        if !self.list_is_multiline(list, &inside) {
            self.token("[");
            self.no_break += 1;
            for comment in inside {
                self.comment(comment);
            }
            for (i, value) in list.values.iter().enumerate() {
                if i > 0 {
                    self.punct(",");
                    self.request(Whitespace::Space);
                }
                self.expression(value);
            }
            self.no_break -= 1;
            self.punct("]");
            return;
        }

        self.open("[");
        for comment in inside {
            self.comment(comment);
        }
        for value in &list.values {
            let inner = self.expression_pre(value);
            self.request(Whitespace::Newline);
            self.expression_body(value, inner);
            self.punct(",");
            self.post(value.id());
        }
        self.close("]");
    }

    fn operator(&mut self, op: &'t Operator, allow_indent: bool) {
        let (left, right) = (&op.args[0], &op.args[1]);
        self.expression(left);
        self.request(Whitespace::Space);
        self.token(&op.operator.to_string());

        let broken = right.pos().line > left.end().line;
        let indented = broken && allow_indent;
        if indented {
            self.push_indent();
        }
        self.request(if broken {
            Whitespace::Newline
        } else {
            Whitespace::Space
        });
        match right {
            Expression::Operator(inner) => {
                self.pre(inner.id);
                self.operator(inner, false);
                self.post(inner.id);
            }
            _ => self.expression(right),
        }
        if indented {
            self.pop_indent();
        }
    }

    // ----- layout decisions -----

    fn list_is_multiline(&self, list: &List, inside: &[&Comment]) -> bool {
        if inside.iter().any(|c| c.own_line || c.ends_line()) {
            return true;
        }
        let split = list.lbracket.line != list.rbracket.line;
        match list.values.as_slice() {
            [] => split,
            [only] => {
                self.config.list_layout == ListLayout::Expand
                    || split
                    || self.prints_multiline(only)
            }
            _ => true,
        }
    }

    fn prints_multiline(&self, expr: &Expression) -> bool {
        match expr {
            Expression::Map(map) => {
                !map.properties.is_empty() || !self.inside_comments(map.id, map.lbrace).is_empty()
            }
            Expression::List(list) => {
                let inside = self.inside_comments(list.id, list.lbracket);
                self.list_is_multiline(list, &inside)
            }
            Expression::Operator(op) => {
                op.args[1].pos().line > op.args[0].end().line
                    || op.args.iter().any(|arg| self.prints_multiline(arg))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bp::ast::{Comment, Property};

    fn pos(line: usize, column: usize) -> Position {
        Position::new(line * 100 + column, line, column)
    }

    fn module(properties: Vec<Property>) -> SyntaxTree {
        let mut tree = SyntaxTree::new("Android.bp");
        tree.add_definition(Definition::Module(Module::new(
            "cc_library",
            pos(1, 1),
            Map::new(properties, pos(1, 12), pos(9, 1)),
        )));
        tree
    }

    #[test]
    fn test_empty_tree_prints_single_newline() {
        assert_eq!(print_tree(&SyntaxTree::new("empty.bp")), "\n");
    }

    #[test]
    fn test_whitespace_ordering() {
        assert!(Whitespace::BlankLine > Whitespace::Newline);
        assert!(Whitespace::Newline > Whitespace::Space);
        assert!(Whitespace::Space > Whitespace::DontCare);
    }

    #[test]
    fn test_programmatic_module() {
        let tree = module(vec![
            Property::new("name", pos(2, 5), Expression::string("libfoo", pos(2, 11))),
            Property::new(
                "srcs",
                pos(3, 5),
                Expression::list(
                    vec![Expression::string("a.c", pos(4, 9)), Expression::string("b.c", pos(5, 9))],
                    pos(3, 11),
                    pos(6, 5),
                ),
            ),
            Property::new(
                "shared",
                pos(7, 5),
                Expression::list(vec![Expression::string("x", pos(7, 14))], pos(7, 13), pos(7, 17)),
            ),
        ]);
        assert_eq!(
            print_tree(&tree),
            "cc_library {\n    name: \"libfoo\",\n    srcs: [\n        \"a.c\",\n        \"b.c\",\n    ],\n    shared: [\"x\"],\n}\n"
        );
    }

    #[test]
    fn test_expand_layout_splits_single_element_lists() {
        let tree = module(vec![Property::new(
            "shared",
            pos(2, 5),
            Expression::list(vec![Expression::string("x", pos(2, 14))], pos(2, 13), pos(2, 17)),
        )]);
        let config = FormatConfig {
            list_layout: ListLayout::Expand,
            ..FormatConfig::default()
        };
        assert_eq!(
            print_with_config(&tree, &config),
            "cc_library {\n    shared: [\n        \"x\",\n    ],\n}\n"
        );
    }

    #[test]
    fn test_line_comment_in_inline_list_moves_to_line_end() {
        let mut tree = module(vec![Property::new(
            "shared",
            pos(2, 5),
            Expression::list(vec![Expression::string("x", pos(2, 14))], pos(2, 13), pos(2, 17)),
        )]);
        let element = tree.modules().next().unwrap().map.properties[0]
            .value
            .as_list()
            .unwrap()
            .values[0]
            .id();
        tree.comments
            .get_comments(element)
            .post
            .push(Comment::line("// only", pos(2, 18)).with_own_line(false));
        assert_eq!(
            print_tree(&tree),
            "cc_library {\n    shared: [\"x\"], // only\n}\n"
        );
    }

    #[test]
    #[should_panic(expected = "unevaluated placeholder")]
    fn test_not_evaluated_is_fatal() {
        let tree = module(vec![Property::new(
            "x",
            pos(2, 5),
            Expression::not_evaluated(pos(2, 8)),
        )]);
        print_tree(&tree);
    }
}
