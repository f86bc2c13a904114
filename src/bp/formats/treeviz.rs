//! Treeviz formatter for syntax trees
//!
//! One line per node, nesting drawn with box connectors, so a file's structure can be
//! scanned at a glance. Labels are truncated to 30 characters.
//!
//!     <prefix><connector> <icon> <label>
//!
//! Example:
//!
//!     ⧉ Android.bp
//!     ├─ ≔ srcs = […]
//!     │ └─ ☰ 2 items
//!     │   ├─ ◦ "a.c"
//!     │   └─ ◦ "b.c"
//!     └─ ▣ cc_library
//!       └─ { 1 properties
//!         └─ : name
//!           └─ ◦ "libfoo"
//!
//! Icons
//!     File: ⧉
//!     Assignment: ≔
//!     Module: ▣
//!     Map: {
//!     Property: :
//!     List: ☰
//!     String: ◦
//!     Int64: #
//!     Bool: ◇
//!     Variable: $
//!     Operator: +
//!     Comment: ¶
//!
//! Nodes that carry comments get a `(n comments)` suffix. With `show_linum`, every line
//! starts with the node's source line.

use super::{FormatError, Formatter};
use crate::bp::ast::{CommentTable, Expression, Node, NodeRef, SyntaxTree};

const MAX_LABEL: usize = 30;

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

fn icon(node: &NodeRef<'_>) -> &'static str {
    match node.kind() {
        "Assignment" => "≔",
        "Module" => "▣",
        "Map" => "{",
        "Property" => ":",
        "List" => "☰",
        "String" => "◦",
        "Int64" => "#",
        "Bool" => "◇",
        "Variable" => "$",
        "Operator" => "+",
        "Comment" => "¶",
        _ => "○",
    }
}

fn label(node: &NodeRef<'_>) -> String {
    match node {
        NodeRef::Assignment(a) => format!("{} {} …", a.name, a.assigner),
        NodeRef::Module(m) => m.type_name.clone(),
        NodeRef::Map(m) => format!("{} properties", m.properties.len()),
        NodeRef::Property(p) => p.name.clone(),
        NodeRef::Comment(c) if c.is_blank_line() => "(blank line)".to_string(),
        NodeRef::Comment(c) => c.text.clone(),
        NodeRef::Expression(e) => match e {
            Expression::Bool(b) => b.value.to_string(),
            Expression::String(s) => format!("{:?}", s.value),
            Expression::Int64(i) => i.value.to_string(),
            Expression::List(l) => format!("{} items", l.values.len()),
            Expression::Map(m) => format!("{} properties", m.properties.len()),
            Expression::Variable(v) => v.name.clone(),
            Expression::Operator(o) => o.operator.to_string(),
            Expression::NotEvaluated(_) => "not evaluated".to_string(),
        },
    }
}

struct Renderer<'t> {
    comments: &'t CommentTable,
    show_linum: bool,
    out: String,
}

impl Renderer<'_> {
    fn node(&mut self, node: NodeRef<'_>, prefix: &str, is_last: bool) {
        let connector = if is_last { "└─" } else { "├─" };
        if self.show_linum {
            self.out.push_str(&format!("{:02} ", node.pos().line));
        }
        self.out.push_str(&format!(
            "{}{} {} {}",
            prefix,
            connector,
            icon(&node),
            truncate(&label(&node), MAX_LABEL)
        ));
        let attached = self
            .comments
            .get(node.id())
            .map(|pair| pair.iter().filter(|c| !c.is_blank_line()).count())
            .unwrap_or(0);
        if attached > 0 {
            self.out.push_str(&format!(" ({attached} comments)"));
        }
        self.out.push('\n');

        let children = node.children();
        let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.node(child, &child_prefix, i + 1 == count);
        }
    }
}

pub fn to_treeviz_str(tree: &SyntaxTree) -> String {
    to_treeviz_str_with_linum(tree, false)
}

pub fn to_treeviz_str_with_linum(tree: &SyntaxTree, show_linum: bool) -> String {
    let mut renderer = Renderer {
        comments: &tree.comments,
        show_linum,
        out: format!("⧉ {}\n", tree.name),
    };
    let count = tree.nodes.len();
    for (i, node) in tree.nodes.iter().enumerate() {
        let node = match node {
            Node::Definition(def) => NodeRef::from(def),
            Node::Comment(comment) => NodeRef::Comment(comment),
        };
        renderer.node(node, "", i + 1 == count);
    }
    renderer.out
}

/// Formatter implementation for treeviz format
#[derive(Debug, Clone, Copy, Default)]
pub struct TreevizFormatter;

impl Formatter for TreevizFormatter {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn serialize(&self, tree: &SyntaxTree) -> Result<String, FormatError> {
        Ok(to_treeviz_str(tree))
    }

    fn description(&self) -> &str {
        "Visual tree representation with connectors and Unicode icons"
    }
}
