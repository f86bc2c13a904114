//! Comments and the comment side table
//!
//! Comments are not stored inside syntax nodes. A [`CommentTable`] maps a node's
//! [`NodeId`] to a [`CommentPair`]: the comments printed immediately before the node and
//! the comments printed immediately after it. Keeping them outside the nodes lets the
//! parser and the mutation helpers replace or move a node and carry its commentary along
//! with one table operation.
//!
//! Blank lines
//!
//!     Vertical whitespace the author left between items is recorded as a
//!     [`CommentKind::BlankLine`] marker: a comment with no text. Markers travel through
//!     the table exactly like real comments so that spacing survives reordering.
//!
//! Containers
//!
//!     For maps and lists the pre-comments are printed inside the opening bracket. The
//!     parser only puts comments there when the container body has no items to carry them.

use super::node::NodeRef;
use super::node_id::NodeId;
use super::position::Position;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommentKind {
    /// `// ...` up to the end of the line
    Line,
    /// `/* ... */`, possibly spanning lines
    Block,
    /// A preserved blank line
    BlankLine,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: NodeId,
    pub kind: CommentKind,
    /// Full comment text including its delimiters; empty for blank-line markers
    pub text: String,
    pub pos: Position,
    pub end: Position,
    /// Whether the comment started on a line of its own
    pub own_line: bool,
}

impl Comment {
    pub fn new(kind: CommentKind, text: impl Into<String>, pos: Position, end: Position) -> Self {
        Self {
            id: NodeId::fresh_comment(),
            kind,
            text: text.into(),
            pos,
            end,
            own_line: true,
        }
    }

    /// A `//` comment starting at `pos`
    pub fn line(text: impl Into<String>, pos: Position) -> Self {
        let text = text.into();
        let end = Position::new(
            pos.offset + text.len(),
            pos.line,
            pos.column + text.chars().count(),
        );
        Self::new(CommentKind::Line, text, pos, end)
    }

    /// A blank-line marker for the line at `pos`
    pub fn blank_line(pos: Position) -> Self {
        Self::new(CommentKind::BlankLine, "", pos, pos)
    }

    pub fn with_own_line(mut self, own_line: bool) -> Self {
        self.own_line = own_line;
        self
    }

    pub fn is_blank_line(&self) -> bool {
        self.kind == CommentKind::BlankLine
    }

    /// Whether the comment text forces the rest of its line to be comment
    pub fn ends_line(&self) -> bool {
        self.kind == CommentKind::Line
    }

    pub fn shift(&mut self, lines: isize, offset: isize) {
        self.pos = self.pos.shifted(lines, offset);
        self.end = self.end.shifted(lines, offset);
    }
}

/// Comments printed immediately before and after one node
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommentPair {
    pub pre: Vec<Comment>,
    pub post: Vec<Comment>,
}

impl CommentPair {
    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.post.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Comment> {
        self.pre.iter().chain(self.post.iter())
    }
}

/// Side table from node identity to the comments around that node
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommentTable {
    entries: BTreeMap<NodeId, CommentPair>,
}

impl CommentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The comments of `id`, without allocating an entry
    pub fn get(&self, id: NodeId) -> Option<&CommentPair> {
        self.entries.get(&id)
    }

    pub fn pre(&self, id: NodeId) -> &[Comment] {
        self.entries.get(&id).map_or(&[], |pair| pair.pre.as_slice())
    }

    pub fn post(&self, id: NodeId) -> &[Comment] {
        self.entries.get(&id).map_or(&[], |pair| pair.post.as_slice())
    }

    /// The comments of `id`, allocating an empty pair on first access
    ///
    /// # Panics
    ///
    /// Panics if `id` identifies a comment: comments cannot carry comments.
    pub fn get_comments(&mut self, id: NodeId) -> &mut CommentPair {
        if id.is_comment() {
            panic!("internal error: requested comments for comment node {id}");
        }
        self.entries.entry(id).or_default()
    }

    /// Transplant every comment of `from` onto `to` and clear `from`
    ///
    /// The moved pre-comments go before any `to` already has; the moved post-comments
    /// go after.
    pub fn move_comments(&mut self, from: NodeId, to: NodeId) {
        if from == to {
            return;
        }
        let Some(moved) = self.entries.remove(&from) else {
            return;
        };
        if moved.is_empty() {
            return;
        }
        let target = self.get_comments(to);
        let mut pre = moved.pre;
        pre.append(&mut target.pre);
        target.pre = pre;
        target.post.extend(moved.post);
    }

    /// Remove the entry of `id`, returning its comments
    pub fn remove(&mut self, id: NodeId) -> Option<CommentPair> {
        self.entries.remove(&id)
    }

    /// Remove and return, in document order, every comment attached inside `node`
    ///
    /// Order is pre-order: the node's pre-comments, then each child recursively, then the
    /// node's post-comments.
    pub fn pull_all_comments_recursively(&mut self, node: NodeRef<'_>) -> Vec<Comment> {
        let mut pulled = Vec::new();
        self.pull_into(node, &mut pulled);
        pulled
    }

    fn pull_into(&mut self, node: NodeRef<'_>, pulled: &mut Vec<Comment>) {
        let pair = self.entries.remove(&node.id()).unwrap_or_default();
        pulled.extend(pair.pre);
        for child in node.children() {
            self.pull_into(child, pulled);
        }
        pulled.extend(pair.post);
    }

    /// Shift the positions of every comment attached directly to `id`
    pub fn shift_comments(&mut self, id: NodeId, lines: isize, offset: isize) {
        if let Some(pair) = self.entries.get_mut(&id) {
            for comment in pair.pre.iter_mut().chain(pair.post.iter_mut()) {
                comment.shift(lines, offset);
            }
        }
    }

    /// Identities of nodes that have at least one comment
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries
            .iter()
            .filter(|(_, pair)| !pair.is_empty())
            .map(|(id, _)| *id)
    }

    /// Every attached comment, grouped by node identity order
    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.entries.values().flat_map(CommentPair::iter)
    }

    pub fn len(&self) -> usize {
        self.ids().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(NodeId) -> bool) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|id, pair| !pair.is_empty() && keep(*id));
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bp::ast::{Expression, Position};

    fn pos(line: usize) -> Position {
        Position::new(line * 10, line, 1)
    }

    #[test]
    fn test_get_comments_allocates() {
        let mut table = CommentTable::new();
        let id = NodeId::fresh();
        assert!(table.get(id).is_none());
        table.get_comments(id).pre.push(Comment::line("// a", pos(1)));
        assert_eq!(table.pre(id).len(), 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    #[should_panic(expected = "requested comments for comment node")]
    fn test_comments_on_comment_panics() {
        let mut table = CommentTable::new();
        let comment = Comment::line("// a", pos(1));
        table.get_comments(comment.id);
    }

    #[test]
    fn test_move_comments() {
        let mut table = CommentTable::new();
        let (old, new) = (NodeId::fresh(), NodeId::fresh());
        table.get_comments(old).pre.push(Comment::line("// old pre", pos(1)));
        table.get_comments(old).post.push(Comment::line("// old post", pos(2)));
        table.get_comments(new).pre.push(Comment::line("// new pre", pos(3)));

        table.move_comments(old, new);

        assert!(table.get(old).is_none());
        let texts: Vec<_> = table.pre(new).iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["// old pre", "// new pre"]);
        assert_eq!(table.post(new)[0].text, "// old post");
    }

    #[test]
    fn test_pull_all_comments_recursively_is_preorder() {
        let mut table = CommentTable::new();
        let child = Expression::string("a", pos(2));
        let list = Expression::list(vec![child.copy()], pos(1), pos(3));
        let child_id = list.as_list().unwrap().values[0].id();

        table.get_comments(list.id()).pre.push(Comment::line("// 1", pos(1)));
        table.get_comments(child_id).pre.push(Comment::line("// 2", pos(2)));
        table.get_comments(child_id).post.push(Comment::line("// 3", pos(2)));
        table.get_comments(list.id()).post.push(Comment::line("// 4", pos(3)));

        let pulled = table.pull_all_comments_recursively(NodeRef::Expression(&list));
        let texts: Vec<_> = pulled.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["// 1", "// 2", "// 3", "// 4"]);
        assert!(table.is_empty());
    }
}
