//! Recursive-descent parser
//!
//! The parser pulls lexemes from the [`Scanner`], builds definitions and expressions,
//! and places every comment it reads into the comment table (or, at top level, into
//! the node list).
//!
//! Newline state
//!
//!     Between two tokens the scanner reports how many line breaks it skipped. Two or
//!     more mean the author left a blank line, which becomes a blank-line marker in the
//!     pending comment list unless one of these rules drops it:
//!
//!     - `skip_newline`: set at the start of the file and after `{`, `[` and `(`. The
//!       blank lines right after an opening bracket are implied.
//!     - a blank line directly before a closing bracket is dropped, unless
//!       `allow_double_newline` is set because a block comment came right before it.
//!     - at end of input the marker is dropped; after a block comment it is kept in the
//!       tree's ignored list.
//!
//!     Both flags are consumed by the next lexeme read, comment or not.
//!
//! Comment placement
//!
//!     Pending comments are handed out whenever an item (definition, property, list
//!     element) starts or a body closes. Comments on the same line as the previous item
//!     go to that item's post-comments; the rest go to the next item's pre-comments, or
//!     to the previous item's post-comments when the body closes. In a body without
//!     items they become the container's pre-comments. At top level, comments that are
//!     separated from the next definition by a blank line stay standalone nodes.
//!
//! Errors
//!
//!     Errors accumulate until the configured threshold is reached; then [`Abort`]
//!     unwinds the whole parse through `?`. Syntax errors always abort, since the
//!     grammar has no recovery points.

use super::error::{ParseError, ParseErrorKind};
use super::eval::{evaluate_operator, operator};
use crate::bp::ast::{
    Assigner, Assignment, Bool, Comment, CommentKind, CommentTable, DanglingPolicy, Definition,
    Expression, Int64, InvariantError, List, Map, Module, Node, NodeId, Position, Property, Str,
    SyntaxTree, Variable,
};
use crate::bp::config::ParseConfig;
use crate::bp::lexing::{Lexeme, Scanner, Token};
use crate::bp::scope::Scope;
use tracing::{debug, trace};

/// Too many errors; unwind the parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Abort;

type PResult<T> = Result<T, Abort>;

pub(crate) struct Parser<'a, 's> {
    filename: String,
    scanner: Scanner<'a>,
    tok: Lexeme,
    config: ParseConfig,
    scope: &'s mut Scope,
    errors: Vec<ParseError>,

    nodes: Vec<Node>,
    comments: CommentTable,
    pending: Vec<Comment>,
    ignored: Vec<Comment>,
    comments_read: usize,

    pending_newlines: usize,
    skip_newline: bool,
    allow_double_newline: bool,
    seen_token: bool,
}

impl<'a, 's> Parser<'a, 's> {
    pub(crate) fn new(
        filename: &str,
        source: &'a str,
        scope: &'s mut Scope,
        config: ParseConfig,
    ) -> Self {
        Self {
            filename: filename.to_string(),
            scanner: Scanner::new(source),
            tok: Lexeme {
                token: None,
                pos: Position::default(),
                end: Position::default(),
                newlines_before: 0,
            },
            config,
            scope,
            errors: Vec::new(),
            nodes: Vec::new(),
            comments: CommentTable::new(),
            pending: Vec::new(),
            ignored: Vec::new(),
            comments_read: 0,
            pending_newlines: 0,
            skip_newline: true,
            allow_double_newline: false,
            seen_token: false,
        }
    }

    /// Parse the whole input
    pub(crate) fn parse(mut self) -> (SyntaxTree, Vec<ParseError>) {
        debug!(file = %self.filename, eval = self.config.eval, "parsing");
        if self.parse_file().is_err() {
            debug!(file = %self.filename, errors = self.errors.len(), "parse aborted");
        }
        self.finish()
    }

    fn finish(mut self) -> (SyntaxTree, Vec<ParseError>) {
        let mut tree = SyntaxTree {
            name: self.filename.clone(),
            nodes: std::mem::take(&mut self.nodes),
            comments: std::mem::take(&mut self.comments),
            ignored: std::mem::take(&mut self.ignored),
        };
        self.write_back_bindings(&mut tree);

        if self.errors.is_empty() {
            let placed = tree.comment_count();
            if placed != self.comments_read {
                let err = InvariantError::LostComments {
                    read: self.comments_read,
                    placed,
                };
                panic!("internal error: {err}");
            }
            if let Err(err) = tree.confirm_all_nodes_have_positions() {
                panic!("internal error: {err}");
            }
            tree.finalize(self.config.dangling);
        } else {
            tree.finalize(DanglingPolicy::Lenient);
        }

        debug!(
            file = %self.filename,
            nodes = tree.nodes.len(),
            errors = self.errors.len(),
            "parsed"
        );
        (tree, self.errors)
    }

    /// Copy evaluated values and reference flags from the scope into the tree
    fn write_back_bindings(&self, tree: &mut SyntaxTree) {
        for def in tree.defs_mut() {
            let Definition::Assignment(assignment) = def else {
                continue;
            };
            if assignment.assigner != Assigner::Set {
                continue;
            }
            if let Some((bound, true)) = self.scope.get(&assignment.name) {
                if bound.id == assignment.id {
                    assignment.value = bound.value.clone();
                    assignment.referenced = bound.referenced;
                }
            }
        }
    }

    // ----- errors -----

    fn error(&mut self, pos: Position, err: ParseErrorKind) -> PResult<()> {
        self.errors.push(ParseError {
            filename: self.filename.clone(),
            pos,
            err,
        });
        if self.errors.len() >= self.config.max_errors.max(1) {
            debug!(file = %self.filename, errors = self.errors.len(), "too many errors");
            return Err(Abort);
        }
        Ok(())
    }

    fn syntax_error<T>(&mut self, expected: &str) -> PResult<T> {
        let found = match &self.tok.token {
            Some(token) => token.describe(),
            None => "EOF".to_string(),
        };
        let pos = self.tok.pos;
        self.error(
            pos,
            ParseErrorKind::Unexpected {
                expected: expected.to_string(),
                found,
            },
        )?;
        Err(Abort)
    }

    // ----- token stream -----

    /// Move to the next non-comment token, collecting comments and blank lines
    fn next(&mut self) -> PResult<()> {
        loop {
            let lexeme = match self.scanner.next_lexeme() {
                Ok(lexeme) => lexeme,
                Err(scan_error) => {
                    self.error(scan_error.pos, scan_error.error.into())?;
                    continue;
                }
            };
            self.note_gap(&lexeme);
            let own_line = self.pending_newlines > 0 || !self.seen_token;
            self.seen_token = true;

            let (kind, text) = match lexeme.token {
                Some(Token::LineComment(text)) => (CommentKind::Line, text),
                Some(Token::BlockComment(text)) => {
                    self.allow_double_newline = true;
                    (CommentKind::Block, text)
                }
                _ => {
                    self.tok = lexeme;
                    return Ok(());
                }
            };
            self.comments_read += 1;
            self.pending.push(
                Comment::new(kind, text, lexeme.pos, lexeme.end).with_own_line(own_line),
            );
        }
    }

    /// Apply the newline rules to the gap before `lexeme`
    fn note_gap(&mut self, lexeme: &Lexeme) {
        self.pending_newlines = lexeme.newlines_before;
        let skip = std::mem::take(&mut self.skip_newline);
        let allow_double = std::mem::take(&mut self.allow_double_newline);
        if self.pending_newlines < 2 || skip {
            return;
        }

        let marker = Comment::blank_line(Position::new(
            lexeme.pos.offset.saturating_sub(lexeme.pos.column),
            lexeme.pos.line.saturating_sub(1),
            1,
        ));
        match &lexeme.token {
            None => {
                if allow_double {
                    trace!(line = marker.pos.line, "ignored blank line at end of file");
                    self.ignored.push(marker);
                }
            }
            Some(Token::RBrace | Token::RBracket | Token::RParen) if !allow_double => {}
            Some(_) => {
                trace!(line = marker.pos.line, "blank line");
                self.pending.push(marker);
            }
        }
    }

    /// Consume an opening bracket; the blank lines right after it are implied
    fn next_after_open(&mut self) -> PResult<()> {
        self.skip_newline = true;
        self.next()
    }

    fn at(&self, token: &Token) -> bool {
        self.tok.token.as_ref() == Some(token)
    }

    fn expect(&mut self, token: Token) -> PResult<Position> {
        if !self.at(&token) {
            return self.syntax_error(&format!("{:?}", token.to_string()));
        }
        let pos = self.tok.pos;
        self.next()?;
        Ok(pos)
    }

    fn expect_ident(&mut self) -> PResult<(String, Position)> {
        match &self.tok.token {
            Some(Token::Ident(name)) => {
                let ident = (name.clone(), self.tok.pos);
                self.next()?;
                Ok(ident)
            }
            _ => self.syntax_error("identifier"),
        }
    }

    // ----- comment placement -----

    fn attach_pre(&mut self, id: NodeId, comments: Vec<Comment>) {
        if comments.is_empty() {
            return;
        }
        let pre = &mut self.comments.get_comments(id).pre;
        pre.splice(0..0, comments);
    }

    fn attach_post(&mut self, id: NodeId, comments: Vec<Comment>) {
        if comments.is_empty() {
            return;
        }
        self.comments.get_comments(id).post.extend(comments);
    }

    // ----- grammar -----

    fn parse_file(&mut self) -> PResult<()> {
        self.next()?;
        let mut prev: Option<NodeId> = None;
        loop {
            let (trailing, mut rest) = split_trailing(std::mem::take(&mut self.pending));
            match prev {
                Some(id) => self.attach_post(id, trailing),
                None => {
                    rest.splice(0..0, trailing);
                }
            }

            let leading = match &self.tok.token {
                None => {
                    self.nodes.extend(rest.into_iter().map(Node::Comment));
                    return Ok(());
                }
                Some(Token::Ident(_)) => {
                    let (standalone, leading) = split_at_last_blank(rest);
                    self.nodes.extend(standalone.into_iter().map(Node::Comment));
                    leading
                }
                Some(_) => {
                    self.nodes.extend(rest.into_iter().map(Node::Comment));
                    return self.syntax_error("assignment or module definition");
                }
            };

            let def = self.parse_definition()?;
            self.attach_pre(def.id(), leading);
            prev = Some(def.id());
            self.nodes.push(Node::Definition(def));
        }
    }

    fn parse_definition(&mut self) -> PResult<Definition> {
        let (name, name_pos) = self.expect_ident()?;
        match self.tok.token {
            Some(Token::Equals) => self.parse_assignment(name, name_pos, Assigner::Set),
            Some(Token::PlusEquals) => self.parse_assignment(name, name_pos, Assigner::Append),
            Some(Token::LBrace | Token::LParen) => self.parse_module(name, name_pos),
            _ => self.syntax_error(r#""=" or "+=" or "{" or "(""#),
        }
    }

    fn parse_assignment(
        &mut self,
        name: String,
        name_pos: Position,
        assigner: Assigner,
    ) -> PResult<Definition> {
        let equals_pos = self.tok.pos;
        self.next()?;
        let orig_value = self.parse_expression()?;
        let assignment = Assignment {
            id: NodeId::fresh(),
            name,
            name_pos,
            value: orig_value.copy(),
            orig_value,
            equals_pos,
            assigner,
            referenced: false,
        };

        match assigner {
            Assigner::Set => {
                if let Err(err) = self.scope.add(assignment.clone()) {
                    self.error(name_pos, err.into())?;
                }
            }
            Assigner::Append => self.append_to_variable(&assignment)?,
        }
        Ok(Definition::Assignment(assignment))
    }

    /// Apply `name += value` to the local binding of `name`
    fn append_to_variable(&mut self, assignment: &Assignment) -> PResult<()> {
        let name = &assignment.name;
        let old_value = match self.scope.get(name) {
            None => Err(ParseErrorKind::ModifiedNonExistent(name.clone())),
            Some((_, false)) => Err(ParseErrorKind::ModifiedNonLocal(name.clone())),
            Some((old, true)) if old.referenced => {
                Err(ParseErrorKind::ModifiedAfterReference(name.clone()))
            }
            Some((old, true)) => Ok(old.value.clone()),
        };
        let old_value = match old_value {
            Ok(value) => value,
            Err(err) => return self.error(assignment.name_pos, err),
        };

        let mut op = operator(old_value, assignment.value.copy(), '+', assignment.equals_pos);
        match evaluate_operator(&mut op, self.config.eval) {
            Ok(()) => {
                if self.config.eval {
                    self.scope.set_local_value(name, Expression::Operator(op));
                }
                Ok(())
            }
            Err(err) => self.error(assignment.equals_pos, err),
        }
    }

    fn parse_module(&mut self, type_name: String, type_pos: Position) -> PResult<Definition> {
        let compat = self.at(&Token::LParen);
        let (close, separator) = if compat {
            (Token::RParen, Token::Equals)
        } else {
            (Token::RBrace, Token::Colon)
        };
        let map = self.parse_map_body(close, separator)?;
        Ok(Definition::Module(Module {
            id: NodeId::fresh(),
            type_name,
            type_pos,
            map,
        }))
    }

    /// Parse `open property, ... close` with the current token on `open`
    fn parse_map_body(&mut self, close: Token, separator: Token) -> PResult<Map> {
        let id = NodeId::fresh();
        let lbrace = self.tok.pos;
        self.next_after_open()?;
        let (properties, rbrace) = self.parse_items(id, &close, |p| {
            let (name, name_pos) = p.expect_ident()?;
            // printed between the name and the colon, by offset
            let before_colon = std::mem::take(&mut p.pending);
            let colon_pos = p.expect(separator.clone())?;
            let value = p.parse_expression()?;
            let id = NodeId::fresh();
            p.attach_pre(id, before_colon);
            Ok(Property {
                id,
                name,
                name_pos,
                colon_pos,
                value,
            })
        })?;
        Ok(Map {
            id,
            lbrace,
            rbrace,
            properties,
        })
    }

    /// Comma-separated items up to and including `close`, placing comments on the way
    fn parse_items<T: Item>(
        &mut self,
        container: NodeId,
        close: &Token,
        parse_item: impl Fn(&mut Self) -> PResult<T>,
    ) -> PResult<(Vec<T>, Position)> {
        let mut items: Vec<T> = Vec::new();
        loop {
            let (trailing, leading) = split_trailing(std::mem::take(&mut self.pending));
            let prev = items.last().map(Item::id);
            match prev {
                Some(id) => self.attach_post(id, trailing),
                None => self.attach_pre(container, trailing),
            }

            if self.at(close) {
                match prev {
                    Some(id) => self.attach_post(id, leading),
                    None => self.comments_container_pre(container, leading),
                }
                let close_pos = self.tok.pos;
                self.next()?;
                return Ok((items, close_pos));
            }

            let item = parse_item(self)?;
            self.attach_pre(item.id(), leading);
            items.push(item);

            if self.at(&Token::Comma) {
                self.next()?;
            } else if !self.at(close) {
                return self.syntax_error(&format!("\",\" or {:?}", close.to_string()));
            }
        }
    }

    fn comments_container_pre(&mut self, container: NodeId, comments: Vec<Comment>) {
        if !comments.is_empty() {
            self.comments.get_comments(container).pre.extend(comments);
        }
    }

    fn parse_expression(&mut self) -> PResult<Expression> {
        let value = self.parse_value()?;
        match self.tok.token {
            Some(Token::Plus) => {
                // comments before `+` stay after the left operand
                let before_plus = std::mem::take(&mut self.pending);
                self.attach_post(value.id(), before_plus);
                self.parse_operator(value)
            }
            Some(Token::Minus) => {
                let pos = self.tok.pos;
                self.error(pos, ParseErrorKind::SubtractionNotSupported)?;
                Err(Abort)
            }
            _ => Ok(value),
        }
    }

    fn parse_operator(&mut self, left: Expression) -> PResult<Expression> {
        let operator_pos = self.tok.pos;
        self.next()?;
        let right = self.parse_expression()?;
        let mut op = operator(left, right, '+', operator_pos);
        if let Err(err) = evaluate_operator(&mut op, self.config.eval) {
            self.error(operator_pos, err)?;
        }
        Ok(Expression::Operator(op))
    }

    fn parse_value(&mut self) -> PResult<Expression> {
        let leading = std::mem::take(&mut self.pending);
        let pos = self.tok.pos;
        let value = match self.tok.token.clone() {
            Some(Token::Ident(name)) => {
                self.next()?;
                match name.as_str() {
                    "true" | "false" => Expression::Bool(Bool {
                        id: NodeId::fresh(),
                        pos,
                        value: name == "true",
                    }),
                    _ => self.parse_variable(name, pos)?,
                }
            }
            Some(Token::String(value)) => {
                self.next()?;
                Expression::String(Str {
                    id: NodeId::fresh(),
                    pos,
                    value,
                })
            }
            Some(Token::Int(digits)) => {
                self.next()?;
                self.int_literal(digits, pos)?
            }
            Some(Token::Minus) => {
                self.next()?;
                match self.tok.token.clone() {
                    Some(Token::Int(digits)) => {
                        self.next()?;
                        self.int_literal(format!("-{digits}"), pos)?
                    }
                    _ => return self.syntax_error("int"),
                }
            }
            Some(Token::LBracket) => self.parse_list()?,
            Some(Token::LBrace) => Expression::Map(self.parse_map_body(Token::RBrace, Token::Colon)?),
            _ => return self.syntax_error("bool, list, or string value"),
        };
        self.attach_pre(value.id(), leading);
        Ok(value)
    }

    fn int_literal(&mut self, digits: String, pos: Position) -> PResult<Expression> {
        let value = match digits.parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                self.error(pos, ParseErrorKind::IntOutOfRange(digits))?;
                0
            }
        };
        Ok(Expression::Int64(Int64 {
            id: NodeId::fresh(),
            pos,
            value,
        }))
    }

    fn parse_variable(&mut self, name: String, pos: Position) -> PResult<Expression> {
        let mut value = Expression::not_evaluated(pos);
        if self.config.eval {
            match self.scope.get(&name) {
                None => self.error(pos, ParseErrorKind::UndefinedVariable(name.clone()))?,
                Some((_, local)) => {
                    if local {
                        if let Some(assignment) = self.scope.get_local_mut(&name) {
                            assignment.referenced = true;
                        }
                    }
                    if let Some((assignment, _)) = self.scope.get(&name) {
                        value = assignment.value.copy();
                    }
                }
            }
        }
        Ok(Expression::Variable(Variable {
            id: NodeId::fresh(),
            name,
            pos,
            value: Box::new(value),
        }))
    }

    fn parse_list(&mut self) -> PResult<Expression> {
        let id = NodeId::fresh();
        let lbracket = self.tok.pos;
        self.next_after_open()?;
        let (values, rbracket) =
            self.parse_items(id, &Token::RBracket, |p| p.parse_expression())?;
        Ok(Expression::List(List {
            id,
            lbracket,
            rbracket,
            values,
        }))
    }
}

/// Something `parse_items` collects
trait Item {
    fn id(&self) -> NodeId;
}

impl Item for Property {
    fn id(&self) -> NodeId {
        self.id
    }
}

impl Item for Expression {
    fn id(&self) -> NodeId {
        Expression::id(self)
    }
}

/// Split off the leading comments that sit on the previous item's line
fn split_trailing(mut comments: Vec<Comment>) -> (Vec<Comment>, Vec<Comment>) {
    let own_line_at = comments
        .iter()
        .position(|c| c.own_line)
        .unwrap_or(comments.len());
    let rest = comments.split_off(own_line_at);
    (comments, rest)
}

/// Split after the last blank-line marker: everything up to it stands alone
fn split_at_last_blank(mut comments: Vec<Comment>) -> (Vec<Comment>, Vec<Comment>) {
    match comments.iter().rposition(Comment::is_blank_line) {
        Some(index) => {
            let leading = comments.split_off(index + 1);
            (comments, leading)
        }
        None => (Vec::new(), comments),
    }
}
