//! Editing helpers for parsed trees
//!
//! Tools that rewrite Android.bp files (adding a source, dropping a dependency) go
//! through these helpers so that the tree stays printable: new nodes get positions,
//! and comments attached to removed nodes are transplanted instead of left dangling.
//!
//! The list helpers only work on lists of string literals. Calling them on anything
//! else is a programming error and panics.

use crate::bp::ast::{
    CommentTable, Expression, InvariantError, List, Map, NodeRef, Property,
};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    #[error("{0:?} is not a valid property name")]
    InvalidName(String),
    #[error("property {0:?} already exists")]
    Duplicate(String),
}

fn string_list_mut(expr: &mut Expression) -> &mut List {
    let found = expr.ty();
    let Some(list) = expr.as_list_mut() else {
        panic!("internal error: {}", InvariantError::NotAList { found });
    };
    if let Some(other) = list
        .values
        .iter()
        .find(|value| !matches!(value, Expression::String(_)))
    {
        panic!(
            "internal error: {}",
            InvariantError::NotAStringList { found: other.ty() }
        );
    }
    list
}

/// Append `value` to a list of strings unless it is already there
///
/// Returns whether the list was modified. The new element is positioned at the closing
/// bracket, so a list that was empty on one line stays inline when printed.
pub fn add_string_to_list(list: &mut Expression, value: &str) -> bool {
    let list = string_list_mut(list);
    if list.values.iter().any(|v| v.as_str() == Some(value)) {
        return false;
    }
    let pos = list.rbracket;
    list.values.push(Expression::string(value, pos));
    true
}

/// Remove the first occurrence of `value` from a list of strings
///
/// Returns whether the list was modified. Comments attached to the removed element move
/// in front of the element that followed it, or after the one before it when it was
/// last, or into the list itself when it was the only element.
pub fn remove_string_from_list(list: &mut Expression, value: &str, comments: &mut CommentTable) -> bool {
    let list = string_list_mut(list);
    let Some(index) = list.values.iter().position(|v| v.as_str() == Some(value)) else {
        return false;
    };
    let removed = list.values.remove(index);
    let mut pulled = comments.pull_all_comments_recursively(NodeRef::Expression(&removed));
    if pulled.is_empty() {
        return true;
    }
    debug!(value, moved = pulled.len(), "transplanting comments of removed list element");

    if let Some(next) = list.values.get(index) {
        for comment in &mut pulled {
            comment.own_line = true;
        }
        let target = comments.get_comments(next.id());
        pulled.append(&mut target.pre);
        target.pre = pulled;
    } else if let Some(previous) = index.checked_sub(1).and_then(|i| list.values.get(i)) {
        comments.get_comments(previous.id()).post.extend(pulled);
    } else {
        for comment in &mut pulled {
            comment.own_line = true;
        }
        comments.get_comments(list.id).pre.extend(pulled);
    }
    true
}

impl Map {
    /// Append a property called `name`
    ///
    /// The name must be an identifier and must not already be used in this map. The
    /// property is positioned at the closing brace.
    pub fn add_property(
        &mut self,
        name: &str,
        value: Expression,
    ) -> Result<&mut Property, PropertyError> {
        if !IDENTIFIER.is_match(name) {
            return Err(PropertyError::InvalidName(name.to_string()));
        }
        if self.get_property(name).is_some() {
            return Err(PropertyError::Duplicate(name.to_string()));
        }
        self.properties.push(Property::new(name, self.rbrace, value));
        let index = self.properties.len() - 1;
        Ok(&mut self.properties[index])
    }
}
