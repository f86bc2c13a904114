//! Variable scopes
//!
//! A [`Scope`] maps variable names to the [`Assignment`] that bound them. Bindings made
//! in the scope itself are *local*; bindings copied from a parent when the scope was
//! created are *inherited*. A child takes a snapshot of its parent: changes made to the
//! parent afterwards are not visible to the child.
//!
//! `+=` may only extend a local binding that nothing has referenced yet; the parser
//! checks that through [`Scope::get`] and the `referenced` flag.

use crate::bp::ast::{Assignment, Expression, Position};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("variable already set, previous assignment: {name} at {previous}")]
    AlreadySet { name: String, previous: Position },

    #[error("variable already set in inherited scope, previous assignment: {name} at {previous}")]
    AlreadySetInherited { name: String, previous: Position },
}

#[derive(Debug, Clone, Default)]
pub struct Scope {
    vars: HashMap<String, Assignment>,
    inherited: HashMap<String, Assignment>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope that inherits every binding currently visible in `self`
    pub fn new_child(&self) -> Scope {
        let mut inherited = self.inherited.clone();
        inherited.extend(
            self.vars
                .iter()
                .map(|(name, assignment)| (name.clone(), assignment.clone())),
        );
        Scope {
            vars: HashMap::new(),
            inherited,
        }
    }

    /// Bind `assignment` locally
    pub fn add(&mut self, assignment: Assignment) -> Result<(), ScopeError> {
        if let Some(previous) = self.vars.get(&assignment.name) {
            return Err(ScopeError::AlreadySet {
                name: previous.name.clone(),
                previous: previous.name_pos,
            });
        }
        if let Some(previous) = self.inherited.get(&assignment.name) {
            return Err(ScopeError::AlreadySetInherited {
                name: previous.name.clone(),
                previous: previous.name_pos,
            });
        }
        self.vars.insert(assignment.name.clone(), assignment);
        Ok(())
    }

    /// The binding for `name` and whether it is local
    pub fn get(&self, name: &str) -> Option<(&Assignment, bool)> {
        if let Some(assignment) = self.vars.get(name) {
            return Some((assignment, true));
        }
        self.inherited.get(name).map(|assignment| (assignment, false))
    }

    /// The local binding for `name`, for `+=` updates and reference tracking
    pub fn get_local_mut(&mut self, name: &str) -> Option<&mut Assignment> {
        self.vars.get_mut(name)
    }

    /// Replace the evaluated value of a local binding; returns whether it existed
    pub fn set_local_value(&mut self, name: &str, value: Expression) -> bool {
        match self.vars.get_mut(name) {
            Some(assignment) => {
                assignment.value = value;
                true
            }
            None => false,
        }
    }

    /// Forget `name` in both the local and inherited bindings
    pub fn remove(&mut self, name: &str) {
        self.vars.remove(name);
        self.inherited.remove(name);
    }

    /// Names bound locally, sorted
    pub fn local_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.vars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bp::ast::Assigner;

    fn assign(name: &str, line: usize, value: &str) -> Assignment {
        let pos = Position::new(line * 10, line, 1);
        Assignment::new(name, pos, Assigner::Set, pos, Expression::string(value, pos))
    }

    #[test]
    fn test_add_and_get() {
        let mut scope = Scope::new();
        scope.add(assign("x", 1, "a")).unwrap();
        let (found, local) = scope.get("x").unwrap();
        assert!(local);
        assert_eq!(found.value.as_str(), Some("a"));
        assert!(scope.get("y").is_none());
    }

    #[test]
    fn test_duplicate_local() {
        let mut scope = Scope::new();
        scope.add(assign("x", 1, "a")).unwrap();
        let err = scope.add(assign("x", 2, "b")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "variable already set, previous assignment: x at 1:1"
        );
    }

    #[test]
    fn test_child_sees_parent_bindings_as_inherited() {
        let mut parent = Scope::new();
        parent.add(assign("x", 1, "a")).unwrap();
        let mut child = parent.new_child();

        let (_, local) = child.get("x").unwrap();
        assert!(!local);
        assert!(matches!(
            child.add(assign("x", 2, "b")),
            Err(ScopeError::AlreadySetInherited { .. })
        ));
    }

    #[test]
    fn test_child_is_a_snapshot() {
        let mut parent = Scope::new();
        let child = parent.new_child();
        parent.add(assign("late", 1, "a")).unwrap();
        assert!(child.get("late").is_none());
    }

    #[test]
    fn test_child_bindings_do_not_leak_to_parent() {
        let parent = Scope::new();
        let mut child = parent.new_child();
        child.add(assign("x", 1, "a")).unwrap();
        assert!(parent.get("x").is_none());
        assert_eq!(child.local_names(), ["x"]);
    }

    #[test]
    fn test_remove() {
        let mut parent = Scope::new();
        parent.add(assign("x", 1, "a")).unwrap();
        let mut child = parent.new_child();
        child.add(assign("y", 2, "b")).unwrap();
        child.remove("x");
        child.remove("y");
        assert!(child.get("x").is_none());
        assert!(child.get("y").is_none());
    }

    #[test]
    fn test_set_local_value() {
        let mut scope = Scope::new();
        scope.add(assign("x", 1, "a")).unwrap();
        let pos = Position::new(0, 1, 1);
        assert!(scope.set_local_value("x", Expression::string("ab", pos)));
        assert!(!scope.set_local_value("y", Expression::string("ab", pos)));
        assert_eq!(scope.get("x").unwrap().0.value.as_str(), Some("ab"));
    }
}
