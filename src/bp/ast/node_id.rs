//! Opaque node identities
//!
//! Comments live in a side table keyed by the identity of the node they describe, so
//! every node owns a [`NodeId`] that is unique for the life of the process. Identities
//! are handed out by a global counter and are never reused; [`Expression::copy`]
//! (crate::bp::ast::Expression::copy) assigns fresh ones so a copied subtree never
//! aliases the original in the comment table.
//!
//! The identity also records whether it names a comment, which lets the comment table
//! reject requests for "comments on a comment".

use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    raw: u64,
    comment: bool,
}

impl NodeId {
    /// A fresh identity for a syntax node
    pub fn fresh() -> Self {
        Self {
            raw: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            comment: false,
        }
    }

    /// A fresh identity for a comment or blank-line marker
    pub fn fresh_comment() -> Self {
        Self {
            raw: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            comment: true,
        }
    }

    pub fn is_comment(&self) -> bool {
        self.comment
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.comment {
            write!(f, "c#{}", self.raw)
        } else {
            write!(f, "#{}", self.raw)
        }
    }
}

/// Serialized as its display form so identities can key JSON objects
impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = NodeId::fresh();
        let b = NodeId::fresh();
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn test_comment_ids_are_tagged() {
        assert!(NodeId::fresh_comment().is_comment());
        assert!(!NodeId::fresh().is_comment());
    }

    #[test]
    fn test_serializes_as_string() {
        let id = NodeId::fresh();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
