//! The definition tree: a mutable, path-addressed tree of nodes carrying a
//! value and an active flag.
//!
//! Structural invariants (upheld by the mutation helpers in [`mutate`]):
//! - every non-root node's `keyword` is its full dotted path from the root;
//! - after any mutation completes, a node without a value either has at
//!   least one child or is removed (no dangling namespaces);
//! - explicit activation marks the whole path active; explicit deactivation
//!   bubbles up only past ancestors with no remaining active descendants.

pub mod export;
pub mod mutate;
pub mod walk;

use indexmap::IndexMap;

use crate::value::Value;

/// A single node in the definition tree.
///
/// `keyword` is `None` only at the root. `value == None` marks a namespace
/// node that exists only to hold children. `children` preserves insertion
/// order, which is what gives `scan` its namespace-declaration ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionNode {
    pub keyword: Option<String>,
    pub value: Option<Value>,
    pub active: bool,
    pub children: IndexMap<String, DefinitionNode>,
}

impl DefinitionNode {
    /// Creates the root node of a tree. Lives for the store's lifetime.
    pub fn root() -> Self {
        Self {
            keyword: None,
            value: None,
            active: true,
            children: IndexMap::new(),
        }
    }

    pub fn new(keyword: impl Into<String>, value: Option<Value>, active: bool) -> Self {
        Self {
            keyword: Some(keyword.into()),
            value,
            active,
            children: IndexMap::new(),
        }
    }

    /// True for nodes that exist only to hold children.
    pub fn is_namespace(&self) -> bool {
        self.value.is_none()
    }

    pub fn is_root(&self) -> bool {
        self.keyword.is_none()
    }
}
