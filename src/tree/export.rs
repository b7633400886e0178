//! Filtered rendering of the definition tree.
//!
//! The exporter projects the tree (or a subtree) into one of three shapes,
//! filtered by a desired active status. Branches are preserved only when
//! they contain a match: a namespace with both active and inactive
//! descendants appears in both the active and inactive views, pruned to the
//! matching descendants in each.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Serialize;

use super::mutate::branch_matches_status;
use super::DefinitionNode;
use crate::errors::DefinjectError;
use crate::value::Value;

/// Which definitions a lookup or export considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    All,
    Active,
    Inactive,
}

impl View {
    /// The active status this view filters on; `None` means no filter.
    pub fn status(&self) -> Option<bool> {
        match self {
            View::All => None,
            View::Active => Some(true),
            View::Inactive => Some(false),
        }
    }
}

impl FromStr for View {
    type Err = DefinjectError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "all" => Ok(View::All),
            "active" => Ok(View::Active),
            "inactive" => Ok(View::Inactive),
            _ => Err(DefinjectError::UnknownView {
                token: token.to_string(),
            }),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            View::All => "all",
            View::Active => "active",
            View::Inactive => "inactive",
        };
        write!(f, "{token}")
    }
}

/// How exported nodes are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shape {
    /// Keep all bookkeeping: `{active, children, keyword, value}`.
    #[default]
    Full,
    /// Keep `{children, value}` only.
    Partial,
    /// Collapse to the bare value (leaf) or a plain child-name mapping
    /// (namespace); the tree minus all bookkeeping.
    Condensed,
}

impl FromStr for Shape {
    type Err = DefinjectError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "full" => Ok(Shape::Full),
            "partial" => Ok(Shape::Partial),
            "condensed" => Ok(Shape::Condensed),
            _ => Err(DefinjectError::UnknownShape {
                token: token.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullExport {
    pub keyword: Option<String>,
    pub value: Option<Value>,
    pub active: bool,
    pub children: IndexMap<String, FullExport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialExport {
    pub value: Option<Value>,
    pub children: IndexMap<String, PartialExport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Condensed {
    Leaf(Option<Value>),
    Branch(IndexMap<String, Condensed>),
}

impl Condensed {
    /// Child lookup on a condensed branch; `None` on leaves.
    pub fn get(&self, key: &str) -> Option<&Condensed> {
        match self {
            Condensed::Leaf(_) => None,
            Condensed::Branch(children) => children.get(key),
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Condensed::Leaf(value) => value.as_ref(),
            Condensed::Branch(_) => None,
        }
    }
}

/// A rendered tree in the requested shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Export {
    Full(FullExport),
    Partial(PartialExport),
    Condensed(Condensed),
}

impl Export {
    pub fn as_full(&self) -> Option<&FullExport> {
        match self {
            Export::Full(full) => Some(full),
            _ => None,
        }
    }

    pub fn as_partial(&self) -> Option<&PartialExport> {
        match self {
            Export::Partial(partial) => Some(partial),
            _ => None,
        }
    }

    pub fn as_condensed(&self) -> Option<&Condensed> {
        match self {
            Export::Condensed(condensed) => Some(condensed),
            _ => None,
        }
    }
}

/// Renders a whole tree from its root. The root is always included, so this
/// never filters away the top-level container itself.
pub fn export_tree(root: &DefinitionNode, view: View, shape: Shape) -> Export {
    match export_branch(root, view, shape) {
        Some(export) => export,
        // The root is unconditionally included; reachable only for non-root
        // nodes filtered to nothing.
        None => empty_export(shape),
    }
}

/// Renders a subtree, or `None` when nothing in it matches the view.
pub fn export_branch(node: &DefinitionNode, view: View, shape: Shape) -> Option<Export> {
    let status = view.status();
    match shape {
        Shape::Full => export_full(node, status).map(Export::Full),
        Shape::Partial => export_partial(node, status).map(Export::Partial),
        Shape::Condensed => export_condensed(node, status).map(Export::Condensed),
    }
}

fn empty_export(shape: Shape) -> Export {
    match shape {
        Shape::Full => Export::Full(FullExport {
            keyword: None,
            value: None,
            active: true,
            children: IndexMap::new(),
        }),
        Shape::Partial => Export::Partial(PartialExport {
            value: None,
            children: IndexMap::new(),
        }),
        Shape::Condensed => Export::Condensed(Condensed::Branch(IndexMap::new())),
    }
}

// Inclusion decision shared by all three shapes: the "all" view and the
// root are unconditional; otherwise a node is included when it matches the
// status itself or any child made it into the export.
fn included(node: &DefinitionNode, status: Option<bool>, matched_children: bool) -> bool {
    match status {
        None => true,
        Some(s) => node.is_root() || matched_children || node.active == s,
    }
}

fn export_full(node: &DefinitionNode, status: Option<bool>) -> Option<FullExport> {
    let mut children = IndexMap::new();
    for (key, child) in &node.children {
        if let Some(exported) = export_full(child, status) {
            children.insert(key.clone(), exported);
        }
    }
    if !included(node, status, !children.is_empty()) {
        return None;
    }
    Some(FullExport {
        keyword: node.keyword.clone(),
        value: node.value.clone(),
        active: node.active,
        children,
    })
}

fn export_partial(node: &DefinitionNode, status: Option<bool>) -> Option<PartialExport> {
    let mut children = IndexMap::new();
    for (key, child) in &node.children {
        if let Some(exported) = export_partial(child, status) {
            children.insert(key.clone(), exported);
        }
    }
    if !included(node, status, !children.is_empty()) {
        return None;
    }
    Some(PartialExport {
        value: node.value.clone(),
        children,
    })
}

fn export_condensed(node: &DefinitionNode, status: Option<bool>) -> Option<Condensed> {
    let mut children = IndexMap::new();
    for (key, child) in &node.children {
        if let Some(exported) = export_condensed(child, status) {
            children.insert(key.clone(), exported);
        }
    }
    if !included(node, status, !children.is_empty()) {
        return None;
    }
    if children.is_empty() {
        Some(Condensed::Leaf(node.value.clone()))
    } else {
        Some(Condensed::Branch(children))
    }
}
