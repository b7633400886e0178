//! Invariant-preserving mutation primitives for the definition tree.
//!
//! All operations here are pure structural computation; a missing path is
//! never an error. [`locate`] returns `None` and callers treat that as a
//! no-op, so partial text can be scanned and injected without the store
//! throwing on keywords it does not know.

use indexmap::map::Entry;

use super::walk::{dive, dive_mut};
use super::DefinitionNode;
use crate::path::DefinitionPath;

/// Options for [`locate`].
#[derive(Debug, Clone, Copy)]
pub struct LocateOptions {
    /// Synthesize missing nodes along the walk.
    pub create: bool,
    /// Offset from the path's depth at which the walk stops. `-1` yields the
    /// parent of the addressed node, giving callers a mutable handle on the
    /// parent's child map.
    pub depth_offset: isize,
    /// Active flag for newly created nodes. `Some(true)` additionally marks
    /// every node visited along the walk active, so an activated leaf is
    /// always reachable through an all-active path.
    pub on_create_active: Option<bool>,
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self {
            create: true,
            depth_offset: 0,
            on_create_active: None,
        }
    }
}

/// Walks `path` segment by segment from `root`, creating missing nodes when
/// requested. Returns `None` when the path does not resolve and creation is
/// disabled.
pub fn locate<'a>(
    root: &'a mut DefinitionNode,
    path: &DefinitionPath,
    options: &LocateOptions,
) -> Option<&'a mut DefinitionNode> {
    let segments = path.segments();
    let stop = (segments.len() as isize + options.depth_offset).max(0) as usize;

    let mut current = root;
    for (depth, segment) in segments.iter().take(stop).enumerate() {
        let child = match current.children.entry(segment.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                if !options.create {
                    return None;
                }
                let keyword = segments[..=depth].join(".");
                entry.insert(DefinitionNode::new(
                    keyword,
                    None,
                    options.on_create_active.unwrap_or(true),
                ))
            }
        };
        if options.on_create_active == Some(true) {
            child.active = true;
        }
        current = child;
    }
    Some(current)
}

/// Read-only variant of [`locate`] without creation or depth offsetting.
pub fn locate_ref<'a>(
    root: &'a DefinitionNode,
    path: &DefinitionPath,
) -> Option<&'a DefinitionNode> {
    let mut current = root;
    for segment in path.segments() {
        current = current.children.get(segment)?;
    }
    Some(current)
}

fn node_at_mut<'a>(
    root: &'a mut DefinitionNode,
    segments: &[String],
) -> Option<&'a mut DefinitionNode> {
    let mut current = root;
    for segment in segments {
        current = current.children.get_mut(segment)?;
    }
    Some(current)
}

/// True if the node or any descendant carries a value.
pub fn branch_has_value(node: &DefinitionNode) -> bool {
    dive(node, &mut |n, children| {
        n.value.is_some() || children.into_iter().any(|c| c)
    })
}

/// True if the node or any descendant has the given active status. With
/// `status == true` this is the membership test for the active view; with
/// `false`, for the inactive view.
pub fn branch_matches_status(node: &DefinitionNode, status: bool) -> bool {
    dive(node, &mut |n, children| {
        n.active == status || children.into_iter().any(|c| c)
    })
}

/// True if the node or any descendant is active.
pub fn branch_is_active(node: &DefinitionNode) -> bool {
    branch_matches_status(node, true)
}

/// Sets the active flag on every node of the subtree, unconditionally.
pub fn set_branch_active(node: &mut DefinitionNode, status: bool) {
    dive_mut(node, &mut |n| n.active = status);
}

/// Removes value-less branches along `path`, bubbling from the deepest
/// segment to the shallowest. A node whose own value is set stops the
/// bubble: its value justifies keeping the path down to it. A missing node
/// propagates prune consent upward (unknown implies prune).
pub fn prune_empty_branch(root: &mut DefinitionNode, path: &DefinitionPath) {
    let segments = path.segments();
    for depth in (0..segments.len()).rev() {
        let Some(parent) = node_at_mut(root, &segments[..depth]) else {
            continue;
        };
        let key = &segments[depth];
        let Some(node) = parent.children.get(key) else {
            continue;
        };
        if node.value.is_some() {
            break;
        }
        if !branch_has_value(node) {
            parent.children.shift_remove(key);
        }
    }
}

/// Deactivates ancestors along `path`, deepest to shallowest, but only those
/// with no remaining active descendant. Ancestors are never deactivated out
/// from under still-active cousins. Missing nodes keep the bubble going.
pub fn inactivate_ancestors(root: &mut DefinitionNode, path: &DefinitionPath) {
    let segments = path.segments();
    for depth in (0..segments.len()).rev() {
        let Some(parent) = node_at_mut(root, &segments[..depth]) else {
            continue;
        };
        let Some(node) = parent.children.get_mut(&segments[depth]) else {
            continue;
        };
        let any_child_active = node.children.values().any(branch_is_active);
        if !any_child_active {
            node.active = false;
        }
    }
}

/// Removes from a subtree every definition whose active status matches
/// `status`, pruning namespaces left without surviving members. Returns
/// whether the node itself should be kept.
pub fn undefine_branch_by_status(node: &mut DefinitionNode, status: bool) -> bool {
    node.children
        .retain(|_, child| undefine_branch_by_status(child, status));
    (node.value.is_some() && node.active != status) || !node.children.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn path(input: &str) -> DefinitionPath {
        DefinitionPath::parse(input).unwrap()
    }

    fn define(root: &mut DefinitionNode, input: &str, active: bool) {
        let p = path(input);
        let options = LocateOptions {
            create: true,
            depth_offset: -1,
            on_create_active: Some(active),
        };
        let parent = locate(root, &p, &options).unwrap();
        parent.children.insert(
            p.last().to_string(),
            DefinitionNode::new(p.to_string(), Some(Value::from("v")), active),
        );
    }

    #[test]
    fn locate_creates_namespaces_with_accumulated_keywords() {
        let mut root = DefinitionNode::root();
        let node = locate(&mut root, &path("a.b.c"), &LocateOptions::default()).unwrap();
        assert_eq!(node.keyword.as_deref(), Some("a.b.c"));
        assert!(node.is_namespace());
        assert_eq!(
            root.children["a"].children["b"].keyword.as_deref(),
            Some("a.b")
        );
    }

    #[test]
    fn locate_depth_offset_returns_parent() {
        let mut root = DefinitionNode::root();
        let options = LocateOptions {
            depth_offset: -1,
            ..LocateOptions::default()
        };
        let parent = locate(&mut root, &path("a.b"), &options).unwrap();
        assert_eq!(parent.keyword.as_deref(), Some("a"));
    }

    #[test]
    fn locate_without_create_signals_missing_path() {
        let mut root = DefinitionNode::root();
        let options = LocateOptions {
            create: false,
            ..LocateOptions::default()
        };
        assert!(locate(&mut root, &path("a.b"), &options).is_none());
    }

    #[test]
    fn activating_walk_marks_existing_nodes() {
        let mut root = DefinitionNode::root();
        define(&mut root, "a.b", false);
        assert!(!root.children["a"].active);

        let options = LocateOptions {
            create: false,
            depth_offset: 0,
            on_create_active: Some(true),
        };
        locate(&mut root, &path("a.b"), &options).unwrap();
        assert!(root.children["a"].active);
        assert!(root.children["a"].children["b"].active);
    }

    #[test]
    fn prune_removes_valueless_chain() {
        let mut root = DefinitionNode::root();
        define(&mut root, "a.b.c", true);
        root.children
            .get_mut("a")
            .unwrap()
            .children
            .get_mut("b")
            .unwrap()
            .children
            .shift_remove("c");

        prune_empty_branch(&mut root, &path("a.b.c"));
        assert!(root.children.is_empty());
    }

    #[test]
    fn prune_stops_at_valued_ancestor() {
        let mut root = DefinitionNode::root();
        define(&mut root, "a", true);
        define(&mut root, "a.b.c", true);
        root.children
            .get_mut("a")
            .unwrap()
            .children
            .get_mut("b")
            .unwrap()
            .children
            .shift_remove("c");

        prune_empty_branch(&mut root, &path("a.b.c"));
        // `a` keeps its own value; the empty `b` chain below it is gone.
        assert!(root.children.contains_key("a"));
        assert!(root.children["a"].children.is_empty());
    }

    #[test]
    fn inactivate_ancestors_respects_active_cousins() {
        let mut root = DefinitionNode::root();
        define(&mut root, "a.b", true);
        define(&mut root, "a.c", true);

        root.children
            .get_mut("a")
            .unwrap()
            .children
            .get_mut("c")
            .unwrap()
            .active = false;
        inactivate_ancestors(&mut root, &path("a.c"));

        // `a.b` is still active, so `a` must stay active.
        assert!(root.children["a"].active);
    }

    #[test]
    fn inactivate_ancestors_bubbles_when_no_sibling_active() {
        let mut root = DefinitionNode::root();
        define(&mut root, "a.b", true);

        root.children
            .get_mut("a")
            .unwrap()
            .children
            .get_mut("b")
            .unwrap()
            .active = false;
        inactivate_ancestors(&mut root, &path("a.b"));

        assert!(!root.children["a"].active);
    }

    #[test]
    fn undefine_by_status_keeps_non_matching_definitions() {
        let mut root = DefinitionNode::root();
        define(&mut root, "a.b", true);
        define(&mut root, "a.c", false);

        root.children
            .retain(|_, child| undefine_branch_by_status(child, false));
        assert!(root.children["a"].children.contains_key("b"));
        assert!(!root.children["a"].children.contains_key("c"));
    }
}
