//! The definition store: a facade over the tree mutator and the filtered
//! exporter.
//!
//! All mutators accept path inputs in either dotted-string or segment-list
//! form (anything implementing [`IntoDefinitionPath`]). An invalid path is
//! logged and treated as a no-op; a missing path is a no-op for mutators and
//! `None`/`false` for lookups. Mutations validate before touching the tree,
//! so a store either fully applies an operation or leaves the tree
//! unchanged.

use crate::path::{DefinitionPath, IntoDefinitionPath};
use crate::tree::export::{export_tree, Export, Shape, View};
use crate::tree::mutate::{
    branch_matches_status, inactivate_ancestors, locate, locate_ref, prune_empty_branch,
    set_branch_active, undefine_branch_by_status, LocateOptions,
};
use crate::tree::DefinitionNode;
use crate::value::Value;

/// Options for [`DefinitionStore::define_with`].
#[derive(Debug, Clone, Copy)]
pub struct DefineOptions {
    /// Whether the definition is activated on creation. Inactive
    /// definitions are ignored when scanning, generating and injecting.
    pub activate: bool,
}

impl Default for DefineOptions {
    fn default() -> Self {
        Self { activate: true }
    }
}

/// A namespaced store of definitions addressed by dotted paths.
///
/// Cloning a store deep-copies the whole tree; two stores never share
/// nodes.
///
/// # Examples
///
/// ```rust
/// use definject::{DefinitionStore, Value, View};
/// let mut store = DefinitionStore::new();
/// store.define("Object.subset.x", "test");
/// assert_eq!(store.get("Object.subset.x", View::All), Some(&Value::from("test")));
/// assert!(store.has("Object.subset", View::Active));
/// ```
#[derive(Debug, Clone)]
pub struct DefinitionStore {
    root: DefinitionNode,
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionStore {
    pub fn new() -> Self {
        Self {
            root: DefinitionNode::root(),
        }
    }

    /// Builds a store from `(path, value)` seed pairs, all activated.
    pub fn from_definitions<P, V>(definitions: impl IntoIterator<Item = (P, V)>) -> Self
    where
        P: IntoDefinitionPath,
        V: Into<Value>,
    {
        let mut store = Self::new();
        for (path, value) in definitions {
            store.define(path, value);
        }
        store
    }

    pub(crate) fn root(&self) -> &DefinitionNode {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut DefinitionNode {
        &mut self.root
    }

    /// Top-level namespace names, in declaration order.
    pub fn namespaces(&self) -> impl Iterator<Item = &String> {
        self.root.children.keys()
    }

    fn normalize(path: impl IntoDefinitionPath) -> Option<DefinitionPath> {
        match path.into_path() {
            Ok(path) => Some(path),
            Err(err) => {
                log::warn!("ignoring invalid definition path: {err}");
                None
            }
        }
    }

    /// Defines (and activates) a definition at `path`.
    pub fn define(&mut self, path: impl IntoDefinitionPath, value: impl Into<Value>) {
        self.define_with(path, value, DefineOptions::default());
    }

    /// Defines a definition at `path`, creating intermediate namespace
    /// nodes as needed. Redefining an existing path overwrites its value
    /// and active flag in place.
    ///
    /// When `activate` is true, every node on the path is marked active;
    /// when false, ancestors are deactivated unless another descendant of
    /// theirs remains active.
    pub fn define_with(
        &mut self,
        path: impl IntoDefinitionPath,
        value: impl Into<Value>,
        options: DefineOptions,
    ) {
        let Some(path) = Self::normalize(path) else {
            return;
        };
        let activate = options.activate;

        let locate_options = LocateOptions {
            create: true,
            depth_offset: -1,
            on_create_active: Some(activate),
        };
        let Some(parent) = locate(&mut self.root, &path, &locate_options) else {
            return;
        };

        let key = path.last().to_string();
        if let Some(existing) = parent.children.get_mut(&key) {
            existing.value = Some(value.into());
            existing.active = activate;
        } else {
            parent.children.insert(
                key,
                DefinitionNode::new(path.to_string(), Some(value.into()), activate),
            );
        }

        if !activate {
            inactivate_ancestors(&mut self.root, &path);
        }
        prune_empty_branch(&mut self.root, &path);
    }

    /// Removes the definition at `path` along with its whole subtree, then
    /// prunes namespaces left without a value. No-op on a missing path.
    pub fn undefine(&mut self, path: impl IntoDefinitionPath) {
        let Some(path) = Self::normalize(path) else {
            return;
        };
        let locate_options = LocateOptions {
            create: false,
            depth_offset: -1,
            on_create_active: None,
        };
        let Some(parent) = locate(&mut self.root, &path, &locate_options) else {
            return;
        };
        if parent.children.shift_remove(path.last()).is_some() {
            prune_empty_branch(&mut self.root, &path);
        }
    }

    /// Removes all definitions in the selected view. `View::All` clears the
    /// tree; `Active`/`Inactive` remove only matching definitions, pruning
    /// namespaces left without surviving members.
    pub fn undefine_all(&mut self, select: View) {
        match select.status() {
            None => self.root.children.clear(),
            Some(status) => {
                self.root
                    .children
                    .retain(|_, child| undefine_branch_by_status(child, status));
            }
        }
    }

    /// Activates the definition at `path` and every ancestor on the way.
    /// No-op on a missing path.
    pub fn activate(&mut self, path: impl IntoDefinitionPath) {
        let Some(path) = Self::normalize(path) else {
            return;
        };
        // Validate existence first so a missing path leaves the tree
        // untouched.
        if locate_ref(&self.root, &path).is_none() {
            return;
        }
        let mut current = &mut self.root;
        for segment in path.segments() {
            let Some(child) = current.children.get_mut(segment) else {
                return;
            };
            child.active = true;
            current = child;
        }
    }

    /// Activates every definition in the tree.
    pub fn activate_all(&mut self) {
        set_branch_active(&mut self.root, true);
    }

    /// Deactivates the definition at `path`, then deactivates each ancestor
    /// that has no other active descendant left. No-op on a missing path.
    pub fn deactivate(&mut self, path: impl IntoDefinitionPath) {
        let Some(path) = Self::normalize(path) else {
            return;
        };
        let locate_options = LocateOptions {
            create: false,
            depth_offset: -1,
            on_create_active: None,
        };
        let Some(parent) = locate(&mut self.root, &path, &locate_options) else {
            return;
        };
        let Some(node) = parent.children.get_mut(path.last()) else {
            return;
        };
        node.active = false;
        inactivate_ancestors(&mut self.root, &path);
    }

    /// Deactivates every definition in the tree.
    pub fn deactivate_all(&mut self) {
        set_branch_active(&mut self.root, false);
    }

    /// Retrieves the value at `path`, considering only definitions in the
    /// selected view. Returns `None` when the path is absent, names a
    /// namespace, or falls outside the view.
    pub fn get(&self, path: impl IntoDefinitionPath, select: View) -> Option<&Value> {
        let path = Self::normalize(path)?;
        let node = locate_ref(&self.root, &path)?;
        match select.status() {
            None => node.value.as_ref(),
            Some(status) if branch_matches_status(node, status) => node.value.as_ref(),
            Some(_) => None,
        }
    }

    /// Whether a definition (or namespace containing one) exists at `path`
    /// in the selected view.
    pub fn has(&self, path: impl IntoDefinitionPath, select: View) -> bool {
        let Some(path) = Self::normalize(path) else {
            return false;
        };
        let Some(node) = locate_ref(&self.root, &path) else {
            return false;
        };
        match select.status() {
            None => true,
            Some(status) => branch_matches_status(node, status),
        }
    }

    /// Renders the whole tree in the requested view and shape.
    pub fn get_all(&self, select: View, shape: Shape) -> Export {
        export_tree(&self.root, select, shape)
    }
}
