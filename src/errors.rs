//! Unified error type for the definject crate.
//!
//! Every fallible operation in the crate reports through [`DefinjectError`].
//! Path validation failures are deliberately *not* surfaced through this type
//! by the store's mutators: an invalid path is logged and treated as a no-op
//! so that scanning and injection stay resilient against partial text. The
//! variants here cover the cases a caller must handle explicitly.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum DefinjectError {
    /// A path normalized to zero segments (empty string, only dots, or an
    /// empty segment list).
    #[error("invalid definition path {path:?}")]
    #[diagnostic(
        code(definject::invalid_path),
        help("paths are non-empty dot-separated identifiers, e.g. `Array.component.a`")
    )]
    InvalidPath { path: String },

    /// An unrecognized `select` token was given where a view was expected.
    #[error("unknown view selector {token:?}")]
    #[diagnostic(
        code(definject::unknown_view),
        help("valid selectors are `all`, `active` and `inactive`")
    )]
    UnknownView { token: String },

    /// An unrecognized export shape token.
    #[error("unknown export shape {token:?}")]
    #[diagnostic(
        code(definject::unknown_shape),
        help("valid shapes are `full`, `partial` and `condensed`")
    )]
    UnknownShape { token: String },

    /// The dependency graph built during reference-mode injection admits no
    /// topological order. The listed keywords are the ones left on the cycle.
    #[error("cyclic dependency between definitions: {}", cycle.join(" -> "))]
    #[diagnostic(code(definject::cyclic_dependency))]
    CyclicDependency { cycle: Vec<String> },

    /// The variable-name retriever hook produced no usable identifier for a
    /// definition that reference-mode injection must rename.
    #[error("definition {keyword:?} does not declare a usable identifier")]
    #[diagnostic(
        code(definject::invalid_identifier),
        help("the variable-name retriever must yield a non-empty identifier for every definition emitted in reference mode")
    )]
    InvalidIdentifier { keyword: String },
}
