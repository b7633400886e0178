//! A canonical, type-safe representation of a dotted path into the
//! definition tree.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DefinjectError;

/// A normalized, non-empty list of path segments.
///
/// External callers address definitions either as dotted strings
/// (`"Array.component.a"`) or as segment lists; both normalize to this type,
/// with empty segments dropped. Normalizing to zero segments is an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionPath(Vec<String>);

impl DefinitionPath {
    /// Parses a dotted path string, dropping empty segments.
    pub fn parse(input: &str) -> Result<Self, DefinjectError> {
        Self::from_segments(input.split('.'))
    }

    /// Builds a path from pre-split segments, dropping empty ones.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, DefinjectError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cleaned: Vec<String> = segments
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if cleaned.is_empty() {
            return Err(DefinjectError::InvalidPath {
                path: String::new(),
            });
        }
        Ok(Self(cleaned))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The final segment; the name under which the addressed node hangs off
    /// its parent.
    pub fn last(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    /// The first segment; the top-level namespace the path belongs to.
    pub fn namespace(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for DefinitionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// Conversion into a [`DefinitionPath`] from the path forms the store
/// surface accepts: dotted strings, segment slices, or an existing path.
pub trait IntoDefinitionPath {
    fn into_path(self) -> Result<DefinitionPath, DefinjectError>;
}

impl IntoDefinitionPath for DefinitionPath {
    fn into_path(self) -> Result<DefinitionPath, DefinjectError> {
        Ok(self)
    }
}

impl IntoDefinitionPath for &DefinitionPath {
    fn into_path(self) -> Result<DefinitionPath, DefinjectError> {
        Ok(self.clone())
    }
}

impl IntoDefinitionPath for &str {
    fn into_path(self) -> Result<DefinitionPath, DefinjectError> {
        DefinitionPath::parse(self).map_err(|_| DefinjectError::InvalidPath {
            path: self.to_string(),
        })
    }
}

impl IntoDefinitionPath for String {
    fn into_path(self) -> Result<DefinitionPath, DefinjectError> {
        self.as_str().into_path()
    }
}

impl IntoDefinitionPath for &String {
    fn into_path(self) -> Result<DefinitionPath, DefinjectError> {
        self.as_str().into_path()
    }
}

impl IntoDefinitionPath for &[&str] {
    fn into_path(self) -> Result<DefinitionPath, DefinjectError> {
        DefinitionPath::from_segments(self.iter().copied()).map_err(|_| {
            DefinjectError::InvalidPath {
                path: self.join("."),
            }
        })
    }
}

impl IntoDefinitionPath for Vec<String> {
    fn into_path(self) -> Result<DefinitionPath, DefinjectError> {
        let display = self.join(".");
        DefinitionPath::from_segments(self)
            .map_err(|_| DefinjectError::InvalidPath { path: display })
    }
}
