//! Field paths for addressing nested JSON content
//!
//! Provides [`FieldPath`] for naming a location inside an artifact's JSON tree,
//! e.g. `addresses[].city`. Used by grouping-key descriptors and their errors.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// One step of a [`FieldPath`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    /// Named object field
    Field(String),

    /// Every element of an array (`[]`)
    Each,
}

/// Path within an artifact's JSON content
///
/// # Examples
/// - `["addresses", Each, "city"]` → `addresses[].city`
/// - `["patient", "name"]` → `patient.name`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// Create new path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// Empty path (document root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is the root
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a field segment, returning new path
    #[inline]
    #[must_use]
    pub fn field(&self, name: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(PathSegment::Field(name.into()));
        new
    }

    /// Append an array-element segment, returning new path
    #[inline]
    #[must_use]
    pub fn each(&self) -> Self {
        let mut new = self.clone();
        new.0.push(PathSegment::Each);
        new
    }

    /// Last named field (if any)
    #[must_use]
    pub fn last_field(&self) -> Option<&str> {
        self.0.iter().rev().find_map(|s| match s {
            PathSegment::Field(name) => Some(name.as_str()),
            PathSegment::Each => None,
        })
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &PathSegment> {
        self.0.iter()
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "$");
        }
        let mut first = true;
        for segment in &self.0 {
            match segment {
                PathSegment::Field(name) => {
                    if !first {
                        write!(f, ".")?;
                    }
                    write!(f, "{name}")?;
                }
                PathSegment::Each => write!(f, "[]")?,
            }
            first = false;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "$" {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        for part in s.split('.') {
            let (name, mut rest) = match part.find('[') {
                Some(idx) => part.split_at(idx),
                None => (part, ""),
            };

            if name.is_empty() {
                return Err(PathError::EmptySegment);
            }
            if name.contains(|c: char| !c.is_alphanumeric() && c != '_') {
                return Err(PathError::InvalidSegment(name.to_string()));
            }
            segments.push(PathSegment::Field(name.to_string()));

            while !rest.is_empty() {
                rest = rest
                    .strip_prefix("[]")
                    .ok_or_else(|| PathError::InvalidSegment(part.to_string()))?;
                segments.push(PathSegment::Each);
            }
        }

        Ok(Self(segments))
    }
}

impl From<Vec<PathSegment>> for FieldPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl Default for FieldPath {
    fn default() -> Self {
        Self::root()
    }
}

/// Errors related to field paths
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Invalid segment characters
    #[error("invalid segment: {0} (must be alphanumeric or underscore, optionally followed by [])")]
    InvalidSegment(String),
}
