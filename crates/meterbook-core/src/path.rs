//! # Field Paths
//!
//! A [`FieldPath`] names where in a document an error was found, as a
//! dot-joined path such as `meter.lines[2]`. Paths are immutable values:
//! [`FieldPath::child`] returns a new, longer path and leaves the parent
//! untouched, so a nested validation call cannot corrupt the location of
//! errors recorded by its caller.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An immutable, dot-joined location inside a validated document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    /// A path rooted at `root`. An empty root yields the empty path.
    pub fn root(root: impl Into<String>) -> Self {
        Self(root.into())
    }

    /// The empty path.
    pub fn empty() -> Self {
        Self::default()
    }

    /// This path extended by one segment.
    pub fn child(&self, segment: &str) -> Self {
        if self.0.is_empty() {
            Self(segment.to_string())
        } else {
            Self(format!("{}.{segment}", self.0))
        }
    }

    /// This path extended by an indexed segment, e.g. `lines[2]`.
    pub fn index(&self, segment: &str, index: usize) -> Self {
        self.child(&format!("{segment}[{index}]"))
    }

    /// Full property path of `field` located at this path.
    pub fn property_path(&self, field: &str) -> String {
        self.child(field).0
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the empty path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        Self::root(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_joins_with_dot() {
        let root = FieldPath::root("meter");
        assert_eq!(root.child("lines").as_str(), "meter.lines");
        assert_eq!(root.index("lines", 2).as_str(), "meter.lines[2]");
    }

    #[test]
    fn test_child_of_empty_has_no_leading_dot() {
        assert_eq!(FieldPath::empty().child("lines").as_str(), "lines");
        assert_eq!(FieldPath::root("").index("lines", 0).as_str(), "lines[0]");
    }

    #[test]
    fn test_child_leaves_parent_unchanged() {
        let root = FieldPath::root("meter");
        let _nested = root.index("lines", 7).child("inner");
        assert_eq!(root.as_str(), "meter");
    }

    #[test]
    fn test_property_path() {
        assert_eq!(
            FieldPath::root("meter").index("lines", 0).property_path("pl1"),
            "meter.lines[0].pl1"
        );
        assert_eq!(FieldPath::empty().property_path("model"), "model");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn child_extends_parent(
            root in "[a-z]{0,8}",
            segment in "[a-zA-Z.]{1,12}",
            index in 0usize..1000,
        ) {
            let parent = FieldPath::root(root.clone());
            let child = parent.index(&segment, index);
            prop_assert!(child.as_str().starts_with(parent.as_str()));
            let suffix = format!("{segment}[{index}]");
            prop_assert!(child.as_str().ends_with(&suffix));
            prop_assert_eq!(parent.as_str(), root.as_str());
        }
    }
}
