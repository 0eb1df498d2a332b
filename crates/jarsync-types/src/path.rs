//! Dot-delimited paths into a [`StateTree`](crate::StateTree).
//!
//! A path such as `user.settings` names the `settings` key of the `user`
//! object at the root of the state. Segments that are decimal numbers also
//! address array elements (`todos.0.title`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PathError;

/// A validated, non-empty state path.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatePath {
    segments: Vec<String>,
}

impl StatePath {
    /// Parse a dot-delimited path.
    ///
    /// # Examples
    ///
    /// ```
    /// use jarsync_types::StatePath;
    ///
    /// let path = StatePath::parse("user.settings").unwrap();
    /// assert_eq!(path.segments(), ["user", "settings"]);
    /// assert!(StatePath::parse("").is_err());
    /// assert!(StatePath::parse("user..settings").is_err());
    /// ```
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for (position, segment) in path.split('.').enumerate() {
            if segment.is_empty() {
                return Err(PathError::EmptySegment {
                    path: path.to_string(),
                    position,
                });
            }
            segments.push(segment.to_string());
        }

        Ok(Self { segments })
    }

    /// The individual path segments, root first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments (always at least one).
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if `self` equals `other` or is an ancestor of it.
    pub fn is_prefix_of(&self, other: &StatePath) -> bool {
        other.segments.starts_with(&self.segments)
    }

    /// Returns `true` if writing at one path can affect the value at the other.
    pub fn overlaps(&self, other: &StatePath) -> bool {
        self.is_prefix_of(other) || other.is_prefix_of(self)
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl fmt::Debug for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatePath({self})")
    }
}

impl FromStr for StatePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for StatePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StatePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_single_segment() {
        let path = StatePath::parse("counter").unwrap();
        assert_eq!(path.depth(), 1);
        assert_eq!(path.to_string(), "counter");
    }

    #[test]
    fn parses_nested_segments() {
        let path: StatePath = "my.first.subtree".parse().unwrap();
        assert_eq!(path.segments(), ["my", "first", "subtree"]);
        assert_eq!(path.to_string(), "my.first.subtree");
    }

    #[test]
    fn rejects_empty_path() {
        assert_eq!(StatePath::parse(""), Err(PathError::Empty));
    }

    #[test]
    fn rejects_empty_segments() {
        for bad in [".a", "a.", "a..b"] {
            let err = StatePath::parse(bad).unwrap_err();
            assert!(matches!(err, PathError::EmptySegment { .. }), "{bad}");
        }
    }

    #[test]
    fn prefix_and_overlap() {
        let two = StatePath::parse("two").unwrap();
        let two_three = StatePath::parse("two.three").unwrap();
        let twenty = StatePath::parse("twenty").unwrap();

        assert!(two.is_prefix_of(&two_three));
        assert!(!two_three.is_prefix_of(&two));
        assert!(two.overlaps(&two_three));
        assert!(two_three.overlaps(&two));
        // Segment-wise, not string-wise.
        assert!(!two.overlaps(&twenty));
    }

    #[test]
    fn serde_as_string() {
        let path = StatePath::parse("a.b").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"a.b\"");
        let back: StatePath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
        assert!(serde_json::from_str::<StatePath>("\"a..b\"").is_err());
    }

    proptest! {
        #[test]
        fn prefix_matches_segment_prefix(
            segments in proptest::collection::vec("[a-z0-9_]{1,6}", 1..6),
            cut in 1usize..6,
        ) {
            let full = StatePath::parse(&segments.join(".")).unwrap();
            let cut = cut.min(segments.len());
            let prefix = StatePath::parse(&segments[..cut].join(".")).unwrap();

            prop_assert_eq!(full.segments(), segments.as_slice());
            prop_assert!(prefix.is_prefix_of(&full));
            prop_assert!(full.overlaps(&prefix));
            prop_assert_eq!(full.is_prefix_of(&prefix), cut == segments.len());
        }
    }
}
