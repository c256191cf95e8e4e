//! Paths addressing nodes in a value tree.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathComponent {
    /// Key into a mapping.
    Key(String),
    /// Position in a sequence.
    Index(usize),
}

impl PathComponent {
    pub fn key(key: impl Into<String>) -> Self {
        PathComponent::Key(key.into())
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathComponent::Key(key) => Some(key),
            PathComponent::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathComponent::Key(_) => None,
            PathComponent::Index(index) => Some(*index),
        }
    }
}

/// Ordered sequence of keys and indices identifying a node in a value tree.
///
/// Paths are immutable; [`Path::key`] and [`Path::index`] return extended
/// copies. The string form joins keys with `.` and writes indices as `[n]`:
///
/// ```rust
/// use bundle_dyn::Path;
///
/// let path = Path::empty().key("include").index(0);
/// assert_eq!(path.to_string(), "include[0]");
/// assert_eq!("include[0]".parse::<Path>().unwrap(), path);
/// ```
///
/// Keys containing `.`, `[` or `]` cannot be written in string form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    components: Vec<PathComponent>,
}

/// Errors for path parsing and lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("invalid path '{input}': {reason}")]
    Invalid { input: String, reason: &'static str },

    /// A component was absent, or the node it applies to has the wrong kind.
    #[error("no value at '{path}'")]
    NotFound { path: Path },
}

impl Path {
    /// The empty path, addressing the root of a tree.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(components: Vec<PathComponent>) -> Self {
        Self { components }
    }

    /// Build a path made only of mapping keys.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            components: keys.into_iter().map(PathComponent::key).collect(),
        }
    }

    /// Return a copy of this path extended with `component`.
    pub fn append(&self, component: PathComponent) -> Self {
        let mut components = Vec::with_capacity(self.components.len() + 1);
        components.extend(self.components.iter().cloned());
        components.push(component);
        Self { components }
    }

    /// Return a copy of this path extended with a mapping key.
    pub fn key(&self, key: impl Into<String>) -> Self {
        self.append(PathComponent::Key(key.into()))
    }

    /// Return a copy of this path extended with a sequence index.
    pub fn index(&self, index: usize) -> Self {
        self.append(PathComponent::Index(index))
    }

    pub fn components(&self) -> &[PathComponent] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Check whether `prefix` is a leading subsequence of this path.
    ///
    /// Every path has the empty path and itself as prefixes.
    pub fn has_prefix(&self, prefix: &Path) -> bool {
        self.components.starts_with(&prefix.components)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            match component {
                PathComponent::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathComponent::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| PathError::Invalid {
            input: input.to_string(),
            reason,
        };

        let mut components = Vec::new();
        let mut rest = input;
        // after a '.', the next component has to be a key
        let mut expect_key = false;

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('[') {
                if expect_key {
                    return Err(invalid("expected key after '.'"));
                }
                let end = after.find(']').ok_or_else(|| invalid("unterminated index"))?;
                let index = after[..end]
                    .parse::<usize>()
                    .map_err(|_| invalid("index is not a number"))?;
                components.push(PathComponent::Index(index));
                rest = &after[end + 1..];
            } else {
                if !components.is_empty() && !expect_key {
                    return Err(invalid("expected '.' or '['"));
                }
                let end = rest.find(|c: char| c == '.' || c == '[').unwrap_or(rest.len());
                let key = &rest[..end];
                if key.is_empty() {
                    return Err(invalid("empty key"));
                }
                if key.contains(']') {
                    return Err(invalid("unexpected ']'"));
                }
                components.push(PathComponent::key(key));
                rest = &rest[end..];
            }

            expect_key = false;
            if let Some(after) = rest.strip_prefix('.') {
                if after.is_empty() {
                    return Err(invalid("empty key"));
                }
                expect_key = true;
                rest = after;
            }
        }

        Ok(Path { components })
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl From<Vec<PathComponent>> for Path {
    fn from(components: Vec<PathComponent>) -> Self {
        Path::new(components)
    }
}
