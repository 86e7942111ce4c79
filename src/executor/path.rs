use std::{fmt, sync::Arc};

use arcstr::ArcStr;
use serde::Serialize;

/// A single step of a [`NodePath`]: a response key or a list index.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(untagged)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum PathSegment {
    Field(ArcStr),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, "{name}"),
            Self::Index(idx) => write!(f, "{idx}"),
        }
    }
}

#[derive(Debug)]
struct Node {
    segment: PathSegment,
    parent: Option<Arc<Node>>,
}

/// Position of a value in the response tree.
///
/// The path is a persistent list: appending a segment produces a new path
/// sharing its prefix with the original, so sibling fields executing
/// concurrently never observe each other's segments.
#[derive(Clone, Debug, Default)]
pub struct NodePath {
    tail: Option<Arc<Node>>,
    len: usize,
}

impl NodePath {
    /// The empty path of the operation root.
    pub fn root() -> Self {
        Self::default()
    }

    fn push(&self, segment: PathSegment) -> Self {
        Self {
            tail: Some(Arc::new(Node {
                segment,
                parent: self.tail.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// Forks this path, appending a response key.
    #[must_use]
    pub fn field(&self, key: impl Into<ArcStr>) -> Self {
        self.push(PathSegment::Field(key.into()))
    }

    /// Forks this path, appending a list index.
    #[must_use]
    pub fn index(&self, idx: usize) -> Self {
        self.push(PathSegment::Index(idx))
    }

    /// Last segment of this path, if any.
    pub fn last(&self) -> Option<&PathSegment> {
        self.tail.as_ref().map(|n| &n.segment)
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is this the root path?
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Collects the segments, from the root downwards.
    pub fn to_vec(&self) -> Vec<PathSegment> {
        let mut out = Vec::with_capacity(self.len);
        let mut cur = self.tail.as_deref();
        while let Some(node) = cur {
            out.push(node.segment.clone());
            cur = node.parent.as_deref();
        }
        out.reverse();
        out
    }
}

impl PartialEq for NodePath {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.to_vec() == other.to_vec()
    }
}

impl Eq for NodePath {}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.to_vec().iter().enumerate() {
            match segment {
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
                PathSegment::Field(name) if i == 0 => write!(f, "{name}")?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
            }
        }
        Ok(())
    }
}
