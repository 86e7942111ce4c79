use std::fmt;

use serde::Serialize;

/// A reference to a line and column in an input source file.
///
/// Lines and columns are 1-based, as reported in GraphQL error `locations`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct SourcePosition {
    line: usize,
    column: usize,
}

impl SourcePosition {
    #[doc(hidden)]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    #[doc(hidden)]
    pub fn new_origin() -> Self {
        Self { line: 1, column: 1 }
    }

    /// The line of the character in the input source.
    ///
    /// Line numbers start at 1.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The column of the character in the input source.
    ///
    /// Column numbers start at 1.
    pub fn column(&self) -> usize {
        self.column
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Data structure used to wrap items with their start position in the input
/// source.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Spanning<T> {
    /// Wrapped item.
    pub item: T,

    /// Position of the first character of the wrapped item.
    pub start: SourcePosition,
}

impl<T> Spanning<T> {
    #[doc(hidden)]
    pub fn new(start: SourcePosition, item: T) -> Self {
        Self { item, start }
    }

    #[doc(hidden)]
    pub fn unlocated(item: T) -> Self {
        Self {
            item,
            start: SourcePosition::new_origin(),
        }
    }

    /// Modify the contents of the spanned item.
    pub fn map<O, F: FnOnce(T) -> O>(self, f: F) -> Spanning<O> {
        Spanning {
            item: f(self.item),
            start: self.start,
        }
    }

    /// Borrows the contents of the spanned item.
    pub fn as_ref(&self) -> Spanning<&T> {
        Spanning {
            item: &self.item,
            start: self.start,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Spanning<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. At {}", self.item, self.start)
    }
}

impl<T: std::error::Error> std::error::Error for Spanning<T> {}
