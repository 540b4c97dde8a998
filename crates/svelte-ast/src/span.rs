//! Span and byte offset types for source positions.

use serde::Deserialize;
use text_size::TextSize;

/// A byte offset into a source string.
pub type ByteOffset = TextSize;

/// A span representing a range in source code.
///
/// Spans are half-open intervals `[start, end)` represented as byte offsets.
/// The compiler emits them as flat `start`/`end` fields on every node; nodes
/// built by hand may omit them, in which case both default to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub struct Span {
    /// The start byte offset (inclusive).
    #[serde(default)]
    pub start: ByteOffset,
    /// The end byte offset (exclusive).
    #[serde(default)]
    pub end: ByteOffset,
}

impl Span {
    /// Creates a new span from start and end byte offsets.
    #[inline]
    pub fn new(start: impl Into<ByteOffset>, end: impl Into<ByteOffset>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Returns true if this span is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the slice of `source` covered by this span, if it is in bounds
    /// and falls on character boundaries.
    pub fn slice<'s>(&self, source: &'s str) -> Option<&'s str> {
        if self.start >= self.end {
            return None;
        }
        source.get(usize::from(self.start)..usize::from(self.end))
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", u32::from(self.start), u32::from(self.end))
    }
}
