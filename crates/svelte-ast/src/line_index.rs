//! Mapping from byte offsets to line/column positions.

use crate::span::ByteOffset;

/// A 0-indexed line and column. The column counts bytes within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LineCol {
    /// 0-indexed line number.
    pub line: u32,
    /// 0-indexed byte column.
    pub col: u32,
}

/// The start offset of every line in a source text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    /// Indexes `text`.
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i as u32 + 1))
            .collect();
        Self {
            line_starts,
            len: text.len() as u32,
        }
    }

    /// Converts an offset to a line/column position, or `None` past the end
    /// of the text.
    pub fn line_col(&self, offset: ByteOffset) -> Option<LineCol> {
        let offset = u32::from(offset);
        if offset > self.len {
            return None;
        }
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        Some(LineCol {
            line: line as u32,
            col: offset - self.line_starts[line],
        })
    }
}
