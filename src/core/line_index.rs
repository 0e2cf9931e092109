//! Byte offset to line number lookup for pattern matches.

/// Start offsets of every line in a source text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// 1-based line containing `offset`. Offsets past the end map to the last line.
    pub fn line_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.len);
        self.line_starts
            .binary_search(&offset)
            .unwrap_or_else(|idx| idx - 1)
            + 1
    }

    /// Byte range of a 1-based line, without its newline.
    pub fn line_range(&self, line: usize) -> std::ops::Range<usize> {
        let idx = line.saturating_sub(1).min(self.line_starts.len() - 1);
        let start = self.line_starts[idx];
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|next| next - 1)
            .unwrap_or(self.len);
        start..end
    }

    /// Number of line starts, counting a trailing empty line after a final newline.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
