//! Offset to line/column conversion.

use text_size::TextSize;

/// 1-based line and column of a source offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for LineCol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Line start table for one source text.
#[derive(Debug, Clone)]
pub struct SourceMap {
    line_starts: Vec<u32>,
    len: u32,
}

impl SourceMap {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (idx, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx as u32 + 1);
            }
        }
        SourceMap {
            line_starts,
            len: source.len() as u32,
        }
    }

    /// Convert a byte offset to 1-based coordinates. Offsets past the end
    /// clamp to the end of the text.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = u32::from(offset).min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        LineCol {
            line: line as u32 + 1,
            column: offset - self.line_starts[line] + 1,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        let map = SourceMap::new("abc\ndef\n");
        assert_eq!(map.line_col(TextSize::from(0)), LineCol { line: 1, column: 1 });
        assert_eq!(map.line_col(TextSize::from(2)), LineCol { line: 1, column: 3 });
    }

    #[test]
    fn test_line_start_offsets() {
        let map = SourceMap::new("abc\ndef\n");
        assert_eq!(map.line_col(TextSize::from(4)), LineCol { line: 2, column: 1 });
        assert_eq!(map.line_col(TextSize::from(6)), LineCol { line: 2, column: 3 });
    }

    #[test]
    fn test_offset_past_end_clamps() {
        let map = SourceMap::new("ab");
        assert_eq!(map.line_col(TextSize::from(10)), LineCol { line: 1, column: 3 });
    }
}
