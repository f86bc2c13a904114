//! Position tracking for source locations
//!
//! Every token, and therefore every node, carries a [`Position`]: a 1-based line and
//! column plus the 0-based byte offset into the source. A zeroed position means "no
//! position"; the parser never leaves one in a finished tree (see
//! [`SyntaxTree::confirm_all_nodes_have_positions`](super::SyntaxTree::confirm_all_nodes_have_positions)).
//!
//! The lexer hands out byte spans; [`SourceLocation`] converts them to positions with a
//! binary search over line starts.

use serde::Serialize;
use std::fmt;

/// A location in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Position {
    /// 0-based byte offset from the start of input
    pub offset: usize,
    /// 1-based line number, 0 when the position is unset
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Whether this position was recorded from source (or assigned by a cascade)
    pub fn is_valid(&self) -> bool {
        self.line > 0
    }

    /// Shift this position by a signed line and offset delta, saturating at zero
    pub fn shifted(self, lines: isize, offset: isize) -> Self {
        Self {
            offset: self.offset.saturating_add_signed(offset),
            line: self.line.saturating_add_signed(lines),
            column: self.column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "-")
        }
    }
}

/// Provides fast conversion from byte offsets to line/column positions
pub struct SourceLocation<'a> {
    source: &'a str,
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl<'a> SourceLocation<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];

        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }

        Self {
            source,
            line_starts,
        }
    }

    /// Convert a byte offset to a position
    pub fn position(&self, byte_offset: usize) -> Position {
        let byte_offset = byte_offset.min(self.source.len());
        let line = self
            .line_starts
            .binary_search(&byte_offset)
            .unwrap_or_else(|i| i - 1);
        let line_start = self.line_starts[line];
        let column = self.source[line_start..byte_offset].chars().count() + 1;

        Position::new(byte_offset, line + 1, column)
    }

    /// Get the total number of lines in the source
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_position_is_invalid() {
        assert!(!Position::default().is_valid());
        assert_eq!(Position::default().to_string(), "-");
    }

    #[test]
    fn test_positions_are_one_based() {
        let loc = SourceLocation::new("ab\ncd");
        assert_eq!(loc.position(0), Position::new(0, 1, 1));
        assert_eq!(loc.position(1), Position::new(1, 1, 2));
        assert_eq!(loc.position(3), Position::new(3, 2, 1));
        assert_eq!(loc.position(4), Position::new(4, 2, 2));
        assert_eq!(loc.line_count(), 2);
    }

    #[test]
    fn test_columns_count_characters() {
        let loc = SourceLocation::new("é = 1");
        // 'é' is two bytes
        assert_eq!(loc.position(3), Position::new(3, 1, 3));
    }

    #[test]
    fn test_offset_past_end_clamps() {
        let loc = SourceLocation::new("a\n");
        assert_eq!(loc.position(10), Position::new(2, 2, 1));
    }

    #[test]
    fn test_shifted() {
        let pos = Position::new(10, 3, 5);
        assert_eq!(pos.shifted(2, 7), Position::new(17, 5, 5));
        assert_eq!(pos.shifted(-1, -4), Position::new(6, 2, 5));
    }
}
