//! Source text positions and ranges.
//!
//! Internally every offset is a UTF-8 byte offset ([`TextSize`]). Editors
//! speak in `(line, UTF-16 code unit)` pairs; [`LineIndex`] converts
//! between the two.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};

// Re-export from text-size for compatibility
pub use text_size::TextRange;
pub use text_size::TextSize;

/// A line and column position in source text.
///
/// Both line and column are 0-indexed internally, but displayed as 1-indexed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct LineCol {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column (in UTF-8 bytes, not characters)
    pub col: u32,
}

impl LineCol {
    /// Create a new LineCol position.
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// Get 1-indexed line number (for display).
    #[inline]
    pub const fn line_one_indexed(self) -> u32 {
        self.line + 1
    }

    /// Get 1-indexed column number (for display).
    #[inline]
    pub const fn col_one_indexed(self) -> u32 {
        self.col + 1
    }
}

impl fmt::Debug for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_one_indexed(), self.col_one_indexed())
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_one_indexed(), self.col_one_indexed())
    }
}

/// An editor position: 0-indexed line and UTF-16 code unit column.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct Utf16Position {
    pub line: u32,
    pub character: u32,
}

impl Utf16Position {
    #[inline]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A half-open range of editor positions.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct Utf16Range {
    pub start: Utf16Position,
    pub end: Utf16Position,
}

impl Utf16Range {
    #[inline]
    pub const fn new(start: Utf16Position, end: Utf16Position) -> Self {
        Self { start, end }
    }
}

/// A character that takes more than one UTF-8 byte.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct WideChar {
    /// Line-relative byte offset of the first byte
    start: u32,
    /// Line-relative byte offset past the last byte
    end: u32,
}

impl WideChar {
    fn utf8_len(self) -> u32 {
        self.end - self.start
    }

    fn utf16_len(self) -> u32 {
        if self.utf8_len() == 4 { 2 } else { 1 }
    }
}

/// Index for converting between byte offsets and line/column positions.
#[derive(Clone, Debug)]
pub struct LineIndex {
    /// Byte offset of the start of each line
    line_starts: Vec<TextSize>,
    /// Byte offset of the end of each line, before `\n` or `\r\n`
    line_ends: Vec<TextSize>,
    /// Multi-byte characters of each line that has any
    wide_chars: FxHashMap<u32, Vec<WideChar>>,
    /// Length of the indexed text
    len: TextSize,
}

impl LineIndex {
    /// Build a line index from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        let mut line_ends = Vec::new();
        let mut wide_chars: FxHashMap<u32, Vec<WideChar>> = FxHashMap::default();
        let mut line = 0u32;
        let mut line_start = 0u32;

        for (offset, c) in text.char_indices() {
            let offset = offset as u32;
            if c == '\n' {
                let crlf = offset > 0 && text.as_bytes()[offset as usize - 1] == b'\r';
                line_ends.push(TextSize::from(offset - u32::from(crlf)));
                line += 1;
                line_start = offset + 1;
                line_starts.push(TextSize::from(line_start));
                continue;
            }
            let width = c.len_utf8() as u32;
            if width > 1 {
                let start = offset - line_start;
                wide_chars.entry(line).or_default().push(WideChar {
                    start,
                    end: start + width,
                });
            }
        }

        line_ends.push(TextSize::of(text));

        Self {
            line_starts,
            line_ends,
            wide_chars,
            len: TextSize::of(text),
        }
    }

    /// Convert a byte offset to a line/column position.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);

        let line_start = self.line_starts[line];
        let col = offset - line_start;

        LineCol {
            line: line as u32,
            col: col.into(),
        }
    }

    /// Convert a line/column position to a byte offset.
    pub fn offset(&self, line_col: LineCol) -> Option<TextSize> {
        let line_start = self.line_starts.get(line_col.line as usize)?;
        Some(*line_start + TextSize::from(line_col.col))
    }

    /// Convert an editor position to a byte offset.
    ///
    /// Columns past the end of a line clamp to the end of that line
    /// (before its newline). A line equal to the line count addresses
    /// the end of the text.
    pub fn offset_utf16(&self, pos: Utf16Position) -> Result<TextSize> {
        let Some(&line_start) = self.line_starts.get(pos.line as usize) else {
            if pos.line as usize == self.line_starts.len() {
                return Ok(self.len);
            }
            return Err(Error::PositionOutOfBounds {
                line: pos.line,
                character: pos.character,
            });
        };

        let line_len = self.line_ends[pos.line as usize] - line_start;
        let col = self.utf16_to_utf8_col(pos)?.min(line_len.into());
        self.offset(LineCol::new(pos.line, col)).ok_or(Error::PositionOutOfBounds {
            line: pos.line,
            character: pos.character,
        })
    }

    /// Convert a byte offset to an editor position.
    pub fn position_utf16(&self, offset: TextSize) -> Utf16Position {
        let LineCol { line, col } = self.line_col(offset);
        let mut character = col;
        if let Some(chars) = self.wide_chars.get(&line) {
            for c in chars.iter().take_while(|c| c.end <= col) {
                character -= c.utf8_len() - c.utf16_len();
            }
        }
        Utf16Position { line, character }
    }

    fn utf16_to_utf8_col(&self, pos: Utf16Position) -> Result<u32> {
        let target = pos.character;
        let Some(chars) = self.wide_chars.get(&pos.line) else {
            return Ok(target);
        };

        // (utf8, utf16) columns right after the last character visited
        let mut utf8 = 0u32;
        let mut utf16 = 0u32;
        for &c in chars {
            let narrow = c.start - utf8;
            if target <= utf16 + narrow {
                return Ok(utf8.saturating_add(target - utf16));
            }
            utf16 += narrow;
            if target < utf16 + c.utf16_len() {
                return Err(Error::SplitSurrogatePair {
                    line: pos.line,
                    character: pos.character,
                });
            }
            utf16 += c.utf16_len();
            utf8 = c.end;
        }
        // Columns past the line end saturate; the caller clamps them.
        Ok(utf8.saturating_add(target - utf16))
    }

    /// Length of the indexed text in bytes.
    pub fn text_len(&self) -> TextSize {
        self.len
    }

    /// Get the number of lines.
    pub fn len(&self) -> usize {
        self.line_starts.len()
    }

    /// Check if there are no lines (empty file).
    pub fn is_empty(&self) -> bool {
        self.line_starts.is_empty()
    }
}
