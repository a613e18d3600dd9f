use crate::cursor::Position;
use crate::errors::{EditError, EditResult};

/// # The Core Philosophies of This API
///
/// - Coordinate-Based: The UI thinks in (row, col). The `TextBuffer` resolves
///   those coordinates into byte indexes within its stored lines.
/// - Immutability for Reads: Functions that just query data take `&self`.
/// - Round-trip fidelity: every stored line keeps its `\n` terminator (only
///   the final line may lack one), so concatenating the lines always
///   reproduces the loaded text byte-for-byte.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    lines: Vec<String>,

    /// Tracks if the buffer has unsaved changes.
    is_dirty: bool,
}

impl TextBuffer {
    /// Creates a new, empty text buffer holding a single empty line.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            is_dirty: false,
        }
    }

    /// Builds a buffer from loaded text. Text ending in a newline gains a
    /// trailing empty line, so the caret can sit below the final `\n`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut lines: Vec<String> = text.split_inclusive('\n').map(str::to_owned).collect();

        if lines.last().is_none_or(|l| l.ends_with('\n')) {
            lines.push(String::new());
        }

        Self {
            lines,
            is_dirty: false,
        }
    }

    fn strip_terminator(line: &str) -> &str {
        let line = line.strip_suffix('\n').unwrap_or(line);
        line.strip_suffix('\r').unwrap_or(line)
    }

    /// Returns the total number of lines in the buffer.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Marks the current contents as the save point.
    pub fn mark_saved(&mut self) {
        self.is_dirty = false;
    }

    /// Fetches a single line of text, including its terminator.
    #[must_use]
    pub fn get_line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(String::as_str)
    }

    /// Fetches a single line with its `\n` (or `\r\n`) terminator removed.
    #[must_use]
    pub fn get_line_stripped(&self, row: usize) -> Option<&str> {
        self.get_line(row).map(Self::strip_terminator)
    }

    /// Byte length of the line excluding its terminator.
    #[must_use]
    pub fn line_len(&self, row: usize) -> Option<usize> {
        self.get_line_stripped(row).map(str::len)
    }

    /// The last addressable position in the buffer.
    #[must_use]
    pub fn last_position(&self) -> Position {
        let row = self.lines.len() - 1;
        Position::new(row, Self::strip_terminator(&self.lines[row]).len())
    }

    /// Converts a (row, col) coordinate into a flat byte offset.
    #[must_use]
    pub fn pos_to_offset(&self, pos: Position) -> Option<usize> {
        let line = self.lines.get(pos.row)?;

        if pos.col > Self::strip_terminator(line).len() {
            return None;
        }

        let base: usize = self.lines[..pos.row].iter().map(String::len).sum();
        Some(base + pos.col)
    }

    /// Converts a flat byte offset back into a (row, col) coordinate.
    /// Offsets landing inside a line terminator clamp to the line's end.
    #[must_use]
    pub fn offset_to_pos(&self, offset: usize) -> Option<Position> {
        let mut remaining = offset;

        for (row, line) in self.lines.iter().enumerate() {
            let visible = Self::strip_terminator(line).len();

            if remaining <= visible {
                return Some(Position::new(row, remaining));
            }
            if remaining < line.len() {
                return Some(Position::new(row, visible));
            }

            remaining -= line.len();
        }

        None
    }

    /// Validates `pos` and returns the byte index of its column within the
    /// stored line.
    fn byte_index(&self, pos: Position) -> EditResult<usize> {
        let line = self
            .lines
            .get(pos.row)
            .ok_or_else(|| EditError::out_of_bounds(pos))?;

        if pos.col > Self::strip_terminator(line).len() || !line.is_char_boundary(pos.col) {
            return Err(EditError::out_of_bounds(pos));
        }

        Ok(pos.col)
    }

    /// Inserts text at the given position, returning the position just past
    /// the inserted text.
    pub fn insert(&mut self, pos: Position, text: &str) -> EditResult<Position> {
        let col = self.byte_index(pos)?;

        if text.is_empty() {
            return Ok(pos);
        }

        let tail = self.lines[pos.row].split_off(col);

        let end = if let Some((first, rest)) = text.split_once('\n') {
            let line = &mut self.lines[pos.row];
            line.push_str(first);
            line.push('\n');

            // Every segment but the last becomes a full line; the last one
            // is rejoined with the remainder of the split line.
            let mut inserted: Vec<String> = Vec::new();
            let mut segments = rest.split('\n').peekable();
            let mut last_len = 0;

            while let Some(segment) = segments.next() {
                if segments.peek().is_some() {
                    inserted.push(format!("{segment}\n"));
                } else {
                    last_len = segment.len();
                    inserted.push(format!("{segment}{tail}"));
                }
            }

            let end_row = pos.row + inserted.len();
            self.lines.splice(pos.row + 1..pos.row + 1, inserted);

            Position::new(end_row, last_len)
        } else {
            let line = &mut self.lines[pos.row];
            line.push_str(text);
            line.push_str(&tail);

            Position::new(pos.row, col + text.len())
        };

        self.is_dirty = true;
        Ok(end)
    }

    /// Removes the text bounded by [start, end), returning what was removed.
    /// The two positions may be given in either order.
    pub fn delete_range(&mut self, start: Position, end: Position) -> EditResult<String> {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        let s = self.byte_index(start)?;
        let e = self.byte_index(end)?;

        let removed = if start.row == end.row {
            let line = &mut self.lines[start.row];
            let removed = line[s..e].to_string();
            line.replace_range(s..e, "");
            removed
        } else {
            let mut removed = self.lines[start.row][s..].to_string();
            for line in &self.lines[start.row + 1..end.row] {
                removed.push_str(line);
            }
            removed.push_str(&self.lines[end.row][..e]);

            let merged_tail = self.lines[end.row][e..].to_string();
            self.lines[start.row].truncate(s);
            self.lines[start.row].push_str(&merged_tail);
            self.lines.drain(start.row + 1..=end.row);
            removed
        };

        if !removed.is_empty() {
            self.is_dirty = true;
        }

        Ok(removed)
    }

    /// Copies the text bounded by [start, end) without modifying the buffer.
    pub fn text_in_range(&self, start: Position, end: Position) -> EditResult<String> {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        let s = self.byte_index(start)?;
        let e = self.byte_index(end)?;

        if start.row == end.row {
            return Ok(self.lines[start.row][s..e].to_string());
        }

        let mut text = self.lines[start.row][s..].to_string();
        for line in &self.lines[start.row + 1..end.row] {
            text.push_str(line);
        }
        text.push_str(&self.lines[end.row][..e]);
        Ok(text)
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            write!(f, "{line}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod creation_tests {
    use super::*;

    #[test]
    fn test_new_buffer_has_one_empty_line() {
        let buffer = TextBuffer::new();
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.get_line(0), Some(""));
        assert!(!buffer.is_dirty());
    }

    #[test]
    fn test_from_text_round_trips() {
        for text in [
            "",
            "no newline",
            "trailing\n",
            "a\nb\nc",
            "a\nb\nc\n",
            "\n\n\n",
            "crlf line\r\nnext\r\n",
        ] {
            assert_eq!(TextBuffer::from_text(text).to_string(), text);
        }
    }

    #[test]
    fn test_trailing_newline_yields_empty_final_line() {
        let buffer = TextBuffer::from_text("abc\n");
        assert_eq!(buffer.line_count(), 2);
        assert_eq!(buffer.get_line(1), Some(""));
    }
}


#[cfg(test)]
mod editing_tests {
    use super::*;

    #[test]
    fn test_insert_basic_and_multiline() {
        let mut buffer = TextBuffer::from_text("Hello");

        let end = buffer.insert(Position::new(0, 5), " World").unwrap();
        assert_eq!(buffer.to_string(), "Hello World");
        assert_eq!(end, Position::new(0, 11));

        let end = buffer.insert(Position::new(0, 5), "\nBrave\n").unwrap();
        assert_eq!(buffer.to_string(), "Hello\nBrave\n World");
        assert_eq!(end, Position::new(2, 0));
    }

    #[test]
    fn test_insert_newline_at_end_of_line() {
        let mut buffer = TextBuffer::from_text("abc");

        let end = buffer.insert(Position::new(0, 3), "\n").unwrap();
        assert_eq!(end, Position::new(1, 0));
        assert_eq!(buffer.line_count(), 2);
        assert_eq!(buffer.to_string(), "abc\n");
    }

    #[test]
    fn test_insert_out_of_bounds_is_an_error() {
        let mut buffer = TextBuffer::from_text("ab");

        assert!(buffer.insert(Position::new(0, 3), "x").is_err());
        assert!(buffer.insert(Position::new(1, 0), "x").is_err());
        assert!(!buffer.is_dirty());
    }

    #[test]
    fn test_delete_range_single_and_multiline() {
        let mut buffer = TextBuffer::from_text("Line 1\nLine 2\nLine 3");

        let removed = buffer
            .delete_range(Position::new(1, 4), Position::new(1, 6))
            .unwrap();
        assert_eq!(removed, " 2");
        assert_eq!(buffer.to_string(), "Line 1\nLine\nLine 3");

        let removed = buffer
            .delete_range(Position::new(0, 6), Position::new(2, 5))
            .unwrap();
        assert_eq!(removed, "\nLine\nLine ");
        assert_eq!(buffer.to_string(), "Line 13");
    }

    #[test]
    fn test_delete_range_accepts_reversed_positions() {
        let mut buffer = TextBuffer::from_text("Hello World");

        buffer
            .delete_range(Position::new(0, 11), Position::new(0, 6))
            .unwrap();
        assert_eq!(buffer.to_string(), "Hello ");
    }

    #[test]
    fn test_delete_line_terminator_joins_lines() {
        let mut buffer = TextBuffer::from_text("ab\ncd");

        let removed = buffer
            .delete_range(Position::new(0, 2), Position::new(1, 0))
            .unwrap();
        assert_eq!(removed, "\n");
        assert_eq!(buffer.to_string(), "abcd");
        assert_eq!(buffer.line_count(), 1);
    }

    #[test]
    fn test_delete_everything_leaves_one_empty_line() {
        let mut buffer = TextBuffer::from_text("a\nb\nc\n");

        let end = buffer.last_position();
        buffer.delete_range(Position::new(0, 0), end).unwrap();

        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.to_string(), "");
    }

    #[test]
    fn test_text_in_range_does_not_mutate() {
        let buffer = TextBuffer::from_text("one\ntwo\nthree");

        let text = buffer
            .text_in_range(Position::new(0, 1), Position::new(2, 3))
            .unwrap();
        assert_eq!(text, "ne\ntwo\nthr");
        assert_eq!(buffer.to_string(), "one\ntwo\nthree");
    }

    #[test]
    fn test_dirty_flag_tracks_edits_and_save_point() {
        let mut buffer = TextBuffer::from_text("abc");
        assert!(!buffer.is_dirty());

        buffer.insert(Position::new(0, 0), "x").unwrap();
        assert!(buffer.is_dirty());

        buffer.mark_saved();
        assert!(!buffer.is_dirty());

        buffer
            .delete_range(Position::new(0, 0), Position::new(0, 1))
            .unwrap();
        assert!(buffer.is_dirty());
    }
}
