/// Represents a specific location in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    pub row: usize,
    /// The byte offset within the line.
    pub col: usize,
}

impl Position {
    #[must_use]
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Represents a cursor and its associated selection range.
/// Uses the "Anchor and Head" directional selection model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// The fixed starting point of a selection.
    pub anchor: Position,
    /// The active, moving end of a selection (where the blinking caret is).
    pub head: Position,
    /// The preferred visual column. Used to maintain horizontal position
    /// when moving vertically across shorter lines.
    pub preferred_col: Option<usize>,
}

impl Cursor {
    #[must_use]
    pub fn new(row: usize, col: usize) -> Self {
        let pos = Position::new(row, col);

        Self {
            anchor: pos,
            head: pos,
            preferred_col: Some(col),
        }
    }

    /// Creates a selection from an anchor to a head.
    #[must_use]
    pub fn new_selection(anchor: Position, head: Position) -> Self {
        Self {
            anchor,
            head,
            preferred_col: Some(head.col),
        }
    }

    /// Returns true if this is just a cursor (no text selected).
    #[inline]
    #[must_use]
    pub fn no_selection(&self) -> bool {
        self.anchor == self.head
    }

    /// Returns the top-left most position of the selection.
    #[inline]
    #[must_use]
    pub fn start(&self) -> Position {
        std::cmp::min(self.anchor, self.head)
    }

    /// Returns the bottom-right most position of the selection.
    #[inline]
    #[must_use]
    pub fn end(&self) -> Position {
        std::cmp::max(self.anchor, self.head)
    }

    /// Returns the normalized tuple (start, end) regardless of selection direction.
    #[inline]
    #[must_use]
    pub fn range(&self) -> (Position, Position) {
        if self.anchor <= self.head {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }

    /// Moves the head to a new position, updating the selection.
    pub fn set_head(&mut self, pos: Position) {
        self.head = pos;
        self.preferred_col = Some(pos.col);
    }

    /// Moves both anchor and head to the same position (clears selection).
    pub fn clear_selection(&mut self) {
        self.anchor = self.head;
    }

    /// Moves one line up, landing on the preferred column where the target
    /// line is long enough. `extend` keeps the anchor in place (shift-select).
    pub fn move_up(&mut self, prev_line_len: usize, extend: bool) {
        if self.head.row == 0 {
            return;
        }

        let col = self.preferred_col.unwrap_or(self.head.col).min(prev_line_len);
        self.head = Position::new(self.head.row - 1, col);

        if !extend {
            self.anchor = self.head;
        }
    }

    /// Moves one line down unless already on the last line.
    pub fn move_down(&mut self, next_line_len: usize, is_last_line: bool, extend: bool) {
        if is_last_line {
            return;
        }

        let col = self.preferred_col.unwrap_or(self.head.col).min(next_line_len);
        self.head = Position::new(self.head.row + 1, col);

        if !extend {
            self.anchor = self.head;
        }
    }

    /// Moves one column left, wrapping to the end of the previous line.
    pub fn move_left(&mut self, prev_line_len: usize, extend: bool) {
        let h = self.head;
        let target = if h.col > 0 {
            Position::new(h.row, h.col - 1)
        } else if h.row > 0 {
            Position::new(h.row - 1, prev_line_len)
        } else {
            h
        };

        self.head = target;
        self.preferred_col = Some(target.col);

        if !extend {
            self.anchor = self.head;
        }
    }

    /// Moves one column right, wrapping to the start of the next line.
    pub fn move_right(&mut self, line_len: usize, is_last_line: bool, extend: bool) {
        let h = self.head;
        let target = if h.col < line_len {
            Position::new(h.row, h.col + 1)
        } else if !is_last_line {
            Position::new(h.row + 1, 0)
        } else {
            h
        };

        self.head = target;
        self.preferred_col = Some(target.col);

        if !extend {
            self.anchor = self.head;
        }
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
