use crate::session::{FileCategory, ViewState};
use editor_core::buffer::TextBuffer;
use editor_core::cursor::{Cursor, Position};
use editor_core::errors::{EditError, EditResult};
use editor_core::history::{EditAction, History, Transaction};
use editor_core::search::{Direction, SearchQuery};
use editor_core::{cpp, indent, search};
use io::modified::ModificationRecord;

/// Change notifications dispatched synchronously after a mutation completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    Loaded,
    Saved,
    TextInserted,
    TextDeleted,
}

pub type Listener = Box<dyn FnMut(DocumentEvent)>;

/// Owns one file's in-memory state: the text buffer (materialized lazily on
/// first access), undo history, caret, and the on-disk modification record.
/// Views hold a shared handle to the document and register listeners for
/// change events; they never own the buffer themselves.
pub struct Document {
    path: Option<std::path::PathBuf>,
    category: FileCategory,
    buffer: Option<TextBuffer>,
    pub history: History,
    pub cursor: Cursor,
    mod_record: ModificationRecord,
    last_view_state: Option<ViewState>,
    listeners: Vec<Listener>,

    /// Prevents undo/redo playback from being recorded as new edits.
    is_recording: bool,
}

impl Document {
    /// A document with no backing file.
    #[must_use]
    pub fn untitled() -> Self {
        Self {
            path: None,
            category: FileCategory::PlainText,
            buffer: Some(TextBuffer::new()),
            history: History::new(),
            cursor: Cursor::default(),
            mod_record: ModificationRecord::default(),
            last_view_state: None,
            listeners: Vec::new(),
            is_recording: true,
        }
    }

    /// A document for a file on disk. The file category is resolved here,
    /// once; the buffer itself is not read until [`Self::ensure_loaded`].
    #[must_use]
    pub fn open(path: impl Into<std::path::PathBuf>) -> Self {
        let path = path.into();

        Self {
            category: FileCategory::of_path(&path),
            path: Some(path),
            buffer: None,
            history: History::new(),
            cursor: Cursor::default(),
            mod_record: ModificationRecord::default(),
            last_view_state: None,
            listeners: Vec::new(),
            is_recording: true,
        }
    }

    /// Points this document at a different file and loads it. The previous
    /// buffer, history, and saved view state are discarded.
    pub fn open_file(&mut self, path: impl Into<std::path::PathBuf>) {
        let path = path.into();
        log::info!("opening {}", path.display());

        self.category = FileCategory::of_path(&path);
        self.path = Some(path);
        self.cursor = Cursor::default();
        self.last_view_state = None;
        self.reload_internal();
    }

    /// Materializes the buffer on first access. A missing file loads as an
    /// empty buffer.
    pub fn ensure_loaded(&mut self) {
        if self.buffer.is_none() {
            self.reload_internal();
        }
    }

    /// Re-reads the file from disk, dropping unsaved edits and history.
    pub fn reload(&mut self) {
        self.reload_internal();
    }

    fn reload_internal(&mut self) {
        let text = match self.path.as_deref() {
            Some(path) => match io::mmap::read_file_text(path) {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("could not read {}: {e}", path.display());
                    String::new()
                }
            },
            None => String::new(),
        };

        self.buffer = Some(TextBuffer::from_text(&text));
        self.mod_record = match self.path.as_deref() {
            Some(path) => ModificationRecord::capture(path),
            None => ModificationRecord::default(),
        };
        self.history.clear();
        self.clamp_cursor();
        self.notify(DocumentEvent::Loaded);
    }

    /// Writes the buffer to its file through an atomic temp-file rename.
    /// Failure is reported to the caller as `false`; nothing is retried and
    /// the target file is never left half-written.
    pub fn save(&mut self) -> bool {
        let Some(path) = self.path.clone() else {
            log::warn!("save requested for a document with no file path");
            return false;
        };

        self.ensure_loaded();
        let Some(buffer) = self.buffer.as_mut() else {
            return false;
        };

        let contents = buffer.to_string();
        match io::save::atomic_write(&path, contents.as_bytes()) {
            Ok(()) => {
                buffer.mark_saved();
                self.mod_record = ModificationRecord::capture(&path);
                log::info!("saved {}", path.display());
                self.notify(DocumentEvent::Saved);
                true
            }
            Err(e) => {
                log::warn!("saving {} failed: {e}", path.display());
                false
            }
        }
    }

    /// Writes a copy of the buffer to `path`. This document keeps its own
    /// path, save point, and modification record; only the copy changes.
    pub fn save_as(&mut self, path: &std::path::Path) -> bool {
        self.ensure_loaded();
        let Some(buffer) = self.buffer.as_ref() else {
            return false;
        };

        match io::save::atomic_write(path, buffer.to_string().as_bytes()) {
            Ok(()) => {
                log::info!("saved copy to {}", path.display());
                true
            }
            Err(e) => {
                log::warn!("saving copy to {} failed: {e}", path.display());
                false
            }
        }
    }

    /// Whether the buffer has edits past the last save point.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.buffer.as_ref().is_some_and(TextBuffer::is_dirty)
    }

    /// Compares the stored modification record against the file as it is on
    /// disk right now.
    #[must_use]
    pub fn has_changed_on_disk(&self) -> bool {
        match self.path.as_deref() {
            Some(path) => !self.mod_record.matches_disk(path),
            None => false,
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn category(&self) -> FileCategory {
        self.category
    }

    pub fn add_listener(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    fn notify(&mut self, event: DocumentEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }

    /// Stores the caret/scroll state of a closing view for later reopening.
    pub fn store_view_state(&mut self, state: ViewState) {
        self.last_view_state = Some(state);
    }

    #[must_use]
    pub fn view_state(&self) -> Option<ViewState> {
        self.last_view_state
    }
}

/*

===========================
========= GETTERS =========
===========================

*/

impl Document {
    #[must_use]
    pub fn get_line_count(&self) -> usize {
        self.buffer.as_ref().map_or(0, TextBuffer::line_count)
    }

    #[must_use]
    pub fn get_line_stripped(&self, row: usize) -> Option<&str> {
        self.buffer.as_ref()?.get_line_stripped(row)
    }

    #[must_use]
    pub fn get_visible_line_len_at(&self, row: usize) -> Option<usize> {
        self.buffer.as_ref()?.line_len(row)
    }

    /// The currently selected text, or an empty string.
    #[must_use]
    pub fn get_selected_text(&self) -> String {
        let Some(buffer) = self.buffer.as_ref() else {
            return String::new();
        };

        if self.cursor.no_selection() {
            return String::new();
        }

        let (start, end) = self.cursor.range();
        buffer.text_in_range(start, end).unwrap_or_default()
    }

    /// The whole buffer as one string.
    #[must_use]
    pub fn contents(&self) -> String {
        self.buffer
            .as_ref()
            .map(TextBuffer::to_string)
            .unwrap_or_default()
    }
}

/*

========================================
========= INSERTION & DELETION =========
========================================

*/

impl Document {
    /// Inserts text at the cursor. If text is selected, it replaces the
    /// selection.
    pub fn insert(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        match self.try_insert(text) {
            Ok(()) => self.notify(DocumentEvent::TextInserted),
            Err(e) => log::warn!("insert failed: {e}"),
        }
    }

    fn try_insert(&mut self, text: &str) -> EditResult<()> {
        let cursor_before = self.cursor;
        let (start, end) = cursor_before.range();

        let Some(buffer) = self.buffer.as_mut() else {
            return Ok(());
        };

        // A selection is replaced: delete it first, then insert where it
        // started.
        let replaced = if cursor_before.no_selection() {
            None
        } else {
            let deleted = buffer.text_in_range(start, end)?;
            buffer.delete_range(start, end)?;
            Some(deleted)
        };

        let end_pos = buffer.insert(start, text)?;
        let cursor_after = Cursor::new(end_pos.row, end_pos.col);

        if self.is_recording {
            match &replaced {
                Some(deleted) => self.history.record_replace(
                    start,
                    end,
                    deleted,
                    text,
                    cursor_before,
                    cursor_after,
                ),
                None => self
                    .history
                    .record_insert(start, text, cursor_before, cursor_after),
            }
        }

        self.cursor = cursor_after;
        Ok(())
    }

    /// Deletes the selection, or a single character next to the caret.
    /// `is_backspace` picks the character behind the cursor rather than the
    /// one in front of it.
    pub fn delete(&mut self, is_backspace: bool) {
        match self.try_delete(is_backspace) {
            Ok(true) => self.notify(DocumentEvent::TextDeleted),
            Ok(false) => {}
            Err(e) => log::warn!("delete failed: {e}"),
        }
    }

    fn try_delete(&mut self, is_backspace: bool) -> EditResult<bool> {
        let cursor_before = self.cursor;
        let Some(buffer) = self.buffer.as_mut() else {
            return Ok(false);
        };

        let (start, end) = if !cursor_before.no_selection() {
            cursor_before.range()
        } else {
            let head = cursor_before.head;

            if is_backspace {
                if head.col > 0 {
                    let line = buffer
                        .get_line_stripped(head.row)
                        .ok_or_else(|| EditError::out_of_bounds(head))?;
                    (
                        Position::new(head.row, prev_char_boundary(line, head.col)),
                        head,
                    )
                } else if head.row > 0 {
                    // Deleting the previous line's terminator joins the lines.
                    let prev_len = buffer
                        .line_len(head.row - 1)
                        .ok_or_else(|| EditError::out_of_bounds(head))?;
                    (Position::new(head.row - 1, prev_len), head)
                } else {
                    return Ok(false);
                }
            } else {
                let line = buffer
                    .get_line_stripped(head.row)
                    .ok_or_else(|| EditError::out_of_bounds(head))?;

                if head.col < line.len() {
                    (
                        head,
                        Position::new(head.row, next_char_boundary(line, head.col)),
                    )
                } else if head.row + 1 < buffer.line_count() {
                    (head, Position::new(head.row + 1, 0))
                } else {
                    return Ok(false);
                }
            }
        };

        let removed = buffer.delete_range(start, end)?;
        self.cursor = Cursor::new(start.row, start.col);

        if self.is_recording && !removed.is_empty() {
            self.history
                .record_delete(start, end, &removed, cursor_before, self.cursor);
        }

        Ok(!removed.is_empty())
    }

    /// Removes [start, end) as one recorded edit, leaving the cursor at
    /// `start`. Used by the re-indentation paths.
    fn delete_span(&mut self, start: Position, end: Position) {
        let cursor_before = self.cursor;

        let removed = {
            let Some(buffer) = self.buffer.as_mut() else {
                return;
            };

            match buffer.delete_range(start, end) {
                Ok(removed) => removed,
                Err(e) => {
                    log::warn!("reindent delete failed: {e}");
                    return;
                }
            }
        };

        if removed.is_empty() {
            return;
        }

        self.cursor = Cursor::new(start.row, start.col);
        if self.is_recording {
            self.history
                .record_delete(start, end, &removed, cursor_before, self.cursor);
        }
        self.notify(DocumentEvent::TextDeleted);
    }

    fn clamp_cursor(&mut self) {
        let Some(buffer) = self.buffer.as_ref() else {
            return;
        };

        let last = buffer.last_position();
        let clamp = |pos: Position| {
            if pos.row > last.row {
                return last;
            }
            Position::new(pos.row, pos.col.min(buffer.line_len(pos.row).unwrap_or(0)))
        };

        self.cursor = Cursor::new_selection(clamp(self.cursor.anchor), clamp(self.cursor.head));
    }
}

/*

===============================
========= UNDO & REDO =========
===============================

*/

impl Document {
    pub fn undo(&mut self) {
        if let Some(transaction) = self.history.undo() {
            self.apply_transaction(&transaction, true);
        }
    }

    pub fn redo(&mut self) {
        if let Some(transaction) = self.history.redo() {
            self.apply_transaction(&transaction, false);
        }
    }

    /// Plays a transaction back without recording it. Undo applies the
    /// actions inverted and in reverse order.
    fn apply_transaction(&mut self, transaction: &Transaction, is_undo: bool) {
        self.is_recording = false;

        let actions: Vec<&EditAction> = if is_undo {
            transaction.actions.iter().rev().collect()
        } else {
            transaction.actions.iter().collect()
        };

        for action in actions {
            if let Err(e) = self.apply_action(action, is_undo) {
                log::warn!("history playback failed: {e}");
                break;
            }
        }

        self.cursor = if is_undo {
            transaction.cursor_before
        } else {
            transaction.cursor_after
        };
        self.is_recording = true;
    }

    fn apply_action(&mut self, action: &EditAction, is_undo: bool) -> EditResult<()> {
        let Some(buffer) = self.buffer.as_mut() else {
            return Ok(());
        };

        match action {
            EditAction::Insert { pos, text } => {
                if is_undo {
                    let end = end_position_of(*pos, text);
                    buffer.delete_range(*pos, end)?;
                    self.notify(DocumentEvent::TextDeleted);
                } else {
                    buffer.insert(*pos, text)?;
                    self.notify(DocumentEvent::TextInserted);
                }
            }
            EditAction::Delete { start, end, text } => {
                if is_undo {
                    buffer.insert(*start, text)?;
                    self.notify(DocumentEvent::TextInserted);
                } else {
                    buffer.delete_range(*start, *end)?;
                    self.notify(DocumentEvent::TextDeleted);
                }
            }
        }

        Ok(())
    }
}

/*

=================================
========= SEARCH & INDENT =======
=================================

*/

impl Document {
    /// Runs the wraparound search from the caret and selects the hit.
    /// Searching past the current selection (`skip_current_selection`)
    /// starts from the selection's end; otherwise from its start, so a live
    /// search can keep re-finding what is already selected.
    ///
    /// Returns whether anything was found; on a miss the selection is left
    /// untouched.
    pub fn find_next(
        &mut self,
        query: &SearchQuery,
        direction: Direction,
        skip_current_selection: bool,
    ) -> bool {
        self.ensure_loaded();
        let Some(buffer) = self.buffer.as_ref() else {
            return false;
        };

        let from = if skip_current_selection {
            self.cursor.end()
        } else {
            self.cursor.start()
        };

        match search::find_next(buffer, query, direction, from) {
            Some((start, end)) => {
                self.cursor = Cursor::new_selection(start, end);
                true
            }
            None => false,
        }
    }

    /// C++-aware newline: inserts the line break, then re-indents the new
    /// line. The remainder of the broken line keeps no stale indentation; a
    /// remainder opening with `}` aligns with the enclosing block, anything
    /// else continues the previous line's indent. A previous line that looks
    /// like a brace-less `if`/`for`/`while` header gets one extra level.
    pub fn handle_return_key(&mut self, tab: &str) {
        self.insert("\n");

        let pos = self.cursor.head;
        if pos.row == 0 {
            // The insert failed (stale cursor); nothing to re-indent.
            return;
        }

        let (indents, leading_len, closes_block, prev_is_control) = {
            let Some(buffer) = self.buffer.as_ref() else {
                return;
            };

            let indents = indent::indent_for_block(buffer, pos.row, tab).unwrap_or_default();
            let remainder = buffer.get_line_stripped(pos.row).unwrap_or("");
            let leading_len = indent::leading_whitespace(remainder).len();
            let closes_block = remainder.trim_start().starts_with('}');
            let previous = buffer.get_line_stripped(pos.row - 1).unwrap_or("").trim();
            let prev_is_control = cpp::is_control_flow_header(previous);

            (indents, leading_len, closes_block, prev_is_control)
        };

        if leading_len > 0 {
            self.delete_span(pos, Position::new(pos.row, leading_len));
        }

        if closes_block {
            self.insert(&indents.block);
        } else {
            self.insert(&indents.last_line);
        }

        if prev_is_control {
            self.insert(tab);
        }
    }

    /// C++-aware brace insertion. A brace typed on a blank line (below the
    /// first row, with nothing selected) first re-aligns the line with its
    /// enclosing block; `{` additionally indents one level, anticipating the
    /// statement that follows it. Without an enclosing block the brace is
    /// inserted as-is.
    pub fn insert_brace(&mut self, brace: char, tab: &str) {
        debug_assert!(brace == '{' || brace == '}');

        let head = self.cursor.head;
        let on_blank_line = self
            .buffer
            .as_ref()
            .and_then(|b| b.get_line_stripped(head.row))
            .is_some_and(|line| line.trim().is_empty());

        if self.cursor.no_selection() && head.row > 0 && on_blank_line {
            let indents = self
                .buffer
                .as_ref()
                .and_then(|b| indent::indent_for_block(b, head.row, tab));

            if let Some(indents) = indents {
                let line_len = self
                    .buffer
                    .as_ref()
                    .and_then(|b| b.line_len(head.row))
                    .unwrap_or(0);

                self.delete_span(Position::new(head.row, 0), Position::new(head.row, line_len));
                self.insert(&indents.block);
                if brace == '{' {
                    self.insert(tab);
                }
            }
        }

        self.insert(&brace.to_string());
    }
}

/// The position just past `text` when inserted at `start`.
fn end_position_of(start: Position, text: &str) -> Position {
    match text.rsplit_once('\n') {
        Some((head, last)) => {
            Position::new(start.row + head.matches('\n').count() + 1, last.len())
        }
        None => Position::new(start.row, start.col + text.len()),
    }
}

fn prev_char_boundary(line: &str, col: usize) -> usize {
    line[..col]
        .chars()
        .next_back()
        .map_or(0, |c| col - c.len_utf8())
}

fn next_char_boundary(line: &str, col: usize) -> usize {
    col + line[col..].chars().next().map_or(0, char::len_utf8)
}

#[cfg(test)]
mod editing_tests {
    use super::*;

    fn setup() -> Document {
        Document::untitled()
    }

    #[test]
    fn test_newline_insertion_math() {
        let mut doc = setup();

        // Pressing Enter on an empty line
        doc.insert("\n");
        assert_eq!(
            doc.cursor.head,
            Position::new(1, 0),
            "Cursor should be at start of line 2"
        );

        // Inserting text then Enter
        doc.insert("Hi\n");
        assert_eq!(
            doc.cursor.head,
            Position::new(2, 0),
            "Cursor should be at start of line 3"
        );
    }

    #[test]
    fn test_insert_replaces_selection_across_lines() {
        let mut doc = setup();
        doc.insert("Hello\nWorld\nEnd");

        // Select "ello\nWorld\nE"
        doc.cursor = Cursor::new_selection(Position::new(0, 1), Position::new(2, 1));
        doc.insert("!");

        assert_eq!(doc.contents(), "H!nd");
        assert_eq!(doc.cursor.head, Position::new(0, 2));

        doc.undo();
        assert_eq!(doc.contents(), "Hello\nWorld\nEnd");
    }

    #[test]
    fn test_backspace_at_line_boundary() {
        let mut doc = setup();
        doc.insert("ABC\nDEF");
        doc.cursor = Cursor::new(1, 0); // Cursor at start of "DEF"

        // Backspace should delete the '\n'
        doc.delete(true);

        assert_eq!(doc.get_line_stripped(0), Some("ABCDEF"));
        assert_eq!(doc.cursor.head, Position::new(0, 3));

        doc.undo();
        assert_eq!(doc.get_line_stripped(0), Some("ABC"));
        assert_eq!(doc.get_line_stripped(1), Some("DEF"));
        assert_eq!(doc.cursor.head, Position::new(1, 0));
    }

    #[test]
    fn test_delete_forward_at_end_of_line() {
        let mut doc = setup();
        doc.insert("A\nB");
        doc.cursor = Cursor::new(0, 1); // After 'A', before '\n'

        doc.delete(false);
        assert_eq!(doc.contents(), "AB");

        doc.undo();
        assert_eq!(doc.contents(), "A\nB");
        assert_eq!(doc.cursor.head, Position::new(0, 1));
    }

    #[test]
    fn test_consecutive_inserts_batching() {
        let mut doc = setup();
        doc.insert("a");
        doc.insert("b");
        doc.insert("c");

        // Typed character by character, History should batch them
        assert_eq!(doc.history.undo_stack.len(), 1);

        doc.undo();
        assert_eq!(doc.cursor.head, Position::new(0, 0));
        assert_eq!(doc.contents(), "");
    }

    #[test]
    fn test_redo_restores_correct_cursor() {
        let mut doc = setup();
        doc.insert("Hello");
        let pos_after_hello = doc.cursor.head;

        doc.undo();
        assert_eq!(doc.cursor.head, Position::new(0, 0));

        doc.redo();
        assert_eq!(doc.cursor.head, pos_after_hello);
        assert_eq!(doc.get_line_stripped(0), Some("Hello"));
    }

    #[test]
    fn test_selected_text() {
        let mut doc = setup();
        doc.insert("one\ntwo");

        doc.cursor = Cursor::new_selection(Position::new(0, 1), Position::new(1, 2));
        assert_eq!(doc.get_selected_text(), "ne\ntw");

        doc.cursor = Cursor::new(0, 1);
        assert_eq!(doc.get_selected_text(), "");
    }
}


#[cfg(test)]
mod search_tests {
    use super::*;

    fn doc_with(text: &str) -> Document {
        let mut doc = Document::untitled();
        doc.insert(text);
        doc.cursor = Cursor::new(0, 0);
        doc
    }

    #[test]
    fn test_find_next_selects_match() {
        let mut doc = doc_with("aa bb aa");
        let query = SearchQuery::new("aa", true);

        assert!(doc.find_next(&query, Direction::Forward, false));
        assert_eq!(doc.cursor.start(), Position::new(0, 0));
        assert_eq!(doc.cursor.end(), Position::new(0, 2));
    }

    #[test]
    fn test_skip_current_selection_advances() {
        let mut doc = doc_with("aa bb aa");
        let query = SearchQuery::new("aa", true);

        doc.find_next(&query, Direction::Forward, false);
        // Without skipping we stay put; with skipping we move on.
        assert!(doc.find_next(&query, Direction::Forward, false));
        assert_eq!(doc.cursor.start(), Position::new(0, 0));

        assert!(doc.find_next(&query, Direction::Forward, true));
        assert_eq!(doc.cursor.start(), Position::new(0, 6));
        assert_eq!(doc.cursor.end(), Position::new(0, 8));
    }

    #[test]
    fn test_miss_leaves_selection_untouched() {
        let mut doc = doc_with("aa bb aa");
        let query = SearchQuery::new("aa", true);
        doc.find_next(&query, Direction::Forward, false);
        let selection = doc.cursor;

        assert!(!doc.find_next(&SearchQuery::new("zz", true), Direction::Forward, true));
        assert_eq!(doc.cursor, selection);
    }
}
