use crate::cursor::{Cursor, Position};

#[derive(Debug, Clone, PartialEq)]
pub enum EditAction {
    Insert {
        pos: Position,
        text: String,
    },
    Delete {
        start: Position,
        end: Position,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub actions: Vec<EditAction>,
    pub cursor_before: Cursor,
    pub cursor_after: Cursor,
}

#[derive(Debug, Default)]
pub struct History {
    pub undo_stack: Vec<Transaction>,
    pub redo_stack: Vec<Transaction>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all recorded transactions. Called when a document is (re)loaded.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Records a replacement (deleting a selection and immediately inserting text).
    /// Creates a single composite transaction so it can be undone in one step.
    pub fn record_replace(
        &mut self,
        start: Position,
        end: Position,
        deleted_text: &str,
        inserted_text: &str,
        cursor_before: Cursor,
        cursor_after: Cursor,
    ) {
        self.redo_stack.clear();

        self.undo_stack.push(Transaction {
            actions: vec![
                EditAction::Delete {
                    start,
                    end,
                    text: deleted_text.to_string(),
                },
                EditAction::Insert {
                    // Insert always happens exactly where the deletion started
                    pos: start,
                    text: inserted_text.to_string(),
                },
            ],
            cursor_before,
            cursor_after,
        });
    }

    /// Records an insertion, batching it with the previous insertion if they
    /// are contiguous on the same row.
    pub fn record_insert(
        &mut self,
        pos: Position,
        text: &str,
        cursor_before: Cursor,
        cursor_after: Cursor,
    ) {
        // Any new action invalidates the redo stack
        self.redo_stack.clear();

        if let Some(last_tx) = self.undo_stack.last_mut()
            && let Some(EditAction::Insert {
                pos: last_pos,
                text: last_text,
            }) = last_tx.actions.last_mut()
            && last_pos.row == pos.row // Must be on the same row to batch
            && !text.contains('\n')
            && !last_text.contains('\n')
            && last_pos.col.checked_add(last_text.len()) == Some(pos.col)
        {
            // The new insert lands exactly at the end of the last one
            last_text.push_str(text);
            last_tx.cursor_after = cursor_after;
            return;
        }

        self.undo_stack.push(Transaction {
            actions: vec![EditAction::Insert {
                pos,
                text: text.to_string(),
            }],
            cursor_before,
            cursor_after,
        });
    }

    /// Records a deletion, batching consecutive backspaces or forward deletes
    /// on the same row.
    pub fn record_delete(
        &mut self,
        start: Position,
        end: Position,
        deleted_text: &str,
        cursor_before: Cursor,
        cursor_after: Cursor,
    ) {
        self.redo_stack.clear();

        if let Some(last_tx) = self.undo_stack.last_mut()
            && let Some(EditAction::Delete {
                start: last_start,
                end: last_end,
                text: last_text,
            }) = last_tx.actions.last_mut()
            // Only batch when everything stays on one row; multi-line deletes
            // would break the bounding-box math.
            && last_start.row == start.row
            && last_end.row == end.row
            && !deleted_text.contains('\n')
            && !last_text.contains('\n')
        {
            // Backspace: the new delete ends where the previous one started.
            if end == *last_start {
                *last_text = format!("{deleted_text}{last_text}");
                *last_start = start;
                last_tx.cursor_after = cursor_after;
                return;
            }

            // Forward delete: repeated deletes at the same start position.
            if start == *last_start
                && let Some(col) = last_end.col.checked_add(deleted_text.len())
            {
                last_text.push_str(deleted_text);
                last_end.col = col;
                last_tx.cursor_after = cursor_after;
                return;
            }
        }

        self.undo_stack.push(Transaction {
            actions: vec![EditAction::Delete {
                start,
                end,
                text: deleted_text.to_string(),
            }],
            cursor_before,
            cursor_after,
        });
    }

    pub fn undo(&mut self) -> Option<Transaction> {
        let tx = self.undo_stack.pop()?;
        self.redo_stack.push(tx.clone());
        Some(tx)
    }

    pub fn redo(&mut self) -> Option<Transaction> {
        let tx = self.redo_stack.pop()?;
        self.undo_stack.push(tx.clone());
        Some(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn assert_insert(action: &EditAction, expected_pos: Position, expected_text: &str) {
        match action {
            EditAction::Insert { pos, text } => {
                assert_eq!(*pos, expected_pos, "Insert position mismatch");
                assert_eq!(text, expected_text, "Insert text mismatch");
            }
            EditAction::Delete { .. } => panic!("Expected Insert action but found Delete"),
        }
    }

    #[track_caller]
    fn assert_delete(
        action: &EditAction,
        expected_start: Position,
        expected_end: Position,
        expected_text: &str,
    ) {
        match action {
            EditAction::Delete { start, end, text } => {
                assert_eq!(*start, expected_start, "Delete start mismatch");
                assert_eq!(*end, expected_end, "Delete end mismatch");
                assert_eq!(text, expected_text, "Delete text mismatch");
            }
            EditAction::Insert { .. } => panic!("Expected Delete action but found Insert"),
        }
    }

    #[test]
    fn test_insert_batching() {
        let mut history = History::new();

        // User types 'H' then 'i'
        history.record_insert(Position::new(0, 0), "H", Cursor::new(0, 0), Cursor::new(0, 1));
        history.record_insert(Position::new(0, 1), "i", Cursor::new(0, 1), Cursor::new(0, 2));

        assert_eq!(
            history.undo_stack.len(),
            1,
            "Should batch into a single transaction"
        );

        let tx = &history.undo_stack[0];
        assert_eq!(tx.cursor_before, Cursor::new(0, 0));
        assert_eq!(tx.cursor_after, Cursor::new(0, 2));

        assert_insert(&tx.actions[0], Position::new(0, 0), "Hi");
    }

    #[test]
    fn test_newline_breaks_insert_batching() {
        let mut history = History::new();

        history.record_insert(Position::new(0, 0), "a", Cursor::new(0, 0), Cursor::new(0, 1));
        history.record_insert(Position::new(0, 1), "\n", Cursor::new(0, 1), Cursor::new(1, 0));

        assert_eq!(history.undo_stack.len(), 2);
    }

    #[test]
    fn test_backspace_batching() {
        let mut history = History::new();

        // User deletes 'b' then 'a' via backspace
        history.record_delete(
            Position::new(0, 1),
            Position::new(0, 2),
            "b",
            Cursor::new(0, 2),
            Cursor::new(0, 1),
        );
        history.record_delete(
            Position::new(0, 0),
            Position::new(0, 1),
            "a",
            Cursor::new(0, 1),
            Cursor::new(0, 0),
        );

        assert_eq!(
            history.undo_stack.len(),
            1,
            "Should batch consecutive backspaces"
        );

        let tx = &history.undo_stack[0];
        assert_delete(&tx.actions[0], Position::new(0, 0), Position::new(0, 2), "ab");
    }

    #[test]
    fn test_forward_delete_batching() {
        let mut history = History::new();

        // User presses 'Delete' on 'a' then 'b'
        history.record_delete(
            Position::new(0, 0),
            Position::new(0, 1),
            "a",
            Cursor::new(0, 0),
            Cursor::new(0, 0),
        );
        history.record_delete(
            Position::new(0, 0),
            Position::new(0, 1),
            "b",
            Cursor::new(0, 0),
            Cursor::new(0, 0),
        );

        assert_eq!(
            history.undo_stack.len(),
            1,
            "Should batch consecutive forward deletes"
        );

        let tx = &history.undo_stack[0];
        assert_delete(&tx.actions[0], Position::new(0, 0), Position::new(0, 2), "ab");
    }

    #[test]
    fn test_record_replace() {
        let mut history = History::new();

        // User highlights "apple" and types "p"
        history.record_replace(
            Position::new(0, 0),
            Position::new(0, 5),
            "apple",
            "p",
            Cursor::new_selection(Position::new(0, 0), Position::new(0, 5)),
            Cursor::new(0, 1),
        );

        assert_eq!(history.undo_stack.len(), 1);
        let tx = &history.undo_stack[0];
        assert_eq!(tx.actions.len(), 2);

        assert_delete(
            &tx.actions[0],
            Position::new(0, 0),
            Position::new(0, 5),
            "apple",
        );
        assert_insert(&tx.actions[1], Position::new(0, 0), "p");
    }

    #[test]
    fn test_replace_with_subsequent_insert_batching() {
        let mut history = History::new();

        // User highlights "apple", types "p", then continues with "i" and "e"
        history.record_replace(
            Position::new(0, 0),
            Position::new(0, 5),
            "apple",
            "p",
            Cursor::new_selection(Position::new(0, 0), Position::new(0, 5)),
            Cursor::new(0, 1),
        );
        history.record_insert(Position::new(0, 1), "i", Cursor::new(0, 1), Cursor::new(0, 2));
        history.record_insert(Position::new(0, 2), "e", Cursor::new(0, 2), Cursor::new(0, 3));

        assert_eq!(history.undo_stack.len(), 1);
        let tx = &history.undo_stack[0];
        assert_eq!(tx.actions.len(), 2);

        // The insert action should have accumulated the keystrokes
        assert_insert(&tx.actions[1], Position::new(0, 0), "pie");
    }

    #[test]
    fn test_undo_redo_stack_movement() {
        let mut history = History::new();

        history.record_insert(Position::new(0, 0), "A", Cursor::new(0, 0), Cursor::new(0, 1));

        let undone = history.undo().unwrap();
        assert_eq!(history.undo_stack.len(), 0);
        assert_eq!(history.redo_stack.len(), 1);

        let redone = history.redo().unwrap();
        assert_eq!(undone, redone);
        assert_eq!(history.undo_stack.len(), 1);
        assert_eq!(history.redo_stack.len(), 0);
    }

    #[test]
    fn test_new_edit_clears_redo_stack() {
        let mut history = History::new();

        history.record_insert(Position::new(0, 0), "A", Cursor::new(0, 0), Cursor::new(0, 1));
        history.undo();
        assert_eq!(history.redo_stack.len(), 1);

        history.record_insert(Position::new(0, 0), "B", Cursor::new(0, 0), Cursor::new(0, 1));
        assert!(history.redo_stack.is_empty());
    }

    #[test]
    fn test_clear_drops_both_stacks() {
        let mut history = History::new();

        history.record_insert(Position::new(0, 0), "A", Cursor::new(0, 0), Cursor::new(0, 1));
        history.undo();
        history.record_insert(Position::new(0, 0), "B", Cursor::new(0, 0), Cursor::new(0, 1));

        history.clear();
        assert!(history.undo_stack.is_empty());
        assert!(history.redo_stack.is_empty());
    }
}
