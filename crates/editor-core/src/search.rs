use crate::buffer::TextBuffer;
use crate::cursor::Position;
use memchr::memmem;

/// A search term plus how it should be compared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    pub case_sensitive: bool,
}

impl SearchQuery {
    #[must_use]
    pub fn new(term: impl Into<String>, case_sensitive: bool) -> Self {
        Self {
            term: term.into(),
            case_sensitive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Finds the nearest occurrence of `query.term`, scanning line-by-line away
/// from `from` with wraparound.
///
/// The scan visits each line at most once: after `line_count` iterations an
/// absent term gives up rather than looping forever. Forward search begins
/// at `from.col` within the starting line; backward search only considers
/// the part of the starting line before `from.col`. Case-insensitive
/// comparison folds ASCII letters, which keeps match spans byte-accurate.
///
/// Returns the matched span, or `None` when the term is empty or absent.
#[must_use]
pub fn find_next(
    buffer: &TextBuffer,
    query: &SearchQuery,
    direction: Direction,
    from: Position,
) -> Option<(Position, Position)> {
    if query.term.is_empty() {
        return None;
    }

    let total = buffer.line_count();
    let needle = fold_case(&query.term, query.case_sensitive);
    let needle = needle.as_bytes();

    let mut row = from.row.min(total - 1);
    // `None` means "the whole line": set after leaving the starting line.
    let mut col: Option<usize> = Some(from.col);

    for _ in 0..total {
        let line = buffer.get_line_stripped(row)?;
        let hay = fold_case(line, query.case_sensitive);
        let hay = hay.as_bytes();

        match direction {
            Direction::Forward => {
                let start = col.unwrap_or(0).min(hay.len());

                if let Some(i) = memmem::find(&hay[start..], needle) {
                    let at = start + i;
                    return Some((
                        Position::new(row, at),
                        Position::new(row, at + needle.len()),
                    ));
                }

                col = Some(0);
                row = (row + 1) % total;
            }
            Direction::Backward => {
                let end = col.map_or(hay.len(), |c| c.min(hay.len()));

                if let Some(at) = memmem::rfind(&hay[..end], needle) {
                    return Some((
                        Position::new(row, at),
                        Position::new(row, at + needle.len()),
                    ));
                }

                col = None;
                row = if row == 0 { total - 1 } else { row - 1 };
            }
        }
    }

    None
}

fn fold_case(text: &str, case_sensitive: bool) -> std::borrow::Cow<'_, str> {
    if case_sensitive {
        std::borrow::Cow::Borrowed(text)
    } else {
        std::borrow::Cow::Owned(text.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer() -> TextBuffer {
        TextBuffer::from_text("alpha beta\ngamma\nbeta gamma beta\n")
    }

    fn sensitive(term: &str) -> SearchQuery {
        SearchQuery::new(term, true)
    }

    #[test]
    fn test_forward_find_from_start() {
        let hit = find_next(
            &buffer(),
            &sensitive("beta"),
            Direction::Forward,
            Position::new(0, 0),
        );
        assert_eq!(hit, Some((Position::new(0, 6), Position::new(0, 10))));
    }

    #[test]
    fn test_forward_find_starts_at_caret_column() {
        // Caret just past the first "beta": the next hit is on line 3.
        let hit = find_next(
            &buffer(),
            &sensitive("beta"),
            Direction::Forward,
            Position::new(0, 7),
        );
        assert_eq!(hit, Some((Position::new(2, 0), Position::new(2, 4))));
    }

    #[test]
    fn test_forward_search_wraps_around() {
        // From the last line, the only "alpha" is found by wrapping to line 1.
        let hit = find_next(
            &buffer(),
            &sensitive("alpha"),
            Direction::Forward,
            Position::new(2, 5),
        );
        assert_eq!(hit, Some((Position::new(0, 0), Position::new(0, 5))));
    }

    #[test]
    fn test_absent_term_gives_up_after_one_lap() {
        let hit = find_next(
            &buffer(),
            &sensitive("delta"),
            Direction::Forward,
            Position::new(1, 0),
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn test_empty_term_is_never_found() {
        let hit = find_next(
            &buffer(),
            &sensitive(""),
            Direction::Forward,
            Position::new(0, 0),
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn test_case_sensitive_requires_exact_case() {
        let buffer = TextBuffer::from_text("Alpha\nALPHA\nalpha");

        let hit = find_next(
            &buffer,
            &sensitive("ALPHA"),
            Direction::Forward,
            Position::new(0, 0),
        );
        assert_eq!(hit, Some((Position::new(1, 0), Position::new(1, 5))));
    }

    #[test]
    fn test_case_insensitive_matches_any_case() {
        let buffer = TextBuffer::from_text("Alpha\nALPHA\nalpha");
        let query = SearchQuery::new("aLpHa", false);

        let hit = find_next(&buffer, &query, Direction::Forward, Position::new(0, 0));
        assert_eq!(hit, Some((Position::new(0, 0), Position::new(0, 5))));

        let hit = find_next(&buffer, &query, Direction::Forward, Position::new(1, 0));
        assert_eq!(hit, Some((Position::new(1, 0), Position::new(1, 5))));
    }

    #[test]
    fn test_backward_find_stays_before_caret() {
        // Caret sits at the start of the last "beta"; searching backward must
        // skip it and land on the one at column 0 of the same line.
        let hit = find_next(
            &buffer(),
            &sensitive("beta"),
            Direction::Backward,
            Position::new(2, 11),
        );
        assert_eq!(hit, Some((Position::new(2, 0), Position::new(2, 4))));
    }

    #[test]
    fn test_backward_search_wraps_to_last_line() {
        let hit = find_next(
            &buffer(),
            &sensitive("gamma"),
            Direction::Backward,
            Position::new(0, 0),
        );
        // Nothing before the caret on line 1; the scan wraps to the bottom.
        assert_eq!(hit, Some((Position::new(2, 5), Position::new(2, 10))));
    }

    #[test]
    fn test_backward_absent_term_terminates() {
        let hit = find_next(
            &buffer(),
            &sensitive("delta"),
            Direction::Backward,
            Position::new(1, 3),
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn test_caret_column_past_line_end_is_clamped() {
        let hit = find_next(
            &buffer(),
            &sensitive("gamma"),
            Direction::Forward,
            Position::new(1, 999),
        );
        assert_eq!(hit, Some((Position::new(2, 5), Position::new(2, 10))));
    }
}
