use editor_core::cursor::Cursor;
use editor_core::highlight::{CppTokenizer, PlainTokenizer, Tokenizer};
use editor_core::search::SearchQuery;

/// Search state shared by every find panel in the running session: the
/// current term and the case-sensitivity flag. Passed around explicitly
/// (behind an `Rc<RefCell<…>>` on the UI thread) instead of living in a
/// global, so each editor reads whatever the last panel set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSession {
    pub term: String,
    pub case_sensitive: bool,
}

impl SearchSession {
    /// The query for the next search invocation.
    #[must_use]
    pub fn query(&self) -> SearchQuery {
        SearchQuery::new(self.term.clone(), self.case_sensitive)
    }
}

/// What kind of editor a file gets. Resolved once from the file extension
/// when the document is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileCategory {
    CppSource,
    #[default]
    PlainText,
}

impl FileCategory {
    #[must_use]
    pub fn of_path(path: &std::path::Path) -> Self {
        let is_cpp = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                editor_core::cpp::SOURCE_OR_HEADER_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            });

        if is_cpp {
            Self::CppSource
        } else {
            Self::PlainText
        }
    }

    /// The tokenizer used to color this category's lines.
    #[must_use]
    pub fn tokenizer(self) -> Box<dyn Tokenizer> {
        match self {
            Self::CppSource => Box::new(CppTokenizer),
            Self::PlainText => Box::new(PlainTokenizer),
        }
    }
}

/// Caret/selection and scroll position captured when a view closes, so
/// reopening the document puts the user back where they were.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    pub cursor: Cursor,
    pub scroll_offset: usize,
}
