pub type EditResult<T> = Result<T, EditError>;

#[derive(Debug)]
pub enum EditError {
    /// A position that does not resolve to a valid line/column pair in the
    /// buffer it was used against. Positions go stale when the buffer
    /// mutates between creation and use.
    OutOfBounds { row: usize, col: usize },
    IoError(std::io::Error),
}

impl EditError {
    #[must_use]
    pub fn out_of_bounds(pos: crate::cursor::Position) -> Self {
        EditError::OutOfBounds {
            row: pos.row,
            col: pos.col,
        }
    }
}

impl std::fmt::Display for EditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditError::OutOfBounds { row, col } => {
                write!(f, "position {row}:{col} is out of bounds")
            }
            EditError::IoError(e) => write!(f, "i/o error: {e}"),
        }
    }
}

impl std::error::Error for EditError {}

impl From<std::io::Error> for EditError {
    fn from(value: std::io::Error) -> Self {
        EditError::IoError(value)
    }
}
