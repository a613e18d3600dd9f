use crate::buffer::TextBuffer;

/// The run of leading whitespace on a line, terminator excluded.
#[must_use]
pub fn leading_whitespace(line: &str) -> &str {
    let line = line.trim_end_matches(['\r', '\n']);
    let content_start = line.len() - line.trim_start().len();
    &line[..content_start]
}

/// Net brace-depth change across one line. `//` comments end the scan and
/// `"…"`/`'…'` literals are skipped, so braces inside either do not count.
/// Escape sequences are not understood; this is a heuristic over raw text,
/// not a tokenizer.
#[must_use]
pub fn brace_delta(line: &str) -> i32 {
    let mut depth = 0;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            '/' => {
                if chars.clone().next() == Some('/') {
                    break;
                }
            }
            '"' | '\'' => {
                for next in chars.by_ref() {
                    if next == c {
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    depth
}

/// The two indentation strings the newline/brace handlers choose between.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockIndent {
    /// Indent of the line that opened the enclosing block.
    pub block: String,
    /// Indent of the nearest preceding non-blank line.
    pub last_line: String,
}

/// Infers the indentation of the block enclosing `row` by scanning upward,
/// accumulating per-line brace depth until the running count goes positive
/// (that line opened the block we are inside).
///
/// `last_line` is taken from the nearest non-blank line above `row`; when
/// the block opener is that nearest line, the block's indent plus one `tab`
/// is used instead, so a line ending in `{` indents its successor one level
/// deeper.
///
/// Returns `None` when no enclosing block opener exists above `row`.
#[must_use]
pub fn indent_for_block(buffer: &TextBuffer, row: usize, tab: &str) -> Option<BlockIndent> {
    let mut brace_count = 0;
    let mut last_line: Option<String> = None;
    let mut row = row;

    while row > 0 {
        row -= 1;

        let line = buffer.get_line_stripped(row)?;
        let trimmed = line.trim_start();

        brace_count += brace_delta(trimmed);

        if brace_count > 0 {
            let block = leading_whitespace(line).to_string();
            let last_line = last_line.unwrap_or_else(|| format!("{block}{tab}"));
            return Some(BlockIndent { block, last_line });
        }

        if last_line.is_none() && !trimmed.is_empty() {
            last_line = Some(leading_whitespace(line).to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAB: &str = "    ";

    #[test]
    fn test_leading_whitespace() {
        assert_eq!(leading_whitespace("    x = 1;"), "    ");
        assert_eq!(leading_whitespace("\t\tfoo"), "\t\t");
        assert_eq!(leading_whitespace("bare"), "");
        assert_eq!(leading_whitespace("   \n"), "   ");
        assert_eq!(leading_whitespace(""), "");
    }

    #[test]
    fn test_brace_delta_counts_net_depth() {
        assert_eq!(brace_delta("if (x) {"), 1);
        assert_eq!(brace_delta("}"), -1);
        assert_eq!(brace_delta("{ } {"), 1);
        assert_eq!(brace_delta("int x = 0;"), 0);
    }

    #[test]
    fn test_brace_delta_ignores_comments_and_literals() {
        assert_eq!(brace_delta("x = 1; // opens {"), 0);
        assert_eq!(brace_delta("s = \"{{{\";"), 0);
        assert_eq!(brace_delta("c = '{';"), 0);
        assert_eq!(brace_delta("f(); { // }"), 1);
        // A lone slash does not start a comment.
        assert_eq!(brace_delta("a / b; {"), 1);
    }

    #[test]
    fn test_indent_for_block_finds_enclosing_opener() {
        let buffer = TextBuffer::from_text("class A {\n    void f() {\n        x;\n        y;\n");

        let indent = indent_for_block(&buffer, 4, TAB).unwrap();
        assert_eq!(indent.block, "    ");
        assert_eq!(indent.last_line, "        ");
    }

    #[test]
    fn test_indent_after_block_opener_adds_one_level() {
        // The nearest non-blank line above is the opener itself, so the
        // suggested continuation indent is one tab past the opener.
        let buffer = TextBuffer::from_text("void f() {\n");

        let indent = indent_for_block(&buffer, 1, TAB).unwrap();
        assert_eq!(indent.block, "");
        assert_eq!(indent.last_line, TAB);
    }

    #[test]
    fn test_indent_skips_blank_lines_for_last_line() {
        let buffer = TextBuffer::from_text("void f() {\n    x;\n\n\n");

        let indent = indent_for_block(&buffer, 4, TAB).unwrap();
        assert_eq!(indent.block, "");
        assert_eq!(indent.last_line, "    ");
    }

    #[test]
    fn test_closed_sibling_block_is_not_the_opener() {
        let buffer =
            TextBuffer::from_text("void f() {\n    if (a) {\n        b;\n    }\n    c;\n");

        let indent = indent_for_block(&buffer, 5, TAB).unwrap();
        // The if-block closed itself; the enclosing opener is the function.
        assert_eq!(indent.block, "");
        assert_eq!(indent.last_line, "    ");
    }

    #[test]
    fn test_no_enclosing_block_returns_none() {
        let buffer = TextBuffer::from_text("x;\ny;\n");
        assert_eq!(indent_for_block(&buffer, 2, TAB), None);
        assert_eq!(indent_for_block(&buffer, 0, TAB), None);
    }
}
