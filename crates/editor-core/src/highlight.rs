use std::ops::Range;

/// Classification of a run of characters within one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Number,
    Literal,
    Comment,
    Punctuation,
    Plain,
}

/// A classified byte range within a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRun {
    pub kind: TokenKind,
    pub range: Range<usize>,
}

/// Splits one line into colorable runs. Implementations are line-local by
/// design: no state is carried across lines, so a `/* */` comment spanning
/// lines will not be recognized. That is the accepted scope of the
/// heuristic.
pub trait Tokenizer {
    fn tokenize_line(&self, line: &str) -> Vec<TokenRun>;
}

/// Tokenizer for files with no known syntax: the whole line is plain text.
pub struct PlainTokenizer;

impl Tokenizer for PlainTokenizer {
    fn tokenize_line(&self, line: &str) -> Vec<TokenRun> {
        if line.is_empty() {
            return Vec::new();
        }

        vec![TokenRun {
            kind: TokenKind::Plain,
            range: 0..line.len(),
        }]
    }
}

const CPP_KEYWORDS: &[&str] = &[
    "auto", "bool", "break", "case", "catch", "char", "class", "const", "constexpr", "continue",
    "default", "delete", "do", "double", "else", "enum", "explicit", "extern", "false", "float",
    "for", "friend", "goto", "if", "inline", "int", "long", "namespace", "new", "noexcept",
    "nullptr", "operator", "override", "private", "protected", "public", "return", "short",
    "signed", "sizeof", "static", "struct", "switch", "template", "this", "throw", "true", "try",
    "typedef", "typename", "union", "unsigned", "using", "virtual", "void", "volatile", "while",
];

/// Keyword-matching C++ tokenizer. Covers every byte of the line, so the
/// renderer can walk the runs left to right without gaps.
pub struct CppTokenizer;

impl Tokenizer for CppTokenizer {
    fn tokenize_line(&self, line: &str) -> Vec<TokenRun> {
        let bytes = line.as_bytes();
        let mut runs = Vec::new();
        let mut i = 0;

        while i < bytes.len() {
            let start = i;
            let kind = match bytes[i] {
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    i = bytes.len();
                    TokenKind::Comment
                }
                quote @ (b'"' | b'\'') => {
                    i += 1;
                    while i < bytes.len() {
                        if bytes[i] == b'\\' {
                            i = (i + 2).min(bytes.len());
                        } else if bytes[i] == quote {
                            i += 1;
                            break;
                        } else {
                            i += 1;
                        }
                    }
                    TokenKind::Literal
                }
                b'0'..=b'9' => {
                    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'.')
                    {
                        i += 1;
                    }
                    TokenKind::Number
                }
                b if b.is_ascii_alphabetic() || b == b'_' || !b.is_ascii() => {
                    while i < bytes.len()
                        && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || !bytes[i].is_ascii())
                    {
                        i += 1;
                    }
                    if CPP_KEYWORDS.contains(&&line[start..i]) {
                        TokenKind::Keyword
                    } else {
                        TokenKind::Identifier
                    }
                }
                b if b.is_ascii_whitespace() => {
                    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }
                    TokenKind::Plain
                }
                _ => {
                    i += 1;
                    TokenKind::Punctuation
                }
            };

            runs.push(TokenRun {
                kind,
                range: start..i,
            });
        }

        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_of(line: &str) -> Vec<(TokenKind, &str)> {
        CppTokenizer
            .tokenize_line(line)
            .into_iter()
            .map(|run| (run.kind, &line[run.range]))
            .collect()
    }

    #[test]
    fn test_keywords_vs_identifiers() {
        let kinds = kinds_of("if (widget)");
        assert_eq!(
            kinds,
            vec![
                (TokenKind::Keyword, "if"),
                (TokenKind::Plain, " "),
                (TokenKind::Punctuation, "("),
                (TokenKind::Identifier, "widget"),
                (TokenKind::Punctuation, ")"),
            ]
        );
    }

    #[test]
    fn test_line_comment_runs_to_end() {
        let kinds = kinds_of("x = 1; // if (true)");
        assert_eq!(kinds.last(), Some(&(TokenKind::Comment, "// if (true)")));
    }

    #[test]
    fn test_string_literal_with_escape() {
        let kinds = kinds_of(r#"s = "a\"b"; t;"#);
        assert!(kinds.contains(&(TokenKind::Literal, r#""a\"b""#)));
    }

    #[test]
    fn test_number_run() {
        let kinds = kinds_of("int x = 0x1f;");
        assert!(kinds.contains(&(TokenKind::Number, "0x1f")));
    }

    #[test]
    fn test_runs_cover_line_without_gaps() {
        let line = "    while (count < 10) { // spin";
        let runs = CppTokenizer.tokenize_line(line);

        let mut expected_start = 0;
        for run in &runs {
            assert_eq!(run.range.start, expected_start);
            expected_start = run.range.end;
        }
        assert_eq!(expected_start, line.len());
    }

    #[test]
    fn test_plain_tokenizer_is_one_run() {
        let runs = PlainTokenizer.tokenize_line("anything at all");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].kind, TokenKind::Plain);
        assert!(PlainTokenizer.tokenize_line("").is_empty());
    }
}
