//! Text-level C++ heuristics. Nothing here parses C++; every function works
//! on raw line text and accepts the false positives that implies.

/// Extensions routed to the C++ editor rather than the generic one.
pub const SOURCE_OR_HEADER_EXTENSIONS: &[&str] =
    &["cpp", "cc", "cxx", "c", "h", "hpp", "hxx", "mm", "m"];

/// Whether a (trimmed) line looks like a control-flow header that may open a
/// brace-less single-statement block: `if`/`for`/`while`, optionally glued
/// to `(`, with a closing `)` at the end of the line.
///
/// Known limitation: lines merely containing these substrings (say, inside a
/// string literal) match too.
#[must_use]
pub fn is_control_flow_header(trimmed_line: &str) -> bool {
    (trimmed_line.starts_with("if ")
        || trimmed_line.starts_with("if(")
        || trimmed_line.starts_with("for ")
        || trimmed_line.starts_with("for(")
        || trimmed_line.starts_with("while ")
        || trimmed_line.starts_with("while("))
        && trimmed_line.ends_with(')')
}

/// Reduces arbitrary input to a C++ identifier: keeps `[A-Za-z0-9_]`,
/// prefixes an underscore when the result would start with a digit.
#[must_use]
pub fn make_valid_identifier(name: &str) -> String {
    let mut out: String = name
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }

    out
}

/// Whether `name` (trimmed) is already a usable identifier. The insert-class
/// dialog loops until this holds or the user cancels.
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && trimmed == make_valid_identifier(trimmed)
}

const COMPONENT_TEMPLATE: &str = r#"class COMPONENTCLASS  : public Component
{
public:
    COMPONENTCLASS()
    {
    }

    ~COMPONENTCLASS()
    {
    }

    void paint (Graphics& g) override
    {
    }

    void resized() override
    {
    }

private:
    COMPONENTCLASS (const COMPONENTCLASS&) = delete;
    COMPONENTCLASS& operator= (const COMPONENTCLASS&) = delete;
};
"#;

/// The skeleton inserted by the "new component class" action, with the
/// class name substituted in.
#[must_use]
pub fn component_class_code(class_name: &str) -> String {
    COMPONENT_TEMPLATE.replace("COMPONENTCLASS", class_name)
}
