//! Serialization of markdown text into a script-call argument.
//!
//! The render surface is reached through a one-directional text-injection
//! channel: the whole document travels as a single string literal inside a
//! script invocation. The literal must be safe to embed verbatim, so quotes,
//! backslashes, every control character, and the JavaScript line separators
//! U+2028/U+2029 (legal in JSON strings, not in script source) are escaped.
//! The output is a conformant JSON string and round-trips through any JSON
//! parser.

use std::fmt::Write as _;

/// Name of the single render entry point exposed by the preview template.
pub const RENDER_ENTRY_POINT: &str = "window.renderMarkdown";

/// Escape `text` into a double-quoted, script-literal-safe form.
#[must_use]
pub fn to_script_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c < '\u{20}' || c == '\u{7f}' => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Build the full invocation pushed into the render surface.
#[must_use]
pub fn render_call(text: &str) -> String {
    format!("{RENDER_ENTRY_POINT}({});", to_script_literal(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(text: &str) -> Option<String> {
        serde_json::from_str(&to_script_literal(text)).ok()
    }

    #[test]
    fn escapes_quotes_backslashes_and_controls() {
        let text = "say \"hi\"\\path\nline\ttab\u{01}end";
        assert_eq!(
            to_script_literal(text),
            r#""say \"hi\"\\path\nline\ttab\u0001end""#
        );
        assert_eq!(round_trip(text).as_deref(), Some(text));
    }

    #[test]
    fn escapes_nul_and_del() {
        let text = "a\u{00}b\u{7f}c";
        assert_eq!(to_script_literal(text), r#""a\u0000b\u007fc""#);
        assert_eq!(round_trip(text).as_deref(), Some(text));
    }

    #[test]
    fn escapes_js_line_separators() {
        let text = "a\u{2028}b\u{2029}c";
        assert_eq!(to_script_literal(text), r#""a\u2028b\u2029c""#);
        assert_eq!(round_trip(text).as_deref(), Some(text));
    }

    #[test]
    fn passes_plain_unicode_through() {
        let text = "# Héllo ✓ emoji 🎉";
        assert_eq!(to_script_literal(text), format!("\"{text}\""));
        assert_eq!(round_trip(text).as_deref(), Some(text));
    }

    #[test]
    fn render_call_wraps_the_literal() {
        assert_eq!(render_call("# A"), "window.renderMarkdown(\"# A\");");
    }
}
