//! Preview template resolution.
//!
//! The template is a static asset loaded once per surface instance. A
//! user-supplied override that cannot be read degrades to a minimal fallback
//! page instead of erroring out.

use std::{fs, path::Path};

use crate::encode;

const BUILTIN: &str = include_str!("../assets/preview.html");

const FALLBACK: &str =
    "<html><body><pre>Failed to load preview template.</pre></body></html>";

/// Resolve the preview template, preferring `override_path` when given.
#[must_use]
pub fn load(override_path: Option<&Path>) -> String {
    match override_path {
        None => BUILTIN.to_owned(),
        Some(path) => fs::read_to_string(path).unwrap_or_else(|err| {
            tracing::warn!("cannot read template {}: {err}", path.display());
            FALLBACK.to_owned()
        }),
    }
}

/// One-shot variant of the templating contract: a self-contained page that
/// renders `markdown` once on load and offers no further interaction.
#[must_use]
pub fn standalone_page(template: &str, markdown: &str) -> String {
    let script = format!(
        "<script>window.addEventListener(\"load\", () => {});</script>",
        encode::render_call(markdown).trim_end_matches(';')
    );

    template.rfind("</body>").map_or_else(
        || format!("{template}\n{script}\n"),
        |idx| {
            let mut page = String::with_capacity(template.len() + script.len() + 1);
            page.push_str(&template[..idx]);
            page.push_str(&script);
            page.push('\n');
            page.push_str(&template[idx..]);
            page
        },
    )
}
