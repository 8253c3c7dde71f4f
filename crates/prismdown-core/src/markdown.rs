//! Engine-less markdown rendering for one-shot CLI output.
//!
//! The interactive preview's markdown engine lives inside the render surface
//! and is not our concern; this module only backs the headless paths that
//! need HTML without a surface.

use pulldown_cmark::{Options, Parser, html};

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Create a `pulldown-cmark` parser with our default GFM options enabled.
#[must_use]
pub fn parser(source: &str) -> Parser<'_> {
    Parser::new_ext(source, options())
}

/// Render markdown straight to an HTML fragment.
#[must_use]
pub fn to_html(source: &str) -> String {
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser(source));
    out
}
