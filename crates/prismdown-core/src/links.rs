//! Policy for link targets reported back by the interactive preview.

use std::path::{Path, PathBuf};

/// What the host should do with a clicked link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkTarget {
    /// Hand to the system's default handler (browser, mail client, ...).
    External(String),
    /// A markdown file next to the current document; open it in place.
    /// The normal unsaved-changes confirmation still applies.
    Document(PathBuf),
}

/// Classify a clicked target string. `base_dir` is the current document's
/// directory, used to resolve relative markdown links.
#[must_use]
pub fn classify(target: &str, base_dir: Option<&Path>) -> LinkTarget {
    let lower = target.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("mailto:")
    {
        return LinkTarget::External(target.to_owned());
    }

    if is_markdown_path(&lower) {
        let path = Path::new(target);
        let resolved = if path.is_absolute() {
            path.to_owned()
        } else {
            match base_dir {
                Some(dir) => dir.join(path),
                None => return LinkTarget::External(target.to_owned()),
            }
        };
        if resolved.is_file() {
            return LinkTarget::Document(resolved);
        }
    }

    LinkTarget::External(target.to_owned())
}

fn is_markdown_path(lower: &str) -> bool {
    lower.ends_with(".md") || lower.ends_with(".markdown")
}
