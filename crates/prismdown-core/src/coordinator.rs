//! The editor/preview state machine.
//!
//! The coordinator is the single authority over the text buffer, the modified
//! flag, the debounce deadline, and the watch target. Every front end drives
//! it through the same small command API and pumps [`Coordinator::poll`] on
//! the owner thread; watcher callbacks arrive from other threads and are
//! marshaled here through an `mpsc` channel drained by `poll`. Nothing else may
//! mutate this state.
//!
//! Document lifecycle: empty/untitled, loaded (bound to a path, unmodified),
//! dirty (modified), back to loaded on save or to empty via
//! [`Coordinator::new_document`].

use std::{
    path::{Path, PathBuf},
    sync::mpsc::{Receiver, Sender, channel},
    time::{Duration, Instant},
};

use crate::{
    bridge::{RenderBridge, RenderSurface},
    config::Config,
    document,
    error::SaveError,
    links::{self, LinkTarget},
    watch::ChangeWatcher,
};

/// Starting content of an untouched session: a small feature tour.
pub const WELCOME_MARKDOWN: &str = "\
# Welcome to prismdown

A markdown viewer & editor with **live preview**.

---

## Features

**Bold**, *italic*, ~~strikethrough~~, and `inline code`.

> Blockquotes too.

- [x] GFM rendering
- [x] Syntax highlighting
- [x] LaTeX math: $E = mc^2$
- [x] Mermaid diagrams
- [ ] Anything you write next

```rust
fn main() {
    println!(\"hello, markdown\");
}
```

**Tip:** open a `.md` file or drop one onto the window.
";

/// Answer from the unsaved-changes confirmation collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscardDecision {
    /// Save first; proceed only if the save succeeds.
    SaveThenProceed,
    /// Throw the buffered edits away and proceed.
    Discard,
    /// Abort the triggering command with no state change.
    Cancel,
}

/// Confirmation UI collaborator, consulted before a destructive command
/// replaces a modified buffer.
pub trait DiscardGate {
    fn confirm_discard(&mut self) -> DiscardDecision;
}

/// A gate that always discards; for headless front ends and tests.
pub struct AlwaysDiscard;

impl DiscardGate for AlwaysDiscard {
    fn confirm_discard(&mut self) -> DiscardDecision {
        DiscardDecision::Discard
    }
}

pub struct Coordinator {
    buffer: String,
    preview: String,
    source_path: Option<PathBuf>,
    modified: bool,
    suppress_next_edit: bool,
    pending_edit_at: Option<Instant>,
    debounce: Duration,
    bridge: RenderBridge,
    watcher: Box<dyn ChangeWatcher>,
    watched_path: Option<PathBuf>,
    watch_enabled: bool,
    external_tx: Sender<PathBuf>,
    external_rx: Receiver<PathBuf>,
}

impl Coordinator {
    /// A fresh session holding the welcome document, unmodified. The welcome
    /// text is pushed right away; the bridge holds it until the surface's
    /// ready signal.
    #[must_use]
    pub fn new(
        watcher: Box<dyn ChangeWatcher>,
        surface: Box<dyn RenderSurface>,
        config: &Config,
    ) -> Self {
        let (external_tx, external_rx) = channel();
        let mut bridge = RenderBridge::new(surface);
        bridge.push(WELCOME_MARKDOWN);

        Self {
            buffer: WELCOME_MARKDOWN.to_owned(),
            preview: WELCOME_MARKDOWN.to_owned(),
            source_path: None,
            modified: false,
            suppress_next_edit: false,
            pending_edit_at: None,
            debounce: config.debounce(),
            bridge,
            watcher,
            watched_path: None,
            watch_enabled: config.watch_files,
            external_tx,
            external_rx,
        }
    }

    // --- command API -----------------------------------------------------

    /// A user edit of the whole buffer. Re-arms the debounce deadline; the
    /// commit happens in [`Self::poll`] once the quiet period elapses.
    ///
    /// Front ends that mirror a text widget's change callback will echo one
    /// spurious edit right after a programmatic replacement; the suppress
    /// flag swallows exactly that one.
    pub fn submit_edit(&mut self, text: impl Into<String>) {
        if self.suppress_next_edit {
            self.suppress_next_edit = false;
            return;
        }
        self.buffer = text.into();
        self.pending_edit_at = Some(Instant::now());
    }

    /// Open `path`, replacing the current document. Returns `false` when the
    /// confirmation gate cancelled the command. Drop events use this too.
    pub fn open(&mut self, path: &Path, gate: &mut dyn DiscardGate) -> bool {
        if !self.confirm_if_modified(gate) {
            return false;
        }
        self.load_path(path);
        true
    }

    /// Reset to an empty, untitled document.
    pub fn new_document(&mut self, gate: &mut dyn DiscardGate) -> bool {
        if !self.confirm_if_modified(gate) {
            return false;
        }
        self.watcher.stop();
        self.watched_path = None;
        self.source_path = None;
        self.replace_text(String::new(), false);
        true
    }

    /// Re-read the bound file from disk. No-op (returns `false`) without one.
    pub fn refresh(&mut self, gate: &mut dyn DiscardGate) -> bool {
        let Some(path) = self.source_path.clone() else {
            return false;
        };
        if !self.confirm_if_modified(gate) {
            return false;
        }
        self.load_path(&path);
        true
    }

    /// Write the buffer to the bound path. [`SaveError::NoTargetPath`] tells
    /// the front end to route through a save-as flow instead. On failure the
    /// buffer and modified flag are left untouched: no data loss.
    pub fn save(&mut self) -> Result<(), SaveError> {
        let Some(path) = self.source_path.as_deref() else {
            return Err(SaveError::NoTargetPath);
        };
        document::write_text(path, &self.buffer)?;
        self.modified = false;
        Ok(())
    }

    /// Write the buffer to `path`, rebinding the document (and the watcher)
    /// to it when it differs from the current source path.
    pub fn save_as(&mut self, path: &Path) -> Result<(), SaveError> {
        document::write_text(path, &self.buffer)?;
        if self.source_path.as_deref() != Some(path) {
            self.source_path = Some(path.to_owned());
            self.start_watching(path, true);
        }
        self.modified = false;
        Ok(())
    }

    /// A watcher event for `path`, already marshaled to the owner thread.
    ///
    /// External changes always win: the file on disk is ground truth when it
    /// changes underneath us, and the reload replaces even unsaved edits with
    /// no confirmation prompt. Events from a stale watcher (a since-replaced
    /// document) are ignored.
    pub fn notify_external_change(&mut self, path: &Path) {
        if self.source_path.as_deref() != Some(path) {
            tracing::debug!("ignoring stale watch event for {}", path.display());
            return;
        }
        self.load_path(path);
    }

    /// The render surface finished its one-time initial load.
    pub fn surface_ready(&mut self) {
        self.bridge.mark_ready();
    }

    /// Owner-thread pump: drain marshaled watcher events, then commit a
    /// pending edit to the preview once its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) {
        while let Ok(path) = self.external_rx.try_recv() {
            self.notify_external_change(&path);
        }

        if let Some(at) = self.pending_edit_at
            && now.saturating_duration_since(at) >= self.debounce
        {
            self.pending_edit_at = None;
            self.preview.clone_from(&self.buffer);
            self.modified = true;
            self.bridge.push(&self.preview);
        }
    }

    /// When the pending edit, if any, is due. Front ends sleep until this.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending_edit_at.map(|at| at + self.debounce)
    }

    /// Apply the link policy to a target reported by the preview. Opening a
    /// returned [`LinkTarget::Document`] goes through [`Self::open`] and its
    /// normal confirmation gate.
    #[must_use]
    pub fn resolve_link(&self, target: &str) -> LinkTarget {
        let base_dir = self.source_path.as_deref().and_then(Path::parent);
        links::classify(target, base_dir)
    }

    // --- accessors -------------------------------------------------------

    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    #[must_use]
    pub fn preview(&self) -> &str {
        &self.preview
    }

    #[must_use]
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    #[must_use]
    pub fn watched_path(&self) -> Option<&Path> {
        self.watched_path.as_deref()
    }

    // --- internals -------------------------------------------------------

    fn confirm_if_modified(&mut self, gate: &mut dyn DiscardGate) -> bool {
        if !self.modified {
            return true;
        }
        match gate.confirm_discard() {
            DiscardDecision::Discard => true,
            DiscardDecision::Cancel => false,
            DiscardDecision::SaveThenProceed => self.save().is_ok(),
        }
    }

    /// Load step shared by open, drop, refresh, and external-change reloads.
    /// Loads render synchronously, never through the debounce.
    fn load_path(&mut self, path: &Path) {
        match document::load(path) {
            Ok(doc) => {
                let path_changed = self.source_path.as_deref() != Some(path);
                self.replace_text(doc.text, false);
                self.source_path = Some(path.to_owned());
                self.start_watching(path, path_changed);
            }
            Err(err) => {
                // Recovered locally: the failure becomes visible content and
                // the previous path/watch binding stays as it was.
                self.replace_text(format!("Error loading file: {err}"), false);
            }
        }
    }

    /// Programmatic text replacement: cancels any in-flight debounce so a
    /// stale delayed commit cannot overwrite newer content, arms the suppress
    /// flag for the widget echo, and renders immediately.
    fn replace_text(&mut self, text: String, modified: bool) {
        self.suppress_next_edit = true;
        self.pending_edit_at = None;
        self.preview.clone_from(&text);
        self.buffer = text;
        self.modified = modified;
        self.bridge.push(&self.preview);
    }

    /// Rebind the watcher to `path`. Unless `force` is set, an already-active
    /// watch is left alone (repeated refreshes of the same path must not
    /// tear the watch down and re-arm it).
    fn start_watching(&mut self, path: &Path, force: bool) {
        if !self.watch_enabled {
            return;
        }
        if !force && self.watched_path.is_some() {
            return;
        }

        let tx = self.external_tx.clone();
        let event_path = path.to_owned();
        let armed = self.watcher.start(
            path,
            Box::new(move || {
                let _ = tx.send(event_path.clone());
            }),
        );
        self.watched_path = armed.then(|| path.to_owned());
    }
}
