//! Single-path file watching.
//!
//! The watch primitive is abstracted behind a small capability trait so
//! platform-specific mechanisms (inotify, kqueue, polling) are
//! interchangeable; production uses the `notify` crate's recommended watcher.
//! The callback fires on the watcher's own thread, potentially many times per
//! logical save (editors often write via temp-file + rename) — consumers
//! marshal events back onto their owner thread and reload.

use std::path::Path;

use notify::{RecommendedWatcher, RecursiveMode, Watcher as _};

/// Invoked on write/rename/delete of the watched path. Runs off-thread.
pub type ChangeHandler = Box<dyn Fn() + Send + Sync>;

/// Exactly one active watch target at a time.
pub trait ChangeWatcher {
    /// Begin watching `path`, implicitly stopping any prior watch. Returns
    /// `false` when the path cannot be watched; that failure is deliberately
    /// silent (the file stays viewable, just without live reload).
    fn start(&mut self, path: &Path, on_change: ChangeHandler) -> bool;

    /// Idempotent; releases the underlying watch resource.
    fn stop(&mut self);
}

/// `notify`-backed watcher. Dropping it releases the watch.
#[derive(Default)]
pub struct NotifyWatcher {
    inner: Option<RecommendedWatcher>,
}

impl NotifyWatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChangeWatcher for NotifyWatcher {
    fn start(&mut self, path: &Path, on_change: ChangeHandler) -> bool {
        self.stop();

        let handler = move |result: Result<notify::Event, notify::Error>| match result {
            Ok(event) => {
                if event.kind.is_modify() || event.kind.is_remove() || event.kind.is_create() {
                    on_change();
                }
            }
            Err(err) => tracing::debug!("watch event error: {err}"),
        };

        let mut watcher = match notify::recommended_watcher(handler) {
            Ok(watcher) => watcher,
            Err(err) => {
                tracing::debug!("watch setup failed: {err}");
                return false;
            }
        };

        if let Err(err) = watcher.watch(path, RecursiveMode::NonRecursive) {
            tracing::debug!("cannot watch {}: {err}", path.display());
            return false;
        }

        self.inner = Some(watcher);
        true
    }

    fn stop(&mut self) {
        self.inner = None;
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        sync::mpsc,
        time::{Duration, Instant},
    };

    use super::*;

    #[test]
    fn start_on_missing_path_is_silent_noop() {
        let Ok(dir) = tempfile::tempdir() else {
            return;
        };
        let mut watcher = NotifyWatcher::new();
        let armed = watcher.start(&dir.path().join("absent.md"), Box::new(|| {}));
        assert!(!armed);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut watcher = NotifyWatcher::new();
        watcher.stop();
        watcher.stop();
    }

    #[test]
    fn reports_writes_to_the_watched_file() {
        let Ok(dir) = tempfile::tempdir() else {
            return;
        };
        let path = dir.path().join("watched.md");
        fs::write(&path, "# before\n").ok();

        let (tx, rx) = mpsc::channel();
        let mut watcher = NotifyWatcher::new();
        let armed = watcher.start(
            &path,
            Box::new(move || {
                let _ = tx.send(());
            }),
        );
        assert!(armed);

        // Some backends need a moment to arm before events are delivered.
        std::thread::sleep(Duration::from_millis(200));
        fs::write(&path, "# after\n").ok();

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut seen = false;
        while Instant::now() < deadline {
            if rx.recv_timeout(Duration::from_millis(200)).is_ok() {
                seen = true;
                break;
            }
            fs::write(&path, "# again\n").ok();
        }
        assert!(seen, "no change event delivered for a written file");

        watcher.stop();
    }

    #[test]
    fn restart_replaces_the_previous_watch() {
        let Ok(dir) = tempfile::tempdir() else {
            return;
        };
        let first = dir.path().join("first.md");
        let second = dir.path().join("second.md");
        fs::write(&first, "a").ok();
        fs::write(&second, "b").ok();

        let mut watcher = NotifyWatcher::new();
        assert!(watcher.start(&first, Box::new(|| {})));
        assert!(watcher.start(&second, Box::new(|| {})));
        watcher.stop();
    }
}
