//! One-way channel into the long-lived render surface.
//!
//! The surface is a black box (an embedded HTML/JS rendering engine) with no
//! synchronous way to confirm a render, so the contract is best effort and
//! eventually consistent: failures are logged and the next push self-corrects.
//! Until the surface signals its one-time ready transition, pushes are
//! coalesced down to the most recent requested text and flushed exactly once
//! when ready arrives.

use crate::{encode, error::RenderError};

/// The opaque rendering collaborator: one textual invocation taking a single
/// serialized-text argument. Assumed idempotent and stateless across calls
/// except for visible output.
pub trait RenderSurface {
    fn invoke(&mut self, script: &str) -> Result<(), RenderError>;
}

pub struct RenderBridge {
    surface: Box<dyn RenderSurface>,
    ready: bool,
    queued: Option<String>,
    last_pushed: Option<String>,
}

impl RenderBridge {
    #[must_use]
    pub fn new(surface: Box<dyn RenderSurface>) -> Self {
        Self {
            surface,
            ready: false,
            queued: None,
            last_pushed: None,
        }
    }

    /// Request a render of `text`. Before the surface is ready only the most
    /// recent request is retained; afterwards every call invokes the surface.
    pub fn push(&mut self, text: &str) {
        if self.ready {
            self.invoke(text);
        } else {
            self.queued = Some(text.to_owned());
        }
    }

    /// Mark the surface's one-time initial-load completion. Flushes the
    /// latest queued text, if any, with a single invocation. Subsequent calls
    /// are no-ops: `ready` never reverts within a surface's lifetime.
    pub fn mark_ready(&mut self) {
        if self.ready {
            return;
        }
        self.ready = true;
        if let Some(text) = self.queued.take() {
            self.invoke(&text);
        }
    }

    fn invoke(&mut self, text: &str) {
        let script = encode::render_call(text);
        if let Err(err) = self.surface.invoke(&script) {
            tracing::warn!("{err}");
        }
        self.last_pushed = Some(text.to_owned());
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Most recent text handed to the surface (or queued for it).
    #[must_use]
    pub fn last_pushed(&self) -> Option<&str> {
        self.last_pushed.as_deref().or(self.queued.as_deref())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::{cell::RefCell, rc::Rc};

    use super::RenderSurface;
    use crate::error::RenderError;

    /// Records every script the bridge hands to the surface.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingSurface {
        pub(crate) calls: Rc<RefCell<Vec<String>>>,
    }

    impl RenderSurface for RecordingSurface {
        fn invoke(&mut self, script: &str) -> Result<(), RenderError> {
            self.calls.borrow_mut().push(script.to_owned());
            Ok(())
        }
    }

    pub(crate) struct FailingSurface;

    impl RenderSurface for FailingSurface {
        fn invoke(&mut self, _script: &str) -> Result<(), RenderError> {
            Err(RenderError::new("surface rejected the script"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{test_support::*, *};

    #[test]
    fn pushes_invoke_after_ready() {
        let surface = RecordingSurface::default();
        let calls = surface.calls.clone();
        let mut bridge = RenderBridge::new(Box::new(surface));

        bridge.mark_ready();
        bridge.push("# A");
        bridge.push("# B");

        assert_eq!(
            *calls.borrow(),
            vec![
                "window.renderMarkdown(\"# A\");".to_owned(),
                "window.renderMarkdown(\"# B\");".to_owned(),
            ]
        );
        assert_eq!(bridge.last_pushed(), Some("# B"));
    }

    #[test]
    fn pushes_before_ready_coalesce_to_latest() {
        let surface = RecordingSurface::default();
        let calls = surface.calls.clone();
        let mut bridge = RenderBridge::new(Box::new(surface));

        bridge.push("A");
        bridge.push("B");
        bridge.push("C");
        assert!(calls.borrow().is_empty());

        bridge.mark_ready();
        assert_eq!(*calls.borrow(), vec!["window.renderMarkdown(\"C\");"]);
    }

    #[test]
    fn ready_transition_happens_once() {
        let surface = RecordingSurface::default();
        let calls = surface.calls.clone();
        let mut bridge = RenderBridge::new(Box::new(surface));

        bridge.push("A");
        bridge.mark_ready();
        bridge.mark_ready();
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn surface_failure_is_non_fatal() {
        let mut bridge = RenderBridge::new(Box::new(FailingSurface));
        bridge.mark_ready();
        bridge.push("# A");
        bridge.push("# A");
        assert_eq!(bridge.last_pushed(), Some("# A"));
    }

    #[test]
    fn last_pushed_tracks_queued_text_before_ready() {
        let mut bridge = RenderBridge::new(Box::new(RecordingSurface::default()));
        bridge.push("draft");
        assert_eq!(bridge.last_pushed(), Some("draft"));
    }
}
