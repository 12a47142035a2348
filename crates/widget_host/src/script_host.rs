//! Host-environment seam for script installation, handle detection, and
//! timer-driven waiting.

use std::{
    cell::{Cell, RefCell},
    future::Future,
    pin::Pin,
    rc::Rc,
};

use crate::handle::WidgetHandle;

/// Object-safe boxed future used by [`ScriptHost`] async methods.
pub type ScriptHostFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Outcome of an idempotent script-installation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptInstall {
    /// A new script element was inserted.
    Inserted,
    /// The reserved script element already existed; nothing was inserted.
    AlreadyPresent,
}

/// Host environment the widget session runs against.
///
/// The browser adapter mutates the live document, reads the page global, and
/// sleeps through `setTimeout`; the in-memory adapter below makes the same
/// flows deterministic for native tests.
pub trait ScriptHost {
    /// Ensures exactly one widget script element exists, keyed by the
    /// reserved element id, with `widget_id` embedded in the source URL as a
    /// query parameter. Re-invocation with the element already present must
    /// not insert a second one.
    ///
    /// # Errors
    ///
    /// Returns an error when the host document cannot be mutated.
    fn ensure_widget_script(&self, widget_id: &str) -> Result<ScriptInstall, String>;

    /// Returns the typed external handle once the widget script has
    /// installed its page global, `None` before that point.
    ///
    /// This is the single point where the untyped global is checked and
    /// cast; everything downstream works against [`WidgetHandle`].
    fn detect_handle(&self) -> Option<Rc<dyn WidgetHandle>>;

    /// Sleeps for `ms` milliseconds without blocking the event loop.
    fn sleep_ms(&self, ms: u32) -> ScriptHostFuture<'_, ()>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op script host for unsupported targets; the handle never appears.
pub struct NoopScriptHost;

impl ScriptHost for NoopScriptHost {
    fn ensure_widget_script(&self, _widget_id: &str) -> Result<ScriptInstall, String> {
        Ok(ScriptInstall::AlreadyPresent)
    }

    fn detect_handle(&self) -> Option<Rc<dyn WidgetHandle>> {
        None
    }

    fn sleep_ms(&self, _ms: u32) -> ScriptHostFuture<'_, ()> {
        Box::pin(async {})
    }
}

#[derive(Default)]
struct MemoryScriptHostState {
    install_requests: RefCell<Vec<String>>,
    inserted: Cell<bool>,
    install_error: RefCell<Option<String>>,
    handle: RefCell<Option<Rc<dyn WidgetHandle>>>,
    detect_calls_until_handle: Cell<u32>,
    detect_calls: Cell<u32>,
    sleeps: RefCell<Vec<u32>>,
}

/// In-memory script host driving deterministic load/readiness tests.
///
/// Sleeps resolve immediately and are recorded, so timing assertions count
/// ticks instead of waiting wall-clock time.
#[derive(Clone, Default)]
pub struct MemoryScriptHost {
    state: Rc<MemoryScriptHostState>,
}

impl MemoryScriptHost {
    /// Creates a host with no handle installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `handle` detectable immediately.
    pub fn install_handle(&self, handle: Rc<dyn WidgetHandle>) {
        *self.state.handle.borrow_mut() = Some(handle);
        self.state.detect_calls_until_handle.set(0);
    }

    /// Makes `handle` detectable only after `polls` failed detection calls.
    pub fn install_handle_after_polls(&self, handle: Rc<dyn WidgetHandle>, polls: u32) {
        *self.state.handle.borrow_mut() = Some(handle);
        self.state.detect_calls_until_handle.set(polls);
    }

    /// Makes every installation request fail with `message`.
    pub fn fail_script_install(&self, message: impl Into<String>) {
        *self.state.install_error.borrow_mut() = Some(message.into());
    }

    /// Returns the widget ids of every installation request, including
    /// idempotent no-op requests.
    pub fn install_requests(&self) -> Vec<String> {
        self.state.install_requests.borrow().clone()
    }

    /// Returns whether a script element was actually inserted.
    pub fn script_inserted(&self) -> bool {
        self.state.inserted.get()
    }

    /// Returns how many detection calls have been made.
    pub fn detect_calls(&self) -> u32 {
        self.state.detect_calls.get()
    }

    /// Returns every requested sleep duration, in order.
    pub fn sleeps(&self) -> Vec<u32> {
        self.state.sleeps.borrow().clone()
    }
}

impl ScriptHost for MemoryScriptHost {
    fn ensure_widget_script(&self, widget_id: &str) -> Result<ScriptInstall, String> {
        self.state
            .install_requests
            .borrow_mut()
            .push(widget_id.to_string());
        if let Some(message) = self.state.install_error.borrow().clone() {
            return Err(message);
        }
        if self.state.inserted.replace(true) {
            Ok(ScriptInstall::AlreadyPresent)
        } else {
            Ok(ScriptInstall::Inserted)
        }
    }

    fn detect_handle(&self) -> Option<Rc<dyn WidgetHandle>> {
        let calls = self.state.detect_calls.get() + 1;
        self.state.detect_calls.set(calls);
        let remaining = self.state.detect_calls_until_handle.get();
        if remaining > 0 {
            self.state.detect_calls_until_handle.set(remaining - 1);
            return None;
        }
        self.state.handle.borrow().clone()
    }

    fn sleep_ms(&self, ms: u32) -> ScriptHostFuture<'_, ()> {
        self.state.sleeps.borrow_mut().push(ms);
        Box::pin(async {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::NoopWidgetHandle;

    #[test]
    fn repeated_installation_is_idempotent() {
        let host = MemoryScriptHost::new();
        assert_eq!(
            host.ensure_widget_script("widget-1"),
            Ok(ScriptInstall::Inserted)
        );
        assert_eq!(
            host.ensure_widget_script("widget-1"),
            Ok(ScriptInstall::AlreadyPresent)
        );
        assert!(host.script_inserted());
        assert_eq!(host.install_requests(), vec!["widget-1", "widget-1"]);
    }

    #[test]
    fn handle_appears_only_after_the_configured_poll_count() {
        let host = MemoryScriptHost::new();
        host.install_handle_after_polls(Rc::new(NoopWidgetHandle), 2);

        assert!(host.detect_handle().is_none());
        assert!(host.detect_handle().is_none());
        assert!(host.detect_handle().is_some());
        assert_eq!(host.detect_calls(), 3);
    }

    #[test]
    fn noop_host_never_produces_a_handle() {
        let host = NoopScriptHost;
        assert_eq!(
            host.ensure_widget_script("widget-1"),
            Ok(ScriptInstall::AlreadyPresent)
        );
        assert!(host.detect_handle().is_none());
    }

    #[test]
    fn forced_install_failure_surfaces_the_message() {
        let host = MemoryScriptHost::new();
        host.fail_script_install("document is sealed");
        assert_eq!(
            host.ensure_widget_script("widget-1"),
            Err("document is sealed".to_string())
        );
        assert!(!host.script_inserted());
    }
}
