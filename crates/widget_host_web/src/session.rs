//! Browser session wiring: factories over [`WebScriptHost`] and the
//! page-wide shared session accessor.

use std::{cell::RefCell, rc::Rc};

use widget_host::{SessionConfig, WidgetSession};

use crate::script::WebScriptHost;

/// Creates a widget session wired to the live browser environment.
pub fn web_widget_session(widget_id: &str) -> Rc<WidgetSession> {
    WidgetSession::create(widget_id, Rc::new(WebScriptHost))
}

/// Creates a browser-wired widget session with explicit timing knobs.
pub fn web_widget_session_with_config(widget_id: &str, config: SessionConfig) -> Rc<WidgetSession> {
    WidgetSession::with_config(widget_id, Rc::new(WebScriptHost), config)
}

thread_local! {
    static SHARED_SESSION: RefCell<Option<Rc<WidgetSession>>> = RefCell::new(None);
}

/// Returns the page-wide shared session, creating it on first use.
///
/// A widget id differing from the one the session was first created with is
/// logged and ignored; the existing session wins.
pub fn shared_session(widget_id: &str) -> Rc<WidgetSession> {
    SHARED_SESSION.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(existing) = slot.as_ref() {
            if existing.widget_id() != widget_id {
                log::warn!(
                    "shared widget session already exists for `{}`; ignoring `{widget_id}`",
                    existing.widget_id()
                );
            }
            return Rc::clone(existing);
        }
        let session = web_widget_session(widget_id);
        *slot = Some(Rc::clone(&session));
        session
    })
}

/// Tears down and forgets the shared session, for test isolation.
pub fn reset_shared_session() {
    SHARED_SESSION.with(|slot| {
        if let Some(session) = slot.borrow_mut().take() {
            session.teardown();
        }
    });
}
