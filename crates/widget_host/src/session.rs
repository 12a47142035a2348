//! Widget session state machine: script load, readiness polling, the
//! checklist event bridge, and the guarded method facade.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use futures::future::LocalBoxFuture;
use serde_json::Value;

use crate::{
    error::WidgetError,
    events::EventStream,
    handle::{WidgetHandle, CHECKLIST_EVENT_CHANNEL},
    script_host::ScriptHost,
    types::{ActivityData, EmbedConfig, TicketData, UserIdentity},
};

/// Timing knobs for the load poller and the readiness waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Interval between load-poller handle checks, in milliseconds.
    pub poll_interval_ms: u32,
    /// Maximum number of load-poller checks before [`WidgetSession::load`]
    /// fails with [`WidgetError::LoadTimeout`].
    ///
    /// `None` polls until the handle appears, reproducing the historical
    /// behavior where a script that never installs its handle leaves the
    /// load future pending forever.
    pub load_attempt_budget: Option<u32>,
    /// Interval between readiness-waiter checks, in milliseconds.
    pub ready_interval_ms: u32,
    /// Maximum number of readiness-waiter checks before
    /// [`WidgetSession::wait_until_ready`] fails.
    pub ready_attempt_budget: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 300,
            load_attempt_budget: Some(200),
            ready_interval_ms: 200,
            ready_attempt_budget: 20,
        }
    }
}

/// Singly-instantiated facade session for one embedded support widget.
///
/// The session owns the load/readiness state and the locally owned event
/// streams; every forwarded call goes through the readiness guard. The
/// loaded flag transitions at most once from `false` to `true` and is never
/// reset, not even by [`teardown`](Self::teardown).
pub struct WidgetSession {
    widget_id: String,
    config: SessionConfig,
    host: Rc<dyn ScriptHost>,
    loaded: Cell<bool>,
    closed: Cell<bool>,
    handle: RefCell<Option<Rc<dyn WidgetHandle>>>,
    bridge_attached: Cell<bool>,
    lifecycle: EventStream<()>,
    checklist_events: EventStream<String>,
}

// The session holds trait-object fields, so these cannot be derived; the
// tests only need them so `assert_eq!` on `Result<Rc<Self>, WidgetError>`
// type-checks (the compared values are always `Err` variants).
#[cfg(test)]
impl std::fmt::Debug for WidgetSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetSession")
            .field("widget_id", &self.widget_id)
            .field("loaded", &self.loaded.get())
            .field("closed", &self.closed.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
impl PartialEq for WidgetSession {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl WidgetSession {
    /// Creates a session with default timing for the widget identified by
    /// `widget_id`, running against `host`.
    pub fn create(widget_id: impl Into<String>, host: Rc<dyn ScriptHost>) -> Rc<Self> {
        Self::with_config(widget_id, host, SessionConfig::default())
    }

    /// Creates a session with explicit timing knobs.
    pub fn with_config(
        widget_id: impl Into<String>,
        host: Rc<dyn ScriptHost>,
        config: SessionConfig,
    ) -> Rc<Self> {
        Rc::new(Self {
            widget_id: widget_id.into(),
            config,
            host,
            loaded: Cell::new(false),
            closed: Cell::new(false),
            handle: RefCell::new(None),
            bridge_attached: Cell::new(false),
            lifecycle: EventStream::default(),
            checklist_events: EventStream::default(),
        })
    }

    /// Returns the widget identifier this session was created for.
    pub fn widget_id(&self) -> &str {
        &self.widget_id
    }

    /// Returns whether the external handle has been detected.
    pub fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    /// Subscribes to the one-shot "loaded" lifecycle notification.
    ///
    /// The notification fires exactly once per session, when the external
    /// handle is first detected. Listeners subscribed after that point are
    /// never invoked.
    pub fn on_loaded(&self, listener: impl Fn() + 'static) {
        self.lifecycle.subscribe(move |()| listener());
    }

    /// Subscribes to checklist interaction events republished verbatim from
    /// the widget's `"check-list-event"` channel.
    pub fn on_checklist_event(&self, listener: impl Fn(&str) + 'static) {
        self.checklist_events
            .subscribe(move |name: &String| listener(name));
    }

    /// Installs the widget script (idempotently) and polls until the
    /// external script installs its page global.
    ///
    /// First detection flips the loaded flag, attaches the checklist event
    /// bridge, and emits the "loaded" notification — exactly once, even when
    /// `load` is invoked multiple times. Later invocations on a loaded
    /// session return immediately without touching the document again.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::ScriptInstall`] when the script element cannot
    /// be inserted, [`WidgetError::LoadTimeout`] when the configured attempt
    /// budget runs out, and [`WidgetError::SessionClosed`] when the session
    /// is torn down mid-poll.
    pub async fn load(&self) -> Result<(), WidgetError> {
        if self.loaded.get() {
            return Ok(());
        }
        if self.closed.get() {
            return Err(WidgetError::SessionClosed);
        }
        self.host
            .ensure_widget_script(&self.widget_id)
            .map_err(WidgetError::ScriptInstall)?;

        let mut attempts = 0u32;
        loop {
            if self.closed.get() {
                return Err(WidgetError::SessionClosed);
            }
            if let Some(handle) = self.host.detect_handle() {
                self.finish_load(&handle);
                return Ok(());
            }
            attempts += 1;
            if let Some(budget) = self.config.load_attempt_budget {
                if attempts >= budget {
                    return Err(WidgetError::LoadTimeout {
                        attempts,
                        interval_ms: self.config.poll_interval_ms,
                    });
                }
            }
            self.host.sleep_ms(self.config.poll_interval_ms).await;
        }
    }

    /// Waits until the widget is ready, checking the loaded flag on a fixed
    /// interval up to a bounded attempt budget.
    ///
    /// Resolves with the session handle before the first sleep when the
    /// widget is already loaded, which makes this the recommended entry
    /// point for callers that want deterministic sequencing.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::ReadyTimeout`] after exactly
    /// `ready_attempt_budget` sleeps of `ready_interval_ms` each, and
    /// [`WidgetError::SessionClosed`] when the session is torn down while
    /// waiting.
    pub async fn wait_until_ready(self: Rc<Self>) -> Result<Rc<Self>, WidgetError> {
        for _ in 0..self.config.ready_attempt_budget {
            if self.closed.get() {
                return Err(WidgetError::SessionClosed);
            }
            if self.loaded.get() {
                return Ok(self);
            }
            self.host.sleep_ms(self.config.ready_interval_ms).await;
        }
        if self.loaded.get() {
            return Ok(self);
        }
        Err(WidgetError::ReadyTimeout {
            attempts: self.config.ready_attempt_budget,
            interval_ms: self.config.ready_interval_ms,
        })
    }

    /// Tears the session down for test isolation.
    ///
    /// Outstanding poll loops stop on their next tick and all local
    /// listeners are dropped. The loaded flag is left untouched; a torn-down
    /// session is not reusable.
    pub fn teardown(&self) {
        self.closed.set(true);
        self.lifecycle.clear();
        self.checklist_events.clear();
    }

    fn finish_load(&self, handle: &Rc<dyn WidgetHandle>) {
        // A second in-flight load may observe the handle after the first one
        // already flipped the flag; only the first detection publishes.
        if self.loaded.replace(true) {
            return;
        }
        *self.handle.borrow_mut() = Some(Rc::clone(handle));
        self.attach_checklist_bridge(handle);
        self.lifecycle.emit(&());
    }

    fn attach_checklist_bridge(&self, handle: &Rc<dyn WidgetHandle>) {
        if self.bridge_attached.replace(true) {
            return;
        }
        let stream = self.checklist_events.clone();
        handle.on_event(
            CHECKLIST_EVENT_CHANNEL,
            Rc::new(move |name: &str| stream.emit(&name.to_string())),
        );
    }

    // Every facade call funnels through this guard; it is the only place the
    // readiness state is consulted before forwarding.
    fn ready_handle(&self, operation: &str) -> Option<Rc<dyn WidgetHandle>> {
        if !self.loaded.get() {
            log::warn!(
                "widget `{}` is not loaded yet; skipping `{operation}`",
                self.widget_id
            );
            return None;
        }
        self.handle.borrow().clone()
    }

    /// Applies a CSS color to the widget theme.
    pub fn set_theme_color(&self, color: &str) {
        if let Some(handle) = self.ready_handle("set_theme_color") {
            handle.set_theme_color(color);
        }
    }

    /// Reports whether the widget frame is visible; `false` before load.
    pub fn is_widget_visible(&self) -> bool {
        self.ready_handle("is_widget_visible")
            .is_some_and(|handle| handle.is_widget_visible())
    }

    /// Shows or hides the widget frame.
    pub fn set_widget_visibility(&self, visible: bool) {
        if let Some(handle) = self.ready_handle("set_widget_visibility") {
            handle.set_widget_visibility(visible);
        }
    }

    /// Identifies the current visitor.
    pub fn identify(&self, user: &UserIdentity) {
        if let Some(handle) = self.ready_handle("identify") {
            handle.identify(user);
        }
    }

    /// Replaces the current visitor attributes.
    pub fn set_user(&self, user: &UserIdentity) {
        if let Some(handle) = self.ready_handle("set_user") {
            handle.set_user(user);
        }
    }

    /// Clears the visitor session held by the widget.
    pub fn reset_session(&self) {
        if let Some(handle) = self.ready_handle("reset_session") {
            handle.reset_session();
        }
    }

    /// Triggers an invite overlay with a free-form payload.
    pub fn trigger_invite(&self, invite: &Value) {
        if let Some(handle) = self.ready_handle("trigger_invite") {
            handle.trigger_invite(invite);
        }
    }

    /// Triggers a campaign with a free-form payload.
    pub fn trigger_campaign(&self, campaign: &Value) {
        if let Some(handle) = self.ready_handle("trigger_campaign") {
            handle.trigger_campaign(campaign);
        }
    }

    /// Dismisses every campaign currently shown.
    pub fn dismiss_all_campaigns(&self) {
        if let Some(handle) = self.ready_handle("dismiss_all_campaigns") {
            handle.dismiss_all_campaigns();
        }
    }

    /// Creates a support ticket.
    pub fn create_ticket(&self, ticket: &TicketData) {
        if let Some(handle) = self.ready_handle("create_ticket") {
            handle.create_ticket(ticket);
        }
    }

    /// Pre-fills the conversation subject line.
    pub fn set_subject_line(&self, subject: &str) {
        if let Some(handle) = self.ready_handle("set_subject_line") {
            handle.set_subject_line(subject);
        }
    }

    /// Opens a knowledge-base article inside the widget.
    pub fn navigate_to_article(&self, article_id: &str) {
        if let Some(handle) = self.ready_handle("navigate_to_article") {
            handle.navigate_to_article(article_id);
        }
    }

    /// Records a visitor activity event.
    pub fn log_activity(&self, activity: &ActivityData) {
        if let Some(handle) = self.ready_handle("log_activity") {
            handle.log_activity(activity);
        }
    }

    /// Starts a product tour by id.
    pub fn start_tour(&self, tour_id: &str) {
        if let Some(handle) = self.ready_handle("start_tour") {
            handle.start_tour(tour_id);
        }
    }

    /// Registers a hook the widget awaits before showing a tour.
    ///
    /// The hook future is dropped unawaited when the widget is not ready.
    pub fn attach_tour_before_show(&self, tour_id: u64, before_show: LocalBoxFuture<'static, ()>) {
        if let Some(handle) = self.ready_handle("attach_tour_before_show") {
            handle.attach_tour_before_show(tour_id, before_show);
        }
    }

    /// Cancels the running tour.
    pub fn cancel_tour(&self) {
        if let Some(handle) = self.ready_handle("cancel_tour") {
            handle.cancel_tour();
        }
    }

    /// Shows the currently active onboarding checklist.
    pub fn show_active_checklist(&self) {
        if let Some(handle) = self.ready_handle("show_active_checklist") {
            handle.show_active_checklist();
        }
    }

    /// Activates a checklist by id.
    pub fn activate_checklist(&self, checklist_id: &str) {
        if let Some(handle) = self.ready_handle("activate_checklist") {
            handle.activate_checklist(checklist_id);
        }
    }

    /// Opens an embed overlay described by `config`.
    pub fn show_embed(&self, config: &EmbedConfig) {
        if let Some(handle) = self.ready_handle("show_embed") {
            handle.show_embed(config);
        }
    }

    /// Adds an email address to an email series, optionally double-opt-in.
    pub fn add_to_email_series(&self, email: &str, double_opt_in: Option<bool>) {
        if let Some(handle) = self.ready_handle("add_to_email_series") {
            handle.add_to_email_series(email, double_opt_in);
        }
    }
}
