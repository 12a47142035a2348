//! Narrow capability contract for the externally installed widget handle.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use futures::future::LocalBoxFuture;
use serde_json::Value;

use crate::types::{ActivityData, EmbedConfig, TicketData, UserIdentity};

/// Event channel the external widget uses for checklist interaction signals.
pub const CHECKLIST_EVENT_CHANNEL: &str = "check-list-event";

/// Listener invoked with each event name emitted on a handle event channel.
pub type HandleEventListener = Rc<dyn Fn(&str)>;

/// Capability interface the externally loaded widget script must install on
/// the page global.
///
/// This is the only surface the rest of the SDK calls into; implementations
/// forward into externally owned code and keep no state of their own. The
/// session performs the existence check once at detection time, so methods
/// here assume the external runtime is present.
pub trait WidgetHandle {
    /// Applies a CSS color to the widget theme.
    fn set_theme_color(&self, color: &str);
    /// Reports whether the widget frame is currently visible.
    fn is_widget_visible(&self) -> bool;
    /// Shows or hides the widget frame.
    fn set_widget_visibility(&self, visible: bool);
    /// Identifies the current visitor.
    fn identify(&self, user: &UserIdentity);
    /// Replaces the current visitor attributes.
    fn set_user(&self, user: &UserIdentity);
    /// Clears the visitor session held by the widget.
    fn reset_session(&self);
    /// Triggers an invite overlay with a free-form payload.
    fn trigger_invite(&self, invite: &Value);
    /// Triggers a campaign with a free-form payload.
    fn trigger_campaign(&self, campaign: &Value);
    /// Dismisses every campaign currently shown.
    fn dismiss_all_campaigns(&self);
    /// Creates a support ticket.
    fn create_ticket(&self, ticket: &TicketData);
    /// Pre-fills the conversation subject line.
    fn set_subject_line(&self, subject: &str);
    /// Opens a knowledge-base article inside the widget.
    fn navigate_to_article(&self, article_id: &str);
    /// Records a visitor activity event.
    fn log_activity(&self, activity: &ActivityData);
    /// Starts a product tour by id.
    fn start_tour(&self, tour_id: &str);
    /// Registers a hook the widget awaits before showing a tour.
    fn attach_tour_before_show(&self, tour_id: u64, before_show: LocalBoxFuture<'static, ()>);
    /// Cancels the running tour.
    fn cancel_tour(&self);
    /// Shows the currently active onboarding checklist.
    fn show_active_checklist(&self);
    /// Activates a checklist by id.
    fn activate_checklist(&self, checklist_id: &str);
    /// Opens an embed overlay described by `config`.
    fn show_embed(&self, config: &EmbedConfig);
    /// Adds an email address to an email series, optionally double-opt-in.
    fn add_to_email_series(&self, email: &str, double_opt_in: Option<bool>);
    /// Subscribes a listener to a named channel on the handle's
    /// event-emission surface.
    fn on_event(&self, channel: &str, listener: HandleEventListener);
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op widget handle for unsupported targets and baseline tests.
pub struct NoopWidgetHandle;

impl WidgetHandle for NoopWidgetHandle {
    fn set_theme_color(&self, _color: &str) {}
    fn is_widget_visible(&self) -> bool {
        false
    }
    fn set_widget_visibility(&self, _visible: bool) {}
    fn identify(&self, _user: &UserIdentity) {}
    fn set_user(&self, _user: &UserIdentity) {}
    fn reset_session(&self) {}
    fn trigger_invite(&self, _invite: &Value) {}
    fn trigger_campaign(&self, _campaign: &Value) {}
    fn dismiss_all_campaigns(&self) {}
    fn create_ticket(&self, _ticket: &TicketData) {}
    fn set_subject_line(&self, _subject: &str) {}
    fn navigate_to_article(&self, _article_id: &str) {}
    fn log_activity(&self, _activity: &ActivityData) {}
    fn start_tour(&self, _tour_id: &str) {}
    fn attach_tour_before_show(&self, _tour_id: u64, _before_show: LocalBoxFuture<'static, ()>) {}
    fn cancel_tour(&self) {}
    fn show_active_checklist(&self) {}
    fn activate_checklist(&self, _checklist_id: &str) {}
    fn show_embed(&self, _config: &EmbedConfig) {}
    fn add_to_email_series(&self, _email: &str, _double_opt_in: Option<bool>) {}
    fn on_event(&self, _channel: &str, _listener: HandleEventListener) {}
}

/// One observed forwarding call, recorded by [`RecordingWidgetHandle`].
#[derive(Debug, Clone, PartialEq)]
pub enum HandleCall {
    /// `set_theme_color` with the forwarded color.
    SetThemeColor(String),
    /// `set_widget_visibility` with the forwarded flag.
    SetWidgetVisibility(bool),
    /// `identify` with the forwarded identity.
    Identify(UserIdentity),
    /// `set_user` with the forwarded identity.
    SetUser(UserIdentity),
    /// `reset_session`.
    ResetSession,
    /// `trigger_invite` with the forwarded payload.
    TriggerInvite(Value),
    /// `trigger_campaign` with the forwarded payload.
    TriggerCampaign(Value),
    /// `dismiss_all_campaigns`.
    DismissAllCampaigns,
    /// `create_ticket` with the forwarded ticket.
    CreateTicket(TicketData),
    /// `set_subject_line` with the forwarded subject.
    SetSubjectLine(String),
    /// `navigate_to_article` with the forwarded article id.
    NavigateToArticle(String),
    /// `log_activity` with the forwarded activity.
    LogActivity(ActivityData),
    /// `start_tour` with the forwarded tour id.
    StartTour(String),
    /// `attach_tour_before_show` with the forwarded tour id (the hook future
    /// itself is dropped).
    AttachTourBeforeShow(u64),
    /// `cancel_tour`.
    CancelTour,
    /// `show_active_checklist`.
    ShowActiveChecklist,
    /// `activate_checklist` with the forwarded checklist id.
    ActivateChecklist(String),
    /// `show_embed` with the forwarded configuration.
    ShowEmbed(EmbedConfig),
    /// `add_to_email_series` with the forwarded email and opt-in flag.
    AddToEmailSeries(String, Option<bool>),
}

/// In-memory widget handle that records every forwarded call and lets tests
/// emit events on named channels.
#[derive(Default)]
pub struct RecordingWidgetHandle {
    calls: RefCell<Vec<HandleCall>>,
    visible: Cell<bool>,
    listeners: RefCell<Vec<(String, HandleEventListener)>>,
}

impl RecordingWidgetHandle {
    /// Returns every call forwarded so far, in order.
    pub fn calls(&self) -> Vec<HandleCall> {
        self.calls.borrow().clone()
    }

    /// Sets the visibility flag reported by [`WidgetHandle::is_widget_visible`].
    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    /// Emits an event name on a named channel, invoking matching listeners
    /// in subscription order.
    pub fn emit_event(&self, channel: &str, name: &str) {
        let listeners = self.listeners.borrow().clone();
        for (subscribed, listener) in listeners {
            if subscribed == channel {
                listener(name);
            }
        }
    }

    /// Returns how many listeners are subscribed to `channel`.
    pub fn listener_count(&self, channel: &str) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(subscribed, _)| subscribed == channel)
            .count()
    }

    fn record(&self, call: HandleCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl WidgetHandle for RecordingWidgetHandle {
    fn set_theme_color(&self, color: &str) {
        self.record(HandleCall::SetThemeColor(color.to_string()));
    }

    fn is_widget_visible(&self) -> bool {
        self.visible.get()
    }

    fn set_widget_visibility(&self, visible: bool) {
        self.record(HandleCall::SetWidgetVisibility(visible));
    }

    fn identify(&self, user: &UserIdentity) {
        self.record(HandleCall::Identify(user.clone()));
    }

    fn set_user(&self, user: &UserIdentity) {
        self.record(HandleCall::SetUser(user.clone()));
    }

    fn reset_session(&self) {
        self.record(HandleCall::ResetSession);
    }

    fn trigger_invite(&self, invite: &Value) {
        self.record(HandleCall::TriggerInvite(invite.clone()));
    }

    fn trigger_campaign(&self, campaign: &Value) {
        self.record(HandleCall::TriggerCampaign(campaign.clone()));
    }

    fn dismiss_all_campaigns(&self) {
        self.record(HandleCall::DismissAllCampaigns);
    }

    fn create_ticket(&self, ticket: &TicketData) {
        self.record(HandleCall::CreateTicket(ticket.clone()));
    }

    fn set_subject_line(&self, subject: &str) {
        self.record(HandleCall::SetSubjectLine(subject.to_string()));
    }

    fn navigate_to_article(&self, article_id: &str) {
        self.record(HandleCall::NavigateToArticle(article_id.to_string()));
    }

    fn log_activity(&self, activity: &ActivityData) {
        self.record(HandleCall::LogActivity(activity.clone()));
    }

    fn start_tour(&self, tour_id: &str) {
        self.record(HandleCall::StartTour(tour_id.to_string()));
    }

    fn attach_tour_before_show(&self, tour_id: u64, _before_show: LocalBoxFuture<'static, ()>) {
        self.record(HandleCall::AttachTourBeforeShow(tour_id));
    }

    fn cancel_tour(&self) {
        self.record(HandleCall::CancelTour);
    }

    fn show_active_checklist(&self) {
        self.record(HandleCall::ShowActiveChecklist);
    }

    fn activate_checklist(&self, checklist_id: &str) {
        self.record(HandleCall::ActivateChecklist(checklist_id.to_string()));
    }

    fn show_embed(&self, config: &EmbedConfig) {
        self.record(HandleCall::ShowEmbed(config.clone()));
    }

    fn add_to_email_series(&self, email: &str, double_opt_in: Option<bool>) {
        self.record(HandleCall::AddToEmailSeries(email.to_string(), double_opt_in));
    }

    fn on_event(&self, channel: &str, listener: HandleEventListener) {
        self.listeners
            .borrow_mut()
            .push((channel.to_string(), listener));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_handle_preserves_call_order() {
        let handle = RecordingWidgetHandle::default();
        handle.set_theme_color("#112233");
        handle.set_widget_visibility(true);
        handle.cancel_tour();

        assert_eq!(
            handle.calls(),
            vec![
                HandleCall::SetThemeColor("#112233".to_string()),
                HandleCall::SetWidgetVisibility(true),
                HandleCall::CancelTour,
            ]
        );
    }

    #[test]
    fn emit_event_only_reaches_matching_channel_listeners() {
        let handle = RecordingWidgetHandle::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        handle.on_event(
            CHECKLIST_EVENT_CHANNEL,
            Rc::new(move |name| sink.borrow_mut().push(name.to_string())),
        );

        handle.emit_event(CHECKLIST_EVENT_CHANNEL, "cta-clicked");
        handle.emit_event("other-channel", "ignored");

        assert_eq!(*seen.borrow(), vec!["cta-clicked"]);
        assert_eq!(handle.listener_count(CHECKLIST_EVENT_CHANNEL), 1);
    }
}
