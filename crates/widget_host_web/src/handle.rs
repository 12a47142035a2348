//! Typed wrapper over the page global installed by the externally loaded
//! widget script.

use futures::future::LocalBoxFuture;
use js_sys::{Array, Function, Object, Reflect};
use serde::Serialize;
use serde_json::Value;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::future_to_promise;
use widget_host::{
    ActivityData, EmbedConfig, HandleEventListener, TicketData, UserIdentity, WidgetHandle,
};

/// Browser-global widget handle accessed through `js-sys` reflection.
///
/// Constructed only by handle detection; the underlying object stays owned
/// by the external script, this wrapper merely reads and invokes it. A
/// missing or non-callable method is logged and skipped rather than raised,
/// since malformed externals are the widget runtime's problem to surface.
pub struct JsWidgetHandle {
    global: Object,
}

impl JsWidgetHandle {
    pub(crate) fn new(global: Object) -> Self {
        Self { global }
    }

    fn call(&self, method: &str, args: &[JsValue]) {
        let Ok(value) = Reflect::get(&self.global, &JsValue::from_str(method)) else {
            log::warn!("widget global has no `{method}` property");
            return;
        };
        let Ok(function) = value.dyn_into::<Function>() else {
            log::warn!("widget global `{method}` is not callable");
            return;
        };
        let this: &JsValue = self.global.as_ref();
        let result = match args {
            [] => function.call0(this),
            [a] => function.call1(this, a),
            [a, b] => function.call2(this, a, b),
            _ => function.apply(this, &args.iter().collect::<Array>()),
        };
        if let Err(err) = result {
            log::warn!("widget call `{method}` failed: {err:?}");
        }
    }

    fn to_js<T: Serialize>(value: &T) -> Option<JsValue> {
        match value.serialize(&Serializer::json_compatible()) {
            Ok(converted) => Some(converted),
            Err(err) => {
                log::warn!("failed to serialize widget payload: {err}");
                None
            }
        }
    }

    fn call_with_payload<T: Serialize>(&self, method: &str, payload: &T) {
        if let Some(converted) = Self::to_js(payload) {
            self.call(method, &[converted]);
        }
    }
}

impl WidgetHandle for JsWidgetHandle {
    fn set_theme_color(&self, color: &str) {
        self.call("setThemeColor", &[JsValue::from_str(color)]);
    }

    fn is_widget_visible(&self) -> bool {
        Reflect::get(&self.global, &JsValue::from_str("isWidgetVisible"))
            .ok()
            .and_then(|value| value.as_bool())
            .unwrap_or(false)
    }

    fn set_widget_visibility(&self, visible: bool) {
        self.call("setWidgetVisibility", &[JsValue::from_bool(visible)]);
    }

    fn identify(&self, user: &UserIdentity) {
        self.call_with_payload("identify", user);
    }

    fn set_user(&self, user: &UserIdentity) {
        self.call_with_payload("setUser", user);
    }

    fn reset_session(&self) {
        self.call("resetSession", &[]);
    }

    fn trigger_invite(&self, invite: &Value) {
        self.call_with_payload("triggerInvite", invite);
    }

    fn trigger_campaign(&self, campaign: &Value) {
        self.call_with_payload("triggerCampaign", campaign);
    }

    fn dismiss_all_campaigns(&self) {
        self.call("dismissAllCampaigns", &[]);
    }

    fn create_ticket(&self, ticket: &TicketData) {
        self.call_with_payload("createTicket", ticket);
    }

    fn set_subject_line(&self, subject: &str) {
        self.call("setSubjectLine", &[JsValue::from_str(subject)]);
    }

    fn navigate_to_article(&self, article_id: &str) {
        self.call("navigateToArticle", &[JsValue::from_str(article_id)]);
    }

    fn log_activity(&self, activity: &ActivityData) {
        self.call_with_payload("logActivity", activity);
    }

    fn start_tour(&self, tour_id: &str) {
        self.call("startTour", &[JsValue::from_str(tour_id)]);
    }

    fn attach_tour_before_show(&self, tour_id: u64, before_show: LocalBoxFuture<'static, ()>) {
        let promise = future_to_promise(async move {
            before_show.await;
            Ok(JsValue::UNDEFINED)
        });
        self.call(
            "attachTourBeforeShow",
            &[JsValue::from_f64(tour_id as f64), promise.into()],
        );
    }

    fn cancel_tour(&self) {
        self.call("cancelTour", &[]);
    }

    fn show_active_checklist(&self) {
        self.call("showActiveChecklist", &[]);
    }

    fn activate_checklist(&self, checklist_id: &str) {
        self.call("activateCheckList", &[JsValue::from_str(checklist_id)]);
    }

    fn show_embed(&self, config: &EmbedConfig) {
        self.call_with_payload("showEmbed", config);
    }

    fn add_to_email_series(&self, email: &str, double_opt_in: Option<bool>) {
        match double_opt_in {
            Some(flag) => self.call(
                "addToEmailSeries",
                &[JsValue::from_str(email), JsValue::from_bool(flag)],
            ),
            None => self.call("addToEmailSeries", &[JsValue::from_str(email)]),
        }
    }

    fn on_event(&self, channel: &str, listener: HandleEventListener) {
        let callback = Closure::<dyn FnMut(JsValue)>::wrap(Box::new(move |event: JsValue| {
            if let Some(name) = event.as_string() {
                listener(&name);
            }
        }));
        self.call(
            "on",
            &[JsValue::from_str(channel), callback.as_ref().clone()],
        );
        // The subscription has no unsubscription path and lives for the page
        // lifetime, so the closure is leaked to the external emitter.
        callback.forget();
    }
}
