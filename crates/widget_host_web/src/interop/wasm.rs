use std::rc::Rc;

use js_sys::Promise;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use widget_host::{ScriptInstall, WidgetHandle};

use crate::handle::JsWidgetHandle;
use crate::script::{WIDGET_GLOBAL_PROPERTY, WIDGET_SCRIPT_BASE_URL, WIDGET_SCRIPT_ELEMENT_ID};

pub fn ensure_widget_script(widget_id: &str) -> Result<ScriptInstall, String> {
    let window = web_sys::window().ok_or_else(|| "no window in this context".to_string())?;
    let document = window
        .document()
        .ok_or_else(|| "no document in this context".to_string())?;

    if document
        .get_element_by_id(WIDGET_SCRIPT_ELEMENT_ID)
        .is_some()
    {
        return Ok(ScriptInstall::AlreadyPresent);
    }

    let head = document
        .head()
        .ok_or_else(|| "document has no head element".to_string())?;
    let script: web_sys::HtmlScriptElement = document
        .create_element("script")
        .map_err(js_error_to_string)?
        .dyn_into()
        .map_err(|_| "created element is not a script element".to_string())?;
    script.set_id(WIDGET_SCRIPT_ELEMENT_ID);
    script.set_src(&format!("{WIDGET_SCRIPT_BASE_URL}?widgetId={widget_id}"));
    script.set_async(true);
    head.append_child(&script).map_err(js_error_to_string)?;

    Ok(ScriptInstall::Inserted)
}

pub fn detect_handle() -> Option<Rc<dyn WidgetHandle>> {
    let window = web_sys::window()?;
    let value =
        js_sys::Reflect::get(window.as_ref(), &JsValue::from_str(WIDGET_GLOBAL_PROPERTY)).ok()?;
    if value.is_undefined() || value.is_null() {
        return None;
    }
    let global: js_sys::Object = value.dyn_into().ok()?;
    Some(Rc::new(JsWidgetHandle::new(global)))
}

pub async fn sleep_ms(ms: u32) {
    let promise = Promise::new(&mut |resolve, _reject| {
        let Some(window) = web_sys::window() else {
            let _ = resolve.call0(&JsValue::NULL);
            return;
        };
        if window
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms as i32)
            .is_err()
        {
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    let _ = JsFuture::from(promise).await;
}

fn js_error_to_string(err: JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    if let Ok(message) = js_sys::Reflect::get(&err, &JsValue::from_str("message")) {
        if let Some(text) = message.as_string() {
            return text;
        }
    }
    format!("{err:?}")
}
