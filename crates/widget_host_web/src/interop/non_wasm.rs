use std::rc::Rc;

use widget_host::{ScriptInstall, WidgetHandle};

fn unsupported() -> String {
    "Browser widget APIs are only available when compiled for wasm32".to_string()
}

pub fn ensure_widget_script(_widget_id: &str) -> Result<ScriptInstall, String> {
    Err(unsupported())
}

pub fn detect_handle() -> Option<Rc<dyn WidgetHandle>> {
    None
}

pub async fn sleep_ms(_ms: u32) {}
