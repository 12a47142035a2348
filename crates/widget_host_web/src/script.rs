//! Browser script-host adapter: script injection, page-global detection, and
//! `setTimeout`-backed sleeping.

use std::rc::Rc;

use widget_host::{ScriptHost, ScriptHostFuture, ScriptInstall, WidgetHandle};

use crate::interop;

/// Reserved element id carried by the injected widget script tag.
pub const WIDGET_SCRIPT_ELEMENT_ID: &str = "support-widget-script";

/// Source URL the widget script is fetched from; the widget id rides along
/// as the `widgetId` query parameter.
pub const WIDGET_SCRIPT_BASE_URL: &str = "https://widget.supportdesk.app/widget.js";

/// Page-global property the widget script installs its handle under.
pub const WIDGET_GLOBAL_PROPERTY: &str = "SupportWidget";

#[derive(Debug, Clone, Copy, Default)]
/// Browser script host backed by the live document and window timers.
pub struct WebScriptHost;

impl ScriptHost for WebScriptHost {
    fn ensure_widget_script(&self, widget_id: &str) -> Result<ScriptInstall, String> {
        interop::ensure_widget_script(widget_id)
    }

    fn detect_handle(&self) -> Option<Rc<dyn WidgetHandle>> {
        interop::detect_handle()
    }

    fn sleep_ms(&self, ms: u32) -> ScriptHostFuture<'_, ()> {
        Box::pin(interop::sleep_ms(ms))
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn script_host_public_api_non_wasm_parity() {
        let host = WebScriptHost;
        let err = host
            .ensure_widget_script("acme-widget")
            .expect_err("no document outside wasm32");
        assert!(err.contains("wasm32"));
        assert!(host.detect_handle().is_none());
        block_on(host.sleep_ms(5));
    }
}
