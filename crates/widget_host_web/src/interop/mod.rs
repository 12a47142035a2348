//! Shared transport interop for the browser script host.
//!
//! Routes calls to target-specific implementations while preserving a
//! uniform API for the adapter layer.

use std::rc::Rc;

use widget_host::{ScriptInstall, WidgetHandle};

#[cfg(not(target_arch = "wasm32"))]
mod non_wasm;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(not(target_arch = "wasm32"))]
use non_wasm as imp;
#[cfg(target_arch = "wasm32")]
use wasm as imp;

pub fn ensure_widget_script(widget_id: &str) -> Result<ScriptInstall, String> {
    imp::ensure_widget_script(widget_id)
}

pub fn detect_handle() -> Option<Rc<dyn WidgetHandle>> {
    imp::detect_handle()
}

pub async fn sleep_ms(ms: u32) {
    imp::sleep_ms(ms).await;
}
