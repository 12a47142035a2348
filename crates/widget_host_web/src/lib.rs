//! Browser (`wasm32`) adapters for the [`widget_host`] contracts.
//!
//! Script injection, page-global handle detection, and timer plumbing live
//! behind a wasm/non-wasm interop split so the crate compiles — and its
//! public API keeps parity — on native targets, where the widget simply
//! never becomes detectable.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

#[cfg(target_arch = "wasm32")]
mod handle;
mod interop;
pub mod script;
pub mod session;

#[cfg(target_arch = "wasm32")]
pub use handle::JsWidgetHandle;
pub use script::{
    WebScriptHost, WIDGET_GLOBAL_PROPERTY, WIDGET_SCRIPT_BASE_URL, WIDGET_SCRIPT_ELEMENT_ID,
};
pub use session::{
    reset_shared_session, shared_session, web_widget_session, web_widget_session_with_config,
};
