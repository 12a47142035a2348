//! Typed facade contracts and the load/readiness state machine for an
//! externally hosted support widget.
//!
//! This crate is the API-first boundary for the widget SDK. It exposes the
//! narrow capability contract for the externally installed widget handle
//! ([`WidgetHandle`]), the host-environment seam for script installation and
//! timing ([`ScriptHost`]), shared boundary models, and the [`WidgetSession`]
//! facade that gates every forwarded call behind the load/readiness state.
//! Concrete browser adapters live in `widget_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod error;
pub mod events;
pub mod handle;
pub mod script_host;
pub mod session;
pub mod types;

pub use error::WidgetError;
pub use events::EventStream;
pub use handle::{
    HandleCall, HandleEventListener, NoopWidgetHandle, RecordingWidgetHandle, WidgetHandle,
    CHECKLIST_EVENT_CHANNEL,
};
pub use script_host::{
    MemoryScriptHost, NoopScriptHost, ScriptHost, ScriptHostFuture, ScriptInstall,
};
pub use session::{SessionConfig, WidgetSession};
pub use types::{
    ActivityData, CompanyInfo, EmbedConfig, LocalMessage, TicketData, TrackerDisplayMode,
    UserIdentity,
};
