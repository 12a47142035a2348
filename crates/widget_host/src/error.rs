//! Typed errors surfaced by the session load and readiness paths.

/// Failure raised by [`crate::WidgetSession`] load/readiness operations.
///
/// Guarded facade calls never produce these; calls issued before readiness
/// are dropped with a warning instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    /// The widget script element could not be installed in the document.
    ScriptInstall(String),
    /// The load poller exhausted its attempt budget without the external
    /// script installing its page global.
    LoadTimeout {
        /// Number of detection attempts performed.
        attempts: u32,
        /// Poll interval in milliseconds.
        interval_ms: u32,
    },
    /// The bounded readiness waiter exhausted its attempt budget.
    ReadyTimeout {
        /// Number of readiness checks performed.
        attempts: u32,
        /// Check interval in milliseconds.
        interval_ms: u32,
    },
    /// The session was torn down while the operation was in flight.
    SessionClosed,
}

impl WidgetError {
    /// Returns whether the error is one of the two timeout variants.
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::LoadTimeout { .. } | Self::ReadyTimeout { .. })
    }
}

impl std::fmt::Display for WidgetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ScriptInstall(message) => {
                write!(f, "widget script installation failed: {message}")
            }
            Self::LoadTimeout {
                attempts,
                interval_ms,
            } => write!(
                f,
                "widget script never installed its handle after {attempts} polls at {interval_ms}ms"
            ),
            Self::ReadyTimeout {
                attempts,
                interval_ms,
            } => write!(
                f,
                "widget was not ready after {attempts} checks at {interval_ms}ms intervals"
            ),
            Self::SessionClosed => write!(f, "widget session was torn down"),
        }
    }
}

impl std::error::Error for WidgetError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_timeout_message_describes_the_budget() {
        let err = WidgetError::ReadyTimeout {
            attempts: 20,
            interval_ms: 200,
        };
        assert!(err.is_timeout());
        assert_eq!(
            err.to_string(),
            "widget was not ready after 20 checks at 200ms intervals"
        );
    }

    #[test]
    fn session_closed_is_not_a_timeout() {
        assert!(!WidgetError::SessionClosed.is_timeout());
    }
}
