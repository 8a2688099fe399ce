//! # Workspace Events
//!
//! Outbound notifications from the [`crate::workspace::Workspace`] to
//! whatever front end is attached: a re-render signal and toast notices.

use std::time::Duration;

use poolquote_core::command::Change;

/// Notices auto-dismiss after this long unless they say otherwise.
pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A short, auto-dismissed message for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub dismiss_after: Duration,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Notice {
            level,
            message: message.into(),
            dismiss_after: DEFAULT_DISMISS_AFTER,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

/// Receiver for workspace events.
///
/// Called while no lock is held, from whichever task produced the event.
pub trait WorkspaceEvents: Send + Sync {
    /// State changed; anything derived from it should be refreshed.
    fn state_changed(&self, change: Change);

    /// Something the user should see.
    fn notice(&self, notice: &Notice);
}

/// Discards every event (headless use and tests).
pub struct NoOpEvents;

impl WorkspaceEvents for NoOpEvents {
    fn state_changed(&self, _change: Change) {}
    fn notice(&self, _notice: &Notice) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_notice_defaults_to_four_seconds() {
        let notice = Notice::warning("Saved locally only");
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.dismiss_after, Duration::from_secs(4));
        assert_eq!(notice.message, "Saved locally only");
    }
}
