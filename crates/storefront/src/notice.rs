//! Transient user-facing notices.
//!
//! The cart and checkout emit notices (title, description, severity) for
//! validation failures, successful handoffs, and fallback conditions. How a
//! notice is shown is up to the view layer; [`TracingNotices`] logs them and
//! `Vec<Notice>` collects them.

use serde::Serialize;
use tracing::{info, warn};

/// How a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Info,
    /// Something the user has to act on.
    Destructive,
}

/// A transient notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    #[must_use]
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    #[must_use]
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }

    #[must_use]
    pub const fn is_destructive(&self) -> bool {
        matches!(self.severity, Severity::Destructive)
    }
}

/// Receiver of notices.
pub trait NoticeSink {
    fn notify(&mut self, notice: Notice);
}

impl NoticeSink for Vec<Notice> {
    fn notify(&mut self, notice: Notice) {
        self.push(notice);
    }
}

/// Sink that reports notices as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotices;

impl NoticeSink for TracingNotices {
    fn notify(&mut self, notice: Notice) {
        match notice.severity {
            Severity::Info => info!("{}: {}", notice.title, notice.description),
            Severity::Destructive => warn!("{}: {}", notice.title, notice.description),
        }
    }
}
