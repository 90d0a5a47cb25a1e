//! Notification and confirmation interface to the presentation layer.

use async_trait::async_trait;
use std::fmt;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// The user's answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmDecision {
    Confirm,
    Decline,
}

impl ConfirmDecision {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, ConfirmDecision::Confirm)
    }
}

impl From<bool> for ConfirmDecision {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            ConfirmDecision::Confirm
        } else {
            ConfirmDecision::Decline
        }
    }
}

/// Presentation layer seen by the backup subsystem.
///
/// `notify` is fire-and-forget. `confirm` is the only point at which a restore
/// waits on the user.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);

    async fn confirm(&self, title: &str, message: &str) -> ConfirmDecision;
}

/// Notifier that writes to the log and answers every prompt the same way.
///
/// Suitable for headless use and for embedding where the caller decides ahead
/// of time.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    decision: ConfirmDecision,
}

impl LogNotifier {
    pub fn new(decision: ConfirmDecision) -> Self {
        Self { decision }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => tracing::error!("{}", message),
            Severity::Warning => tracing::warn!("{}", message),
            Severity::Info | Severity::Success => tracing::info!("[{}] {}", severity, message),
        }
    }

    async fn confirm(&self, title: &str, message: &str) -> ConfirmDecision {
        tracing::info!(decision = ?self.decision, "{}: {}", title, message);
        self.decision
    }
}
