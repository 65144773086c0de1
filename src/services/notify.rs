use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum NotifyKind {
    Success,
    Error,
    Info,
}

impl NotifyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyKind::Success => "success",
            NotifyKind::Error => "error",
            NotifyKind::Info => "info",
        }
    }
}

/// Outcome messages for the user. Presentation is someone else's problem;
/// the default sink just logs.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotifyKind, title: &str, detail: &str);
}

pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, kind: NotifyKind, title: &str, detail: &str) {
        match kind {
            NotifyKind::Error => tracing::warn!(kind = kind.as_str(), "{title}: {detail}"),
            _ => tracing::info!(kind = kind.as_str(), "{title}: {detail}"),
        }
    }
}
