use async_trait::async_trait;
use serde::Serialize;

/// Host notification permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Never asked.
    Default,
    Granted,
    Denied,
    /// The host has no notification facility.
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Replaces any shown notification with the same tag.
    pub tag: String,
    pub data: serde_json::Value,
}

/// Where reminders end up: a desktop toast, a push service, a log line.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn permission(&self) -> Permission;

    /// Ask the host for permission if it was never asked. Returns the
    /// resulting permission.
    async fn request_permission(&self) -> Permission {
        self.permission()
    }

    async fn notify(&self, notification: &Notification) -> anyhow::Result<()>;
}

/// Emits notifications as structured log events.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    permission: Permission,
}

impl LogNotifier {
    pub fn new(permission: Permission) -> Self {
        Self { permission }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    async fn notify(&self, notification: &Notification) -> anyhow::Result<()> {
        tracing::info!(
            title = %notification.title,
            body = %notification.body,
            tag = %notification.tag,
            data = %notification.data,
            "Notification"
        );
        Ok(())
    }
}
