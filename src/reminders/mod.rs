mod notifier;
mod scheduler;

pub use notifier::{LogNotifier, Notification, Notifier, Permission};
pub use scheduler::{next_occurrence, ReminderKey, ReminderScheduler};
