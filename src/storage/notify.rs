//! User-facing error notifications.

use tracing::error;

/// Receives messages meant for the user, such as a failed connection test.
pub trait Notifier: Send + Sync {
    fn show_error(&self, message: &str);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show_error(&self, message: &str) {
        error!("{}", message);
    }
}
