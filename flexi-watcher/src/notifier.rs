//! Notification sinks

use flexi_core::poll::{Notification, NotificationKind};
use tracing::{info, warn};

/// Receives the one-time notifications a session emits
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        match notification.kind {
            NotificationKind::Destructive => {
                warn!("{}: {}", notification.title, notification.description)
            }
            NotificationKind::Info | NotificationKind::Success => {
                info!("{}: {}", notification.title, notification.description)
            }
        }
    }
}
